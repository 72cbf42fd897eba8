//! Classifier accuracy report over a seeded synthetic corpus.
//!
//! Usage: `evaluate [count_per_class] [seed] [output.json]`

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info};

use resale_matcher::classify::{Classifier, PatternSet};
use resale_matcher::config::AppConfig;
use resale_matcher::evaluate;
use resale_matcher::init_tracing;

const DEFAULT_COUNT_PER_CLASS: usize = 5_000;
const DEFAULT_SEED: u64 = 42;
const DEFAULT_OUTPUT: &str = "test_results.json";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let count: usize = match args.next() {
        Some(a) => a.parse().with_context(|| format!("invalid count `{a}`"))?,
        None => DEFAULT_COUNT_PER_CLASS,
    };
    let seed: u64 = match args.next() {
        Some(a) => a.parse().with_context(|| format!("invalid seed `{a}`"))?,
        None => DEFAULT_SEED,
    };
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let cfg = AppConfig::from_env();
    let classifier = Classifier::new(PatternSet::load_or_builtin(cfg.patterns_path.as_deref())?);
    let report = evaluate::run(&classifier, count, seed);

    println!("Total: {}", report.total);
    println!("Correct: {}", report.correct);
    println!("Incorrect: {}", report.incorrect);
    println!("Accuracy: {:.2}%", report.accuracy);
    println!(
        "Missed orders: {}  missed offers: {}  unknown: {}",
        report.pattern_gaps.order_missed.len(),
        report.pattern_gaps.offer_missed.len(),
        report.pattern_gaps.unknown_classified.len()
    );
    for (bucket, n) in &report.confusion {
        println!("  {bucket}: {n}");
    }
    for (i, m) in report.misclassified.iter().take(10).enumerate() {
        println!(
            "{}. '{}' -> expected {}, got {} [{}]",
            i + 1,
            m.text,
            m.expected,
            m.predicted,
            m.template
        );
    }
    for s in &report.suggestions {
        println!("- {s}");
    }

    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&output, json).with_context(|| format!("writing {}", output.display()))?;
    info!(path = %output.display(), "report written");
    Ok(())
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "evaluation failed");
            ExitCode::FAILURE
        }
    }
}
