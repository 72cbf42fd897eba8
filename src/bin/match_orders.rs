//! Batch matcher: load the message store and sender directory, match every Order
//! against every Offer, write the results file and echo the JSON to stdout.

use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::error;

use resale_matcher::config::{AppConfig, EmbeddingConfig};
use resale_matcher::matcher::{build_embedder, write_match_results, Matcher};
use resale_matcher::message::{load_messages, split_by_category, SenderDirectory};
use resale_matcher::vocabulary::{AbbreviationMap, Normalizer};
use resale_matcher::init_tracing;

fn run() -> Result<()> {
    let cfg = AppConfig::from_env();

    let map = AbbreviationMap::load(&cfg.vocabulary_path)
        .with_context(|| format!("loading vocabulary from {}", cfg.vocabulary_path.display()))?;
    let embedding = EmbeddingConfig::load_or_default(&cfg.embedding_config_path)?;
    let matcher = Matcher::new(Normalizer::new(map), build_embedder(&embedding)?);

    let messages = load_messages(&cfg.messages_path)?;
    let directory = SenderDirectory::load_or_empty(&cfg.sender_directory_path);
    let (orders, offers) = split_by_category(messages);

    let results = matcher.match_orders(&orders, &offers, &directory)?;
    write_match_results(&cfg.match_output_path, &results)?;

    println!("{}", serde_json::to_string(&results)?);
    Ok(())
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "match run failed");
            ExitCode::FAILURE
        }
    }
}
