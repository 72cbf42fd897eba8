// src/evaluate/mod.rs
//! Offline quality loop for the rule classifier: generate labeled examples, classify
//! them, and report accuracy plus the coverage gaps behind misclassifications.

pub mod generator;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::classify::Classifier;
use crate::message::Category;

pub use generator::{ExampleGenerator, LabeledExample, OFFER_TEMPLATES, ORDER_TEMPLATES};

const ORDER_KEYWORD_HINTS: &[&str] = &[
    "want", "need", "looking", "searching", "seeking", "interested", "hunting", "require",
    "desire", "iso", "wtb",
];

const OFFER_KEYWORD_HINTS: &[&str] = &[
    "selling", "sale", "available", "have", "offering", "listing", "fs", "authentic", "genuine",
    "condition",
];

#[derive(Debug, Clone, Serialize)]
pub struct Misclassification {
    pub text: String,
    pub expected: Category,
    pub predicted: Category,
    pub template: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternGaps {
    pub order_missed: Vec<String>,
    pub offer_missed: Vec<String>,
    pub unknown_classified: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateStats {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationReport {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    /// Percentage in [0, 100]; 0 for an empty corpus.
    pub accuracy: f64,
    pub misclassified: Vec<Misclassification>,
    /// "expected->predicted" -> count, misclassifications only.
    pub confusion: BTreeMap<String, usize>,
    pub per_template: BTreeMap<String, TemplateStats>,
    pub pattern_gaps: PatternGaps,
    pub missing_order_keywords: BTreeSet<String>,
    pub missing_offer_keywords: BTreeSet<String>,
    pub suggestions: Vec<String>,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Words of missed texts that contain one of the hint stems.
fn keywords_from(texts: &[String], hints: &[&str]) -> BTreeSet<String> {
    texts
        .iter()
        .flat_map(|t| t.to_lowercase().split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .filter(|w| hints.iter().any(|h| w.contains(h)))
        .collect()
}

fn suggestion(label: &str, words: &BTreeSet<String>) -> Option<String> {
    if words.is_empty() {
        return None;
    }
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Some(format!(r"{label} pattern: \b({alternation})\b"))
}

/// Classify every example and tally the outcome. Pure counting: same input, same report.
pub fn evaluate(classifier: &Classifier, examples: &[LabeledExample]) -> EvaluationReport {
    let mut report = EvaluationReport {
        total: examples.len(),
        ..Default::default()
    };

    for ex in examples {
        let predicted = classifier.classify(&ex.text);
        let stats = report.per_template.entry(ex.template.clone()).or_default();
        stats.total += 1;

        if predicted == ex.expected {
            report.correct += 1;
            stats.correct += 1;
            continue;
        }

        report.incorrect += 1;
        *report
            .confusion
            .entry(format!("{}->{}", ex.expected, predicted))
            .or_default() += 1;
        match ex.expected {
            Category::Order => report.pattern_gaps.order_missed.push(ex.text.clone()),
            Category::Offer => report.pattern_gaps.offer_missed.push(ex.text.clone()),
            Category::Unknown => {}
        }
        if predicted == Category::Unknown {
            report.pattern_gaps.unknown_classified.push(ex.text.clone());
        }
        report.misclassified.push(Misclassification {
            text: ex.text.clone(),
            expected: ex.expected,
            predicted,
            template: ex.template.clone(),
        });
    }

    report.accuracy = percent(report.correct, report.total);
    for stats in report.per_template.values_mut() {
        stats.accuracy = percent(stats.correct, stats.total);
    }

    report.missing_order_keywords =
        keywords_from(&report.pattern_gaps.order_missed, ORDER_KEYWORD_HINTS);
    report.missing_offer_keywords =
        keywords_from(&report.pattern_gaps.offer_missed, OFFER_KEYWORD_HINTS);
    report.suggestions = [
        suggestion("Order", &report.missing_order_keywords),
        suggestion("Offer", &report.missing_offer_keywords),
    ]
    .into_iter()
    .flatten()
    .collect();

    info!(
        total = report.total,
        correct = report.correct,
        accuracy = report.accuracy,
        "evaluation finished"
    );
    report
}

/// Generate `count_per_class` examples per label from `seed` and evaluate them.
pub fn run(classifier: &Classifier, count_per_class: usize, seed: u64) -> EvaluationReport {
    let corpus = ExampleGenerator::new(seed).corpus(count_per_class);
    evaluate(classifier, &corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::PatternSet;

    fn ex(text: &str, expected: Category, template: &str) -> LabeledExample {
        LabeledExample {
            text: text.into(),
            expected,
            template: template.into(),
        }
    }

    #[test]
    fn counts_confusion_and_gaps() {
        let c = Classifier::default();
        let examples = vec![
            ex("need kelly", Category::Order, "simple_want"),
            ex("selling birkin", Category::Offer, "simple_sale"),
            ex("wanting a kelly", Category::Order, "simple_want"),
            ex("desire birkin", Category::Order, "simple_want"),
        ];
        let r = evaluate(&c, &examples);
        assert_eq!(r.total, 4);
        assert_eq!(r.correct + r.incorrect, 4);
        assert_eq!(r.pattern_gaps.order_missed.len(), r.incorrect);
        let misses: usize = r.confusion.values().sum();
        assert_eq!(misses, r.incorrect);
        assert_eq!(r.per_template["simple_sale"].accuracy, 100.0);
    }

    #[test]
    fn empty_corpus_has_zero_accuracy() {
        let r = evaluate(&Classifier::default(), &[]);
        assert_eq!(r.total, 0);
        assert_eq!(r.accuracy, 0.0);
        assert!(r.suggestions.is_empty());
    }

    #[test]
    fn missed_keywords_feed_suggestions() {
        // No order fragments: every order example is missed.
        let p = PatternSet::new(vec![], vec![r"\bselling\b".into()], vec![]).unwrap();
        let c = Classifier::new(p);
        let r = evaluate(&c, &[ex("wtb kelly", Category::Order, "casual")]);
        assert_eq!(r.confusion["Order->unknown"], 1);
        assert!(r.missing_order_keywords.contains("wtb"));
        assert_eq!(r.pattern_gaps.unknown_classified, vec!["wtb kelly".to_string()]);
        assert!(r.suggestions[0].contains("wtb"));
    }

    #[test]
    fn seeded_run_is_deterministic() {
        let c = Classifier::default();
        let a = run(&c, 100, 42);
        let b = run(&c, 100, 42);
        assert_eq!(a.total, 200);
        assert_eq!(a.correct, b.correct);
        assert_eq!(a.confusion, b.confusion);
    }
}
