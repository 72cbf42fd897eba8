// tests/matcher_e2e.rs
//
// End-to-end matching over the bundled vocabulary and sample store, using the
// deterministic hashing embedder.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use resale_matcher::matcher::{
    write_match_results, Embedder, HashingEmbedder, MatchResult, Matcher,
};
use resale_matcher::message::{load_messages, split_by_category, Message, SenderDirectory};
use resale_matcher::vocabulary::{AbbreviationMap, Normalizer};

fn matcher() -> Matcher {
    let map = AbbreviationMap::load(Path::new("config/abbreviations.toml")).expect("vocabulary");
    Matcher::new(Normalizer::new(map), Arc::new(HashingEmbedder::default()))
}

#[test]
fn canonicalized_kelly_request_finds_listing() {
    let m = matcher();
    let order = Message::new("1", "need a black kelly 28 ghw");
    let offer = Message::new("2", "selling black kelly 28 ghw brand new");
    let res = m
        .match_orders(&[order], &[offer], &SenderDirectory::default())
        .unwrap();
    assert_eq!(res.len(), 1);
    assert_eq!(res[0].matches.len(), 1);
    let score = res[0].matches[0].score;
    assert!(score >= 60.0 && score <= 100.0, "{score}");
    // two decimals at most
    assert_eq!((score * 100.0).round() / 100.0, score);
}

#[test]
fn unrelated_order_is_dropped_entirely() {
    let m = matcher();
    let order = Message::new("1", "looking for birkin 25 etoupe ghw");
    let offer = Message::new("2", "selling fast red lindy 26 phw");
    let res = m
        .match_orders(&[order], &[offer], &SenderDirectory::default())
        .unwrap();
    assert!(res.is_empty());
}

#[test]
fn translated_text_is_used_when_present() {
    let m = matcher();
    let order = Message::new("1", "need a black kelly 28 ghw");
    let mut offer = Message::new("2", "vends kelly noir");
    offer.translated = Some("selling black kelly 28 ghw brand new".into());
    let res = m
        .match_orders(&[order], &[offer], &SenderDirectory::default())
        .unwrap();
    assert_eq!(res.len(), 1);
    assert_eq!(res[0].matches[0].offer.message, "vends kelly noir");
    assert_eq!(
        res[0].matches[0].offer.translated,
        "selling black kelly 28 ghw brand new"
    );
}

#[test]
fn sample_store_round_trip() {
    let messages = load_messages(Path::new("data/messages.json")).unwrap();
    let directory = SenderDirectory::load(Path::new("data/number_entries.json")).unwrap();
    let (orders, offers) = split_by_category(messages);
    assert_eq!((orders.len(), offers.len()), (2, 2));

    let res = matcher().match_orders(&orders, &offers, &directory).unwrap();
    assert_eq!(res.len(), 1);
    let hit = &res[0];
    assert_eq!(hit.order.name, "Giulia R.");
    assert_eq!(hit.matches[0].offer.name, "Maison Claire");
    assert_eq!(hit.matches[0].offer.price, "14500");
    assert!(hit.order.timestamp.starts_with("2025-03-01T09:15:00"));
    assert!(hit.order.button.contains("https://chat.example.com/m/1001"));

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("match_results.json");
    write_match_results(&out, &res).unwrap();
    let back: Vec<MatchResult> =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(back, res);
}

#[test]
fn non_ascii_is_written_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.json");
    let m = matcher();
    let order = Message::new("1", "cerco kelly 28 noir ghw élégant");
    let offer = Message::new("2", "kelly 28 noir ghw élégant disponibile");
    let res = m
        .match_orders(&[order], &[offer], &SenderDirectory::default())
        .unwrap();
    assert_eq!(res.len(), 1);
    write_match_results(&out, &res).unwrap();
    let raw = std::fs::read_to_string(&out).unwrap();
    assert!(raw.contains("élégant"));
    assert!(!raw.contains("\\u00e9"));
}

/// Fails every call: the run must surface the error instead of emitting partial output.
struct Broken;

impl Embedder for Broken {
    fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        anyhow::bail!("model offline")
    }
    fn name(&self) -> &'static str {
        "broken"
    }
}

#[test]
fn embedder_failure_is_an_error() {
    let m = Matcher::new(Normalizer::default(), Arc::new(Broken));
    let err = m
        .match_orders(
            &[Message::new("1", "need kelly")],
            &[Message::new("2", "selling kelly")],
            &SenderDirectory::default(),
        )
        .unwrap_err();
    assert!(format!("{err:#}").contains("model offline"));
}

/// Returns vectors of the wrong width for offers.
struct Mismatched;

impl Embedder for Mismatched {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let width = if texts.iter().any(|t| t.starts_with("selling")) { 3 } else { 2 };
        Ok(texts.iter().map(|_| vec![1.0; width]).collect())
    }
    fn name(&self) -> &'static str {
        "mismatched"
    }
}

#[test]
fn dimension_mismatch_is_rejected() {
    let m = Matcher::new(Normalizer::default(), Arc::new(Mismatched));
    let res = m.match_orders(
        &[Message::new("1", "need kelly")],
        &[Message::new("2", "selling kelly")],
        &SenderDirectory::default(),
    );
    assert!(res.is_err());
}
