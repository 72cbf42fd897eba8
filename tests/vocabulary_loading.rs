// tests/vocabulary_loading.rs
use std::fs;
use std::path::Path;

use resale_matcher::vocabulary::{AbbreviationMap, Normalizer};

#[test]
fn bundled_vocabulary_loads_and_is_idempotent() {
    let map = AbbreviationMap::load(Path::new("config/abbreviations.toml")).unwrap();
    assert!(map.len() > 20);
    let n = Normalizer::new(map);
    for text in [
        "ETOUPE K20 RGHW JUST ARRIVED – 4900 ONLY",
        "need a black kelly 28 ghw",
        "Hermès B25 noir PHW!!",
        "cdc etoup grey",
        "",
    ] {
        let once = n.normalize(text);
        assert_eq!(n.normalize(&once), once, "{text}");
    }
    assert_eq!(n.normalize("K20 RGHW"), "kelly 20 rose gold hardware");
    assert_eq!(n.normalize("Hermès B25 noir"), "hermes birkin 25 black");
}

#[test]
fn json_rows_skip_malformed_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vocab.json");
    fs::write(
        &path,
        r#"[
            {"type": "ghw", "example": "gold hardware"},
            {"type": "", "example": "nothing"},
            {"type": "phw", "example": "   "},
            {"type": "two words", "example": "skipped"},
            {"example": "no key"},
            {"type": "K25", "example": "Kelly 25"}
        ]"#,
    )
    .unwrap();
    let map = AbbreviationMap::load(&path).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("k25"), Some("kelly 25"));
    assert_eq!(map.lookup("phw"), "phw");
}

#[test]
fn toml_chains_are_resolved_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vocab.toml");
    fs::write(
        &path,
        "[abbreviations]\nbk = \"b\"\nb = \"birkin\"\nloop1 = \"loop2\"\nloop2 = \"loop1\"\n",
    )
    .unwrap();
    let n = Normalizer::new(AbbreviationMap::load(&path).unwrap());
    assert_eq!(n.normalize("bk"), "birkin");
    let once = n.normalize("loop1 loop2");
    assert_eq!(n.normalize(&once), once);
}

#[test]
fn missing_or_unknown_sources_fail() {
    assert!(AbbreviationMap::load(Path::new("config/does-not-exist.toml")).is_err());
    assert!(AbbreviationMap::load(Path::new("config/vocab.csv")).is_err());
    assert!(AbbreviationMap::load(Path::new("config/does-not-exist.xlsx")).is_err());
}
