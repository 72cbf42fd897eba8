// tests/config_env.rs
//
// Environment-driven configuration. These tests mutate process env, so they run serially.

use std::path::PathBuf;

use serial_test::serial;

use resale_matcher::api::AppState;
use resale_matcher::config::{AppConfig, EmbeddingConfig, Provider};

const KEYS: &[&str] = &[
    "VOCABULARY_PATH",
    "PATTERNS_PATH",
    "MESSAGES_PATH",
    "SENDER_DIRECTORY_PATH",
    "MATCH_OUTPUT_PATH",
    "EMBEDDING_CONFIG_PATH",
    "EMBEDDING_API_KEY",
];

fn clear_env() {
    for k in KEYS {
        std::env::remove_var(k);
    }
}

#[test]
#[serial]
fn defaults_apply_without_env() {
    clear_env();
    let cfg = AppConfig::from_env();
    assert_eq!(cfg.vocabulary_path, PathBuf::from("config/abbreviations.toml"));
    assert_eq!(cfg.messages_path, PathBuf::from("data/messages.json"));
    assert_eq!(cfg.sender_directory_path, PathBuf::from("data/number_entries.json"));
    assert_eq!(cfg.match_output_path, PathBuf::from("match_results.json"));
    assert_eq!(cfg.embedding_config_path, PathBuf::from("config/embedding.json"));
    // no config/patterns.toml in the repo: built-in tiers
    assert!(cfg.patterns_path.is_none());
}

#[test]
#[serial]
fn env_overrides_paths() {
    clear_env();
    std::env::set_var("MESSAGES_PATH", "/tmp/messages.json");
    std::env::set_var("PATTERNS_PATH", "/tmp/patterns.toml");
    let cfg = AppConfig::from_env();
    assert_eq!(cfg.messages_path, PathBuf::from("/tmp/messages.json"));
    assert_eq!(cfg.patterns_path, Some(PathBuf::from("/tmp/patterns.toml")));
    clear_env();
}

#[test]
#[serial]
fn state_loads_from_default_files() {
    clear_env();
    let state = AppState::from_env().expect("bundled config loads");
    assert_eq!(
        state.classifier().classify("need white k20 rghw"),
        resale_matcher::Category::Order
    );
}

#[test]
#[serial]
fn missing_vocabulary_is_fatal() {
    clear_env();
    std::env::set_var("VOCABULARY_PATH", "config/not-there.toml");
    assert!(AppState::from_env().is_err());
    clear_env();
}

#[test]
#[serial]
fn explicit_missing_pattern_file_is_fatal() {
    clear_env();
    std::env::set_var("PATTERNS_PATH", "config/not-there.toml");
    assert!(AppState::from_env().is_err());
    clear_env();
}

#[test]
#[serial]
fn embedding_api_key_from_env() {
    clear_env();
    let json = r#"{"provider":"remote","url":"http://localhost:8080/v1/embeddings","api_key":"ENV"}"#;
    assert!(EmbeddingConfig::from_json_str(json).is_err());

    std::env::set_var("EMBEDDING_API_KEY", "sk-test");
    let cfg = EmbeddingConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.provider, Provider::Remote);
    assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
    clear_env();
}
