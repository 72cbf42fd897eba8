// src/config/mod.rs
//! Process configuration resolved from environment variables (after `.env`).

pub mod embedding;

use std::env;
use std::path::PathBuf;

use crate::classify::patterns::{DEFAULT_PATTERNS_PATH, ENV_PATTERNS_PATH};
use crate::matcher::{DEFAULT_MATCH_OUTPUT_PATH, ENV_MATCH_OUTPUT_PATH};
use crate::vocabulary::{DEFAULT_VOCABULARY_PATH, ENV_VOCABULARY_PATH};

pub use embedding::{EmbeddingConfig, Provider};
pub use embedding::{DEFAULT_EMBEDDING_CONFIG_PATH, ENV_EMBEDDING_CONFIG_PATH};

pub const DEFAULT_MESSAGES_PATH: &str = "data/messages.json";
pub const ENV_MESSAGES_PATH: &str = "MESSAGES_PATH";
pub const DEFAULT_SENDER_DIRECTORY_PATH: &str = "data/number_entries.json";
pub const ENV_SENDER_DIRECTORY_PATH: &str = "SENDER_DIRECTORY_PATH";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub vocabulary_path: PathBuf,
    /// `None` when no override file is configured or present: built-in tiers apply.
    pub patterns_path: Option<PathBuf>,
    pub messages_path: PathBuf,
    pub sender_directory_path: PathBuf,
    pub match_output_path: PathBuf,
    pub embedding_config_path: PathBuf,
}

fn path_from_env(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

impl AppConfig {
    pub fn from_env() -> Self {
        // Explicit PATTERNS_PATH is always honored (a missing file then fails loudly);
        // the default location is only used when it exists.
        let patterns_path = match env::var(ENV_PATTERNS_PATH) {
            Ok(p) if !p.trim().is_empty() => Some(PathBuf::from(p)),
            _ => Some(PathBuf::from(DEFAULT_PATTERNS_PATH)).filter(|p| p.exists()),
        };
        Self {
            vocabulary_path: path_from_env(ENV_VOCABULARY_PATH, DEFAULT_VOCABULARY_PATH),
            patterns_path,
            messages_path: path_from_env(ENV_MESSAGES_PATH, DEFAULT_MESSAGES_PATH),
            sender_directory_path: path_from_env(
                ENV_SENDER_DIRECTORY_PATH,
                DEFAULT_SENDER_DIRECTORY_PATH,
            ),
            match_output_path: path_from_env(ENV_MATCH_OUTPUT_PATH, DEFAULT_MATCH_OUTPUT_PATH),
            embedding_config_path: path_from_env(
                ENV_EMBEDDING_CONFIG_PATH,
                DEFAULT_EMBEDDING_CONFIG_PATH,
            ),
        }
    }
}
