// src/config/embedding.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};
use tracing::info;

use crate::matcher::embedding::DEFAULT_DIMENSION;

pub const DEFAULT_EMBEDDING_CONFIG_PATH: &str = "config/embedding.json";
pub const ENV_EMBEDDING_CONFIG_PATH: &str = "EMBEDDING_CONFIG_PATH";
pub const ENV_EMBEDDING_API_KEY: &str = "EMBEDDING_API_KEY";

fn default_dimension() -> usize {
    DEFAULT_DIMENSION
}
fn default_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Hashing,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// Endpoint for the remote provider (OpenAI-compatible `/embeddings`).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// "ENV" means: read from EMBEDDING_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Hashing,
            dimension: default_dimension(),
            url: None,
            model: default_model(),
            api_key: None,
        }
    }
}

impl EmbeddingConfig {
    pub fn from_json_str(data: &str) -> anyhow::Result<Self> {
        let mut cfg: EmbeddingConfig = serde_json::from_str(data)?;

        // Resolve api key if "ENV"
        if let Some(key) = cfg.api_key.as_deref() {
            if key.trim().eq_ignore_ascii_case("env") {
                cfg.api_key = Some(
                    env::var(ENV_EMBEDDING_API_KEY)
                        .map_err(|_| anyhow::anyhow!("Missing {ENV_EMBEDDING_API_KEY} env var"))?,
                );
            } else if key.trim().is_empty() {
                cfg.api_key = None;
            }
        }

        if cfg.dimension == 0 {
            cfg.dimension = default_dimension();
        }
        if cfg.provider == Provider::Remote && cfg.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
            anyhow::bail!("remote embedding provider requires `url`");
        }
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Missing file -> hashing defaults. A present but invalid file is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no embedding config; using hashing embedder");
            return Ok(Self::default());
        }
        Self::load_from_file(path)
            .map_err(|e| e.context(format!("loading embedding config {}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg = EmbeddingConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg.provider, Provider::Hashing);
        assert_eq!(cfg.dimension, 384);
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn remote_requires_url() {
        assert!(EmbeddingConfig::from_json_str(r#"{"provider":"remote"}"#).is_err());
        let cfg = EmbeddingConfig::from_json_str(
            r#"{"provider":"remote","url":"http://localhost:8080/embeddings","dimension":768,"api_key":"k"}"#,
        )
        .unwrap();
        assert_eq!(cfg.dimension, 768);
        assert_eq!(cfg.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn missing_file_is_hashing_default() {
        let cfg = EmbeddingConfig::load_or_default("definitely/not/here.json").unwrap();
        assert_eq!(cfg.provider, Provider::Hashing);
    }
}
