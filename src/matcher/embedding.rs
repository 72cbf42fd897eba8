//! Embedding providers: text -> fixed-length vector.
//!
//! The matcher only sees the `Embedder` trait, so the similarity logic can run against
//! a local hashing embedder, a remote sentence-embedding service, or a test stub.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::embedding::{EmbeddingConfig, Provider};

pub const DEFAULT_DIMENSION: usize = 384;

/// Batch text encoder. One call per side per matching run.
pub trait Embedder: Send + Sync {
    /// Returns one vector per input text, all of the same dimension.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type DynEmbedder = Arc<dyn Embedder>;

/// Factory: build the embedder described by the config.
pub fn build_embedder(cfg: &EmbeddingConfig) -> Result<DynEmbedder> {
    let embedder: DynEmbedder = match cfg.provider {
        Provider::Hashing => Arc::new(HashingEmbedder::new(cfg.dimension)),
        Provider::Remote => {
            let url = cfg
                .url
                .clone()
                .ok_or_else(|| anyhow!("remote embedding provider requires `url`"))?;
            Arc::new(RemoteEmbedder::new(
                url,
                cfg.model.clone(),
                cfg.api_key.clone(),
                cfg.dimension,
            ))
        }
    };
    info!(provider = embedder.name(), dimension = cfg.dimension, "embedder ready");
    Ok(embedder)
}

/// Feature-hashing embedder over whitespace tokens (single characters ignored).
///
/// Each token lands in a SHA-256 derived bucket with a SHA-256 derived sign, so
/// vectors are stable across processes and platforms.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimension];
        for tok in text.split_whitespace().filter(|t| t.chars().count() > 1) {
            let digest = Sha256::digest(tok.as_bytes());
            let mut head = [0u8; 8];
            head.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_be_bytes(head) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign;
        }
        v
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl Embedder for HashingEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn name(&self) -> &'static str {
        "hashing"
    }
}

/// OpenAI-compatible `/embeddings` endpoint (e.g. a sentence-transformers server).
#[derive(Debug, Clone)]
pub struct RemoteEmbedder {
    url: String,
    model: String,
    api_key: Option<String>,
    dimension: usize,
    timeout: Duration,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

impl RemoteEmbedder {
    pub fn new(url: String, model: String, api_key: Option<String>, dimension: usize) -> Self {
        Self {
            url,
            model,
            api_key,
            dimension,
            timeout: Duration::from_secs(30),
        }
    }

    fn decode(&self, resp: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
        if resp.data.len() != expected {
            bail!(
                "embedding service returned {} vectors for {} inputs",
                resp.data.len(),
                expected
            );
        }
        let mut data = resp.data;
        // Providers may return out of order; `index` is authoritative when present.
        if data.iter().all(|d| d.index.is_some()) {
            data.sort_by_key(|d| d.index.unwrap_or_default());
        }
        let vectors: Vec<Vec<f32>> = data.into_iter().map(|d| d.embedding).collect();
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            bail!(
                "Invalid embedding dimension: expected {}, got {}",
                self.dimension,
                bad.len()
            );
        }
        Ok(vectors)
    }
}

impl Embedder for RemoteEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        // Blocking client is built per batch so it never lives inside an async context.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("building embedding HTTP client")?;
        let mut req = client.post(&self.url).json(&EmbeddingRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        debug!(count = texts.len(), url = %self.url, "requesting embeddings");
        let resp: EmbeddingResponse = req
            .send()
            .context("embedding service unreachable")?
            .error_for_status()
            .context("embedding service returned an error status")?
            .json()
            .context("decoding embedding response")?;
        self.decode(resp, texts.len())
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_is_deterministic_and_sized() {
        let e = HashingEmbedder::new(64);
        let a = e.embed_one("black kelly 28 gold hardware");
        assert_eq!(a.len(), 64);
        assert_eq!(a, e.embed_one("black kelly 28 gold hardware"));
        assert!(e.embed_one("a").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn remote_decode_orders_by_index_and_checks_dimension() {
        let r = RemoteEmbedder::new("http://localhost:0".into(), "m".into(), None, 2);
        let resp: EmbeddingResponse = serde_json::from_str(
            r#"{"data":[{"index":1,"embedding":[0.0,1.0]},{"index":0,"embedding":[1.0,0.0]}]}"#,
        )
        .unwrap();
        let v = r.decode(resp, 2).unwrap();
        assert_eq!(v[0], vec![1.0, 0.0]);

        let short: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"embedding":[1.0]}]}"#).unwrap();
        assert!(r.decode(short, 1).is_err());

        let missing: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"embedding":[1.0,0.0]}]}"#).unwrap();
        assert!(r.decode(missing, 2).is_err());
    }

    #[test]
    fn remote_empty_batch_skips_network() {
        let r = RemoteEmbedder::new("http://127.0.0.1:9".into(), "m".into(), None, 2);
        assert!(r.embed_batch(&[]).unwrap().is_empty());
    }
}
