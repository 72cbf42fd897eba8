// src/matcher/mod.rs
//! Order -> Offer matching over normalized-text embeddings.
//!
//! Pipeline per run:
//! 1) drop records without a sender or with empty normalized text (warn, keep going)
//! 2) embed all orders in one batch, all offers in one batch
//! 3) score every order x offer pair, keep cosines >= 0.60
//! 4) rank each order's matches by score (descending); drop orders with none

pub mod embedding;
pub mod similarity;

use anyhow::{bail, Context, Result};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::devlog::dev_log_match;
use crate::message::{Message, SenderDirectory};
use crate::vocabulary::Normalizer;

pub use embedding::{build_embedder, DynEmbedder, Embedder, HashingEmbedder, RemoteEmbedder};
pub use similarity::{
    cosine_similarity, passes_threshold, similarity_score, to_score, MATCH_THRESHOLD, MIN_COSINE,
};

pub const DEFAULT_MATCH_OUTPUT_PATH: &str = "match_results.json";
pub const ENV_MATCH_OUTPUT_PATH: &str = "MATCH_OUTPUT_PATH";

/// Which side of the pair a record sits on; decides the call-to-action rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Order,
    Offer,
}

/// Display projection of a message for downstream presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRecord {
    pub number: String,
    pub name: String,
    pub message: String,
    pub translated: String,
    pub language: String,
    pub price: String,
    pub timestamp: String,
    pub link: String,
    pub button: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferMatch {
    pub offer: MatchedRecord,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub order: MatchedRecord,
    pub matches: Vec<OfferMatch>,
}

/// HTML anchor for a record link; empty when there is no link.
pub fn render_button(side: Side, link: &str) -> String {
    if link.trim().is_empty() {
        return String::new();
    }
    let (class, label) = match side {
        Side::Order => ("btn-primary", "Go Order"),
        Side::Offer => ("btn-success", "Go Offer"),
    };
    format!(
        r#"<a href="{}" class="btn {} btn-sm" target="_blank">{}</a>"#,
        html_escape::encode_double_quoted_attribute(link),
        class,
        label
    )
}

impl MatchedRecord {
    /// Name falls back to the sender directory, then to "".
    pub fn from_message(msg: &Message, side: Side, directory: &SenderDirectory) -> Self {
        let number = msg.sender().unwrap_or_default().to_string();
        let name = msg
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| directory.lookup(&number))
            .unwrap_or_default()
            .to_string();
        let link = msg.link.clone().unwrap_or_default();
        Self {
            number,
            name,
            message: msg.message.clone(),
            translated: msg.translated.clone().unwrap_or_default(),
            language: msg.language.clone().unwrap_or_default(),
            price: msg.price.clone().unwrap_or_default(),
            timestamp: msg.timestamp.clone().unwrap_or_default(),
            button: render_button(side, &link),
            link,
        }
    }
}

/// One side of a run after filtering: the surviving records and their normalized texts.
struct Prepared<'a> {
    records: Vec<&'a Message>,
    texts: Vec<String>,
}

/// Pairs buyer requests with seller listings. Stateless per run.
#[derive(Clone)]
pub struct Matcher {
    normalizer: Normalizer,
    embedder: DynEmbedder,
}

impl Matcher {
    pub fn new(normalizer: Normalizer, embedder: DynEmbedder) -> Self {
        Self {
            normalizer,
            embedder,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn embedder_name(&self) -> &'static str {
        self.embedder.name()
    }

    fn prepare<'a>(&self, side: Side, messages: &'a [Message]) -> Prepared<'a> {
        let mut records = Vec::with_capacity(messages.len());
        let mut texts = Vec::with_capacity(messages.len());
        for (idx, msg) in messages.iter().enumerate() {
            if msg.sender().is_none() {
                warn!(index = idx, side = ?side, "skipping record without sender id");
                continue;
            }
            let normalized = self.normalizer.normalize(msg.effective_text());
            if normalized.is_empty() {
                debug!(index = idx, side = ?side, "skipping record with empty text");
                continue;
            }
            records.push(msg);
            texts.push(normalized);
        }
        Prepared { records, texts }
    }

    fn embed(&self, side: Side, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let vectors = self
            .embedder
            .embed_batch(texts)
            .with_context(|| format!("embedding {side:?} texts"))?;
        if vectors.len() != texts.len() {
            bail!(
                "embedder `{}` returned {} vectors for {} {side:?} texts",
                self.embedder.name(),
                vectors.len(),
                texts.len()
            );
        }
        Ok(vectors)
    }

    /// Score every order against every offer and keep matches at or above the threshold.
    pub fn match_orders(
        &self,
        orders: &[Message],
        offers: &[Message],
        directory: &SenderDirectory,
    ) -> Result<Vec<MatchResult>> {
        counter!("match_runs_total").increment(1);

        let orders = self.prepare(Side::Order, orders);
        let offers = self.prepare(Side::Offer, offers);
        if orders.records.is_empty() || offers.records.is_empty() {
            info!(
                orders = orders.records.len(),
                offers = offers.records.len(),
                "nothing to match"
            );
            return Ok(Vec::new());
        }

        let order_vecs = self.embed(Side::Order, &orders.texts)?;
        let offer_vecs = self.embed(Side::Offer, &offers.texts)?;
        if let (Some(a), Some(b)) = (order_vecs.first(), offer_vecs.first()) {
            if order_vecs.iter().chain(&offer_vecs).any(|v| v.len() != a.len()) {
                bail!(
                    "Embeddings must have same dimension (orders {}, offers {})",
                    a.len(),
                    b.len()
                );
            }
        }

        // Offer display records are built lazily and reused across orders.
        let mut offer_display: Vec<Option<MatchedRecord>> = vec![None; offers.records.len()];
        let mut results = Vec::new();
        let mut retained = 0u64;

        for (oi, order_vec) in order_vecs.iter().enumerate() {
            let mut matches = Vec::new();
            for (fi, offer_vec) in offer_vecs.iter().enumerate() {
                let cosine = cosine_similarity(order_vec, offer_vec);
                let score = to_score(cosine);
                let kept = passes_threshold(cosine);
                dev_log_match(&orders.texts[oi], &offers.texts[fi], score, kept);
                if !kept {
                    continue;
                }
                let offer = offer_display[fi]
                    .get_or_insert_with(|| {
                        MatchedRecord::from_message(offers.records[fi], Side::Offer, directory)
                    })
                    .clone();
                matches.push(OfferMatch { offer, score });
            }
            if matches.is_empty() {
                continue;
            }
            matches.sort_by(|a, b| b.score.total_cmp(&a.score));
            retained += matches.len() as u64;
            results.push(MatchResult {
                order: MatchedRecord::from_message(orders.records[oi], Side::Order, directory),
                matches,
            });
        }

        counter!("match_pairs_retained_total").increment(retained);
        info!(
            orders = orders.records.len(),
            offers = offers.records.len(),
            matched_orders = results.len(),
            pairs = retained,
            "match run finished"
        );
        Ok(results)
    }
}

/// Pretty JSON; non-ASCII text is written verbatim.
pub fn write_match_results(path: &Path, results: &[MatchResult]) -> Result<()> {
    let json = serde_json::to_string_pretty(results).context("serializing match results")?;
    fs::write(path, json).with_context(|| format!("writing match results to {}", path.display()))?;
    info!(path = %path.display(), orders = results.len(), "match results written");
    Ok(())
}
