// src/devlog.rs
//! Dev-only diagnostics. Raw chat text is never logged: only a short hash id.

use tracing::info;

use crate::classify::Tier;
use crate::message::Category;

pub const ENV_DEV_LOG: &str = "MATCHER_DEV_LOG";

// Dev logging gate: MATCHER_DEV_LOG=1 AND dev env (debug build, `debug` feature,
// or SHUTTLE_ENV in {local,development,dev})
pub fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) || cfg!(feature = "debug") {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// First 6 bytes of SHA-256, hex encoded.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub(crate) fn dev_log_classification(text: &str, category: Category, tier: Option<Tier>) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(text);
    let tier = tier.map(|t| t.as_str()).unwrap_or("none");
    info!(target: "classifier", %id, %category, tier, "classified");
}

pub(crate) fn dev_log_match(order_text: &str, offer_text: &str, score: f64, kept: bool) {
    if !dev_logging_enabled() {
        return;
    }
    let order = anon_hash(order_text);
    let offer = anon_hash(offer_text);
    info!(target: "matcher", %order, %offer, score, kept, "scored pair");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("need kelly 25");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("need kelly 25"));
        assert_ne!(a, anon_hash("need kelly 28"));
    }
}
