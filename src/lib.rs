// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod classify;
pub mod config;
pub mod debug;
pub mod devlog;
pub mod evaluate;
pub mod matcher;
pub mod message;
pub mod metrics;
pub mod vocabulary;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::classify::{Classifier, Diagnosis, Method, PatternSet, Prediction};
pub use crate::matcher::{MatchResult, Matcher, OfferMatch};
pub use crate::message::{Category, Message, SenderDirectory};
pub use crate::vocabulary::{AbbreviationMap, Normalizer};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact fmt logging filtered by `RUST_LOG` (default `resale_matcher=info,warn`).
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("resale_matcher=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
