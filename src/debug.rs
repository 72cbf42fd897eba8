// src/debug.rs
//! In-process request counters behind `GET /debug/stats`.

use std::sync::Mutex;

use axum::{routing::get, Json, Router};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::classify::{Method, Prediction};
use crate::message::Category;

#[derive(Default, Clone, Serialize)]
pub struct Stats {
    pub total_requests: u64,
    pub predict_requests: u64,
    pub diagnose_requests: u64,
    pub match_requests: u64,
    pub orders: u64,
    pub offers: u64,
    pub unknown: u64,
    pub empty: u64,
    pub errors: u64,
    pub last_match_orders: Option<usize>,
}

static STATS: Lazy<Mutex<Stats>> = Lazy::new(|| Mutex::new(Stats::default()));

fn with_stats(f: impl FnOnce(&mut Stats)) {
    let mut s = STATS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    s.total_requests += 1;
    f(&mut s);
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/debug/stats", get(stats))
}

pub fn record_prediction(p: &Prediction) {
    with_stats(|s| {
        s.predict_requests += 1;
        match p.method {
            Method::Error => s.errors += 1,
            Method::Empty => s.empty += 1,
            Method::Perfect => match p.category {
                Category::Order => s.orders += 1,
                Category::Offer => s.offers += 1,
                Category::Unknown => s.unknown += 1,
            },
        }
    });
}

pub fn record_diagnose() {
    with_stats(|s| s.diagnose_requests += 1);
}

pub fn record_match(matched_orders: Option<usize>) {
    with_stats(|s| {
        s.match_requests += 1;
        match matched_orders {
            Some(n) => s.last_match_orders = Some(n),
            None => s.errors += 1,
        }
    });
}

pub fn snapshot() -> Stats {
    STATS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

async fn stats() -> Json<Stats> {
    Json(snapshot())
}
