// src/api.rs
//! HTTP surface: classification, diagnosis, matching, health and debug routes.

use std::collections::HashMap;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::classify::{Classifier, PatternSet, Prediction};
use crate::config::{AppConfig, EmbeddingConfig};
use crate::debug;
use crate::matcher::{build_embedder, MatchResult, Matcher};
use crate::message::{decode_messages, SenderDirectory};
use crate::metrics::{self as service_metrics, Metrics};
use crate::vocabulary::{AbbreviationMap, Normalizer};

#[derive(Clone)]
pub struct AppState {
    classifier: Classifier,
    matcher: Matcher,
    vocabulary_entries: usize,
}

impl AppState {
    pub fn new(classifier: Classifier, matcher: Matcher) -> Self {
        let vocabulary_entries = matcher.normalizer().map().len();
        Self {
            classifier,
            matcher,
            vocabulary_entries,
        }
    }

    /// Load every rule table the service needs. Any failure here is fatal:
    /// the service must not run on a partially loaded rule set.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let map = AbbreviationMap::load(&cfg.vocabulary_path).with_context(|| {
            format!("loading vocabulary from {}", cfg.vocabulary_path.display())
        })?;
        let patterns = PatternSet::load_or_builtin(cfg.patterns_path.as_deref())?;
        let embedding = EmbeddingConfig::load_or_default(&cfg.embedding_config_path)?;
        let embedder = build_embedder(&embedding)?;

        let state = Self::new(
            Classifier::new(patterns),
            Matcher::new(Normalizer::new(map), embedder),
        );
        info!(
            vocabulary_entries = state.vocabulary_entries,
            embedder = state.matcher.embedder_name(),
            "service state ready"
        );
        Ok(state)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(&AppConfig::from_env())
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }
}

pub fn router(state: AppState) -> Router {
    let metrics = Metrics::init(state.vocabulary_entries);

    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/diagnose", post(diagnose))
        .route("/match", post(match_orders))
        .route("/debug/patterns", get(debug_patterns))
        .merge(debug::router())
        .merge(metrics.router())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct TextReq {
    #[serde(default)]
    text: String,
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<TextReq>, JsonRejection>,
) -> Json<Prediction> {
    let prediction = match payload {
        Ok(Json(body)) => state.classifier.predict(&body.text),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "unreadable /predict body");
            Prediction::error()
        }
    };
    service_metrics::record_prediction(&prediction);
    debug::record_prediction(&prediction);
    Json(prediction)
}

#[derive(Serialize)]
struct RuleCounts {
    order: usize,
    offer: usize,
    non_product: usize,
}

#[derive(Serialize)]
struct HealthResp {
    status: &'static str,
    model_loaded: bool,
    rules: RuleCounts,
    vocabulary_entries: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResp> {
    let patterns = state.classifier.patterns();
    let rules = RuleCounts {
        order: patterns.order().len(),
        offer: patterns.offer().len(),
        non_product: patterns.non_product().len(),
    };
    Json(HealthResp {
        status: "healthy",
        model_loaded: rules.order > 0 && rules.offer > 0,
        rules,
        vocabulary_entries: state.vocabulary_entries,
    })
}

async fn diagnose(
    State(state): State<AppState>,
    payload: Result<Json<TextReq>, JsonRejection>,
) -> Response {
    debug::record_diagnose();
    let text = match payload {
        Ok(Json(body)) => body.text,
        Err(_) => String::new(),
    };
    if text.trim().is_empty() {
        return Json(json!({ "error": "No text provided" })).into_response();
    }
    Json(state.classifier.diagnose(&text)).into_response()
}

/// Records stay raw here so one undecodable element is skipped, not fatal to the batch.
#[derive(Deserialize)]
struct MatchReq {
    #[serde(default)]
    orders: Vec<serde_json::Value>,
    #[serde(default)]
    offers: Vec<serde_json::Value>,
    #[serde(default)]
    directory: HashMap<String, String>,
}

type MatchError = (StatusCode, Json<serde_json::Value>);

fn match_error(status: StatusCode, message: &str) -> MatchError {
    (status, Json(json!({ "error": message })))
}

async fn match_orders(
    State(state): State<AppState>,
    payload: Result<Json<MatchReq>, JsonRejection>,
) -> Result<Json<Vec<MatchResult>>, MatchError> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            debug::record_match(None);
            warn!(error = %rejection.body_text(), "unreadable /match body");
            return Err(match_error(StatusCode::BAD_REQUEST, "invalid match request"));
        }
    };
    let orders = decode_messages(body.orders);
    let offers = decode_messages(body.offers);
    let matcher = state.matcher.clone();
    let directory = SenderDirectory::from(body.directory);
    let outcome =
        tokio::task::spawn_blocking(move || matcher.match_orders(&orders, &offers, &directory))
            .await;

    match outcome {
        Ok(Ok(results)) => {
            debug::record_match(Some(results.len()));
            Ok(Json(results))
        }
        Ok(Err(e)) => {
            debug::record_match(None);
            warn!(error = %format!("{e:#}"), "match run failed");
            Err(match_error(StatusCode::INTERNAL_SERVER_ERROR, "matching failed"))
        }
        Err(join) => {
            debug::record_match(None);
            warn!(error = %join, "match worker panicked");
            Err(match_error(StatusCode::INTERNAL_SERVER_ERROR, "matching failed"))
        }
    }
}

#[derive(Serialize)]
struct PatternsOut {
    order: Vec<String>,
    offer: Vec<String>,
    non_product: Vec<String>,
}

async fn debug_patterns(State(state): State<AppState>) -> Json<PatternsOut> {
    let p = state.classifier.patterns();
    Json(PatternsOut {
        order: p.order().fragments().to_vec(),
        offer: p.offer().fragments().to_vec(),
        non_product: p.non_product().fragments().to_vec(),
    })
}
