// src/metrics.rs
use axum::{routing::get, Router};
use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::warn;

use crate::classify::Prediction;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process and publish the vocabulary size.
    pub fn init(vocabulary_entries: usize) -> Self {
        let handle = HANDLE
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(h) => h,
                Err(e) => {
                    // Another recorder is already global; render from a detached one.
                    warn!(error = %e, "prometheus recorder not installed");
                    PrometheusBuilder::new().build_recorder().handle()
                }
            })
            .clone();

        gauge!("vocabulary_entries").set(vocabulary_entries as f64);

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

pub fn record_prediction(p: &Prediction) {
    counter!(
        "classifier_requests_total",
        "category" => p.category.as_str(),
        "method" => p.method.as_str()
    )
    .increment(1);
}
