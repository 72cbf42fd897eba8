//! Resale matcher service: binary entrypoint.
//! Boots the Axum HTTP server with the classifier, matcher and debug routes.

use shuttle_axum::ShuttleAxum;

use resale_matcher::{init_tracing, router, AppState};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    // Vocabulary, patterns and embedder config must all load, or the service does not start.
    let state = AppState::from_env()?;
    let router = router(state);

    Ok(router.into())
}
