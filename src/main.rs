//! Reward NLP Engine - Binary Entrypoint
//! Boots the Axum HTTP server with the feedback/dispute pipeline and
//! Prometheus metrics.

use reward_nlp_engine::{api, telemetry, AppState};
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    telemetry::init_tracing();

    let state = AppState::from_env();
    let router = api::router(state);

    Ok(router.into())
}
