use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::batch::{self, BatchReport};
use crate::error::EngineError;
use crate::explanation::CommissionSummary;
use crate::metrics::{self, Metrics};
use crate::pipeline::{DisputeRequest, Engine, FeedbackRequest, PerformanceRequest};
use crate::report::{
    now_rfc3339, DisputeAnalysis, FeedbackAnalysis, ModelInfo, PerformanceEvaluation,
};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub metrics: Option<Metrics>,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Option<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Engine from config files/env plus the Prometheus recorder.
    pub fn from_env() -> Self {
        Self::new(Engine::from_env()).with_metrics(Metrics::try_init())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/model-info", get(model_info))
        .route("/process-feedback", post(process_feedback))
        .route("/analyze-dispute", post(analyze_dispute))
        .route("/evaluate-performance", post(evaluate_performance))
        .route("/explain-commission", post(explain_commission))
        .route("/batch/feedback", post(batch_feedback))
        .route("/batch/disputes", post(batch_disputes))
        .route("/metrics", get(render_metrics))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// `{ success, data | error, timestamp }`
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: now_rfc3339(),
        })
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        let status = match e {
            EngineError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::Classifier(_) | EngineError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("malformed request payload: {}", r.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(target: "api", status = %self.status, error = %self.message, "request failed");
        }
        let body = Envelope::<()> {
            success: false,
            data: None,
            error: Some(self.message),
            timestamp: now_rfc3339(),
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

fn observe(route: &'static str, started: Instant) {
    metrics::record_duration(route, started.elapsed().as_secs_f64() * 1000.0);
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifierStatus {
    pub provider: String,
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Components {
    pub lexicons: bool,
    pub classifier: ClassifierStatus,
    pub metrics: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub components: Components,
}

async fn health(State(state): State<AppState>) -> Json<Envelope<Health>> {
    let scorer = state.engine.scorer();
    Envelope::ok(Health {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now_rfc3339(),
        components: Components {
            // rule-based path is always ready
            lexicons: true,
            classifier: ClassifierStatus {
                provider: scorer.classifier_name().to_string(),
                enabled: scorer.classifier_enabled(),
            },
            metrics: state.metrics.is_some(),
        },
    })
}

async fn model_info(State(state): State<AppState>) -> Json<Envelope<ModelInfo>> {
    Envelope::ok(state.engine.model_info())
}

async fn process_feedback(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<FeedbackAnalysis> {
    let started = Instant::now();
    let Json(req) = payload?;
    let out = state.engine.process_feedback(&req).await?;
    observe("process_feedback", started);
    Ok(Envelope::ok(out))
}

async fn analyze_dispute(
    State(state): State<AppState>,
    payload: Result<Json<DisputeRequest>, JsonRejection>,
) -> ApiResult<DisputeAnalysis> {
    let started = Instant::now();
    let Json(req) = payload?;
    let out = state.engine.analyze_dispute(&req).await?;
    observe("analyze_dispute", started);
    Ok(Envelope::ok(out))
}

async fn evaluate_performance(
    State(state): State<AppState>,
    payload: Result<Json<PerformanceRequest>, JsonRejection>,
) -> ApiResult<PerformanceEvaluation> {
    let started = Instant::now();
    let Json(req) = payload?;
    let out = state.engine.evaluate_performance(&req).await?;
    observe("evaluate_performance", started);
    Ok(Envelope::ok(out))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Explanation {
    pub explanation: String,
}

async fn explain_commission(
    State(state): State<AppState>,
    payload: Result<Json<CommissionSummary>, JsonRejection>,
) -> ApiResult<Explanation> {
    let Json(summary) = payload?;
    Ok(Envelope::ok(Explanation {
        explanation: state.engine.explain_commission(&summary),
    }))
}

#[derive(Debug, Deserialize)]
pub struct BatchPayload<T> {
    pub items: Vec<T>,
}

async fn batch_feedback(
    State(state): State<AppState>,
    payload: Result<Json<BatchPayload<FeedbackRequest>>, JsonRejection>,
) -> ApiResult<BatchReport<FeedbackAnalysis>> {
    let started = Instant::now();
    let Json(body) = payload?;
    batch::validate_batch_len(body.items.len())?;
    let report = batch::process_feedback_batch(Arc::clone(&state.engine), body.items).await;
    observe("batch_feedback", started);
    Ok(Envelope::ok(report))
}

async fn batch_disputes(
    State(state): State<AppState>,
    payload: Result<Json<BatchPayload<DisputeRequest>>, JsonRejection>,
) -> ApiResult<BatchReport<DisputeAnalysis>> {
    let started = Instant::now();
    let Json(body) = payload?;
    batch::validate_batch_len(body.items.len())?;
    let report = batch::analyze_dispute_batch(Arc::clone(&state.engine), body.items).await;
    observe("batch_disputes", started);
    Ok(Envelope::ok(report))
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(m) => m.render().into_response(),
        None => (
            StatusCode::NOT_FOUND,
            "metrics recorder not installed".to_string(),
        )
            .into_response(),
    }
}
