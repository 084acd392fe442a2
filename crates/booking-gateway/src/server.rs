//! HTTP server for predictions, metrics and health checks.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use booking_core::error::Error;
use booking_core::types::{BookingClass, BookingRecord, ClassProbabilities};
use booking_model::inference::{BookingPredictor, Prediction};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use crate::form::BookingForm;
use crate::metrics::MetricsRegistry;

/// Largest request body accepted
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Server state
pub struct ServerState {
    /// Shared predictor
    pub predictor: BookingPredictor,
    /// Metrics registry
    pub metrics: Arc<MetricsRegistry>,
    /// Application status
    pub status: RwLock<AppStatus>,
    started: Instant,
}

/// Application status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStatus {
    /// Starting up
    Starting,
    /// Running normally
    Running,
    /// Serving with placeholder artifacts; predictions will fail
    Degraded,
    /// Shutting down
    ShuttingDown,
}

impl AppStatus {
    fn as_str(self) -> &'static str {
        match self {
            AppStatus::Starting => "starting",
            AppStatus::Running => "ok",
            AppStatus::Degraded => "degraded",
            AppStatus::ShuttingDown => "shutting_down",
        }
    }
}

impl ServerState {
    /// Create a new server state
    #[must_use]
    pub fn new(predictor: BookingPredictor, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            predictor,
            metrics,
            status: RwLock::new(AppStatus::Starting),
            started: Instant::now(),
        }
    }

    /// Set application status
    pub async fn set_status(&self, status: AppStatus) {
        let mut s = self.status.write().await;
        *s = status;
    }

    /// Get application status
    pub async fn get_status(&self) -> AppStatus {
        *self.status.read().await
    }

    /// Check if application is healthy
    pub async fn is_healthy(&self) -> bool {
        matches!(
            self.get_status().await,
            AppStatus::Running | AppStatus::Starting
        )
    }
}

/// Health check response
#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    /// Status string
    pub status: &'static str,
    /// Application version
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime_secs: u64,
    /// Scaler is fitted
    pub scaler_fitted: bool,
    /// Encoders are fitted
    pub encoders_fitted: bool,
}

/// Prediction response body
#[derive(Debug, serde::Serialize)]
pub struct PredictResponse {
    /// Predicted class, 0 or 1
    pub predicted_class: BookingClass,
    /// Per-class probabilities
    pub probabilities: ClassProbabilities,
    /// Probability of the predicted class
    pub confidence: f64,
    /// Human-readable outcome
    pub summary: String,
}

impl From<&Prediction> for PredictResponse {
    fn from(prediction: &Prediction) -> Self {
        Self {
            predicted_class: prediction.predicted_class,
            probabilities: prediction.probabilities,
            confidence: prediction.confidence(),
            summary: prediction.summary(),
        }
    }
}

/// Error response, rendered as `{"error": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl std::fmt::Display) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        if e.is_input_error() || matches!(e, Error::SerializationError(_)) {
            Self::new(StatusCode::BAD_REQUEST, e)
        } else {
            tracing::error!("Prediction failed: {}", e);
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Build the HTTP router
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/predict/form", post(predict_form_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Run one prediction and account for it in the metrics
fn respond(
    state: &ServerState,
    record: Result<BookingRecord, ApiError>,
) -> Result<Json<PredictResponse>, ApiError> {
    let result = record.and_then(|record| Ok(state.predictor.predict(&record)?));
    match result {
        Ok(prediction) => {
            state
                .metrics
                .record_prediction(prediction.predicted_class, prediction.latency_ns);
            Ok(Json(PredictResponse::from(&prediction)))
        }
        Err(e) => {
            state.metrics.record_rejection();
            Err(e)
        }
    }
}

/// Malformed bodies are client errors whatever axum's own status would be
fn rejected(rejection: JsonRejection) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
}

/// Classify a raw booking record
async fn predict_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<BookingRecord>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let record = payload.map(|Json(record)| record).map_err(rejected);
    respond(&state, record)
}

/// Classify the default booking form with the given fields replaced
async fn predict_form_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let record = payload.map_err(rejected).and_then(|Json(overrides)| {
        let form = BookingForm::default().apply_overrides(&overrides)?;
        Ok(form.to_booking_record())
    });
    respond(&state, record)
}

async fn health_handler(State(state): State<Arc<ServerState>>) -> (StatusCode, Json<HealthResponse>) {
    let artifacts = state.predictor.store().status();
    let health = HealthResponse {
        status: state.get_status().await.as_str(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started.elapsed().as_secs(),
        scaler_fitted: artifacts.scaler_fitted,
        encoders_fitted: artifacts.encoders_fitted,
    };
    let code = if state.is_healthy().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(health))
}

async fn metrics_handler(State(state): State<Arc<ServerState>>) -> Result<Response, ApiError> {
    let body = state
        .metrics
        .encode()
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response())
}

/// Serve the router on an already-bound listener
pub async fn serve(state: Arc<ServerState>, listener: TcpListener) -> anyhow::Result<()> {
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

/// Bind and start the prediction server
pub async fn start_server(state: Arc<ServerState>, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!("Prediction server listening on port {}", port);
    serve(state, listener).await
}
