//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use spamguard_core::{BatchResponse, ClassificationRequest, ClassificationResult, HealthStatus};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::service;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/predict", post(predict))
        .route("/batch_predict", post(batch_predict))
        .fallback(fallback)
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Spam Detection API", "status": "online" }))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus::from_loaded(state.model_loaded()))
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics_handle()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<ClassificationRequest>, JsonRejection>,
) -> Result<Json<ClassificationResult>, AppError> {
    metrics::counter!("spamguard_requests_total", "endpoint" => "predict").increment(1);
    let Json(request) = payload?;

    let result = service::predict(&state, &request).await?;
    Ok(Json(result))
}

async fn batch_predict(
    State(state): State<AppState>,
    payload: Result<Json<Vec<ClassificationRequest>>, JsonRejection>,
) -> Result<Json<BatchResponse>, AppError> {
    metrics::counter!("spamguard_requests_total", "endpoint" => "batch_predict").increment(1);
    let Json(requests) = payload?;

    info!("Received batch of {} messages", requests.len());
    Ok(Json(service::batch_predict(&state, &requests).await))
}

async fn fallback() -> AppError {
    AppError::NotFound
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    InvalidRequest(StatusCode, String),
    ServiceUnavailable(String),
    Prediction(String),
    NotFound,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.status(), rejection.body_text())
    }
}

impl From<spamguard_core::Error> for AppError {
    fn from(err: spamguard_core::Error) -> Self {
        metrics::counter!("spamguard_errors_total", "kind" => err.kind()).increment(1);
        match err {
            spamguard_core::Error::ServiceUnavailable(msg) => AppError::ServiceUnavailable(msg),
            spamguard_core::Error::Prediction(msg) => AppError::Prediction(msg),
            other => {
                error!("Prediction failed: {}", other);
                AppError::Prediction(other.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::InvalidRequest(status, msg) => (status, "invalid_request_error", msg),
            AppError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
            AppError::Prediction(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "prediction_error", msg),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", "Not found".to_string()),
        };

        let body = json!({
            "detail": message,
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
