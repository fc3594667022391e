use crate::history::HistoryEntry;
use crate::state::DashboardState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use spamguard_core::{BatchItemResult, ClassificationRequest, HealthStatus};
use tracing::{info, warn};

const DEFAULT_HISTORY_LIMIT: usize = 10;

// ============================================================================
// Health endpoints
// ============================================================================

/// Prediction API health as seen from the dashboard
pub async fn health(State(state): State<DashboardState>) -> impl IntoResponse {
    match state.api.health().await {
        Ok(status) => Json(status),
        Err(e) => {
            warn!("Prediction API not reachable: {}", e);
            Json(HealthStatus {
                status: "unreachable".to_string(),
                model_loaded: false,
            })
        }
    }
}

// ============================================================================
// Analysis endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: String,
}

pub async fn analyze(
    State(state): State<DashboardState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<HistoryEntry>, DashboardError> {
    let Json(req) = payload?;
    if req.text.is_empty() {
        return Err(DashboardError::BadRequest(
            "Please enter a message first.".to_string(),
        ));
    }

    let result = state
        .api
        .predict(&ClassificationRequest::new(req.text.as_str()))
        .await
        .map_err(|e| DashboardError::Upstream(e.to_string()))?;

    let entry = HistoryEntry::new(&req.text, &result);
    state.history.push(entry.clone());
    Ok(Json(entry))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub messages: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchSummary {
    pub results: Vec<BatchItemResult>,
    pub total: usize,
    pub spam_count: usize,
}

pub async fn batch(
    State(state): State<DashboardState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchSummary>, DashboardError> {
    let Json(req) = payload?;
    if req.messages.is_empty() {
        return Err(DashboardError::BadRequest(
            "No messages found to analyze.".to_string(),
        ));
    }

    let requests: Vec<_> = req
        .messages
        .into_iter()
        .map(ClassificationRequest::new)
        .collect();

    let response = state
        .api
        .batch_predict(&requests)
        .await
        .map_err(|e| DashboardError::Upstream(e.to_string()))?;

    let spam_count = response.spam_count();
    info!(
        "Batch analysis complete: {} messages, {} spam",
        response.total, spam_count
    );

    Ok(Json(BatchSummary {
        results: response.results,
        total: response.total,
        spam_count,
    }))
}

// ============================================================================
// History endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub async fn history(
    State(state): State<DashboardState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Json(state.history.recent(limit))
}

pub async fn clear_history(State(state): State<DashboardState>) -> impl IntoResponse {
    state.history.clear();
    Json(serde_json::json!({ "status": "cleared" }))
}

pub async fn stats(State(state): State<DashboardState>) -> impl IntoResponse {
    Json(state.history.stats())
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum DashboardError {
    BadRequest(String),
    Upstream(String),
}

impl From<JsonRejection> for DashboardError {
    fn from(rejection: JsonRejection) -> Self {
        DashboardError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            DashboardError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            DashboardError::Upstream(msg) => {
                warn!("Prediction API call failed: {}", msg);
                (StatusCode::BAD_GATEWAY, format!("API Error: {}", msg))
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
