//! Dashboard API tests against a mock prediction API

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use spamguard_client::PredictionApi;
use spamguard_core::{
    BatchItemResult, BatchResponse, ClassificationRequest, ClassificationResult, Error,
    HealthStatus, Result,
};
use spamguard_dashboard::{build_app, DashboardState};
use std::sync::Arc;
use tower::ServiceExt;

/// Calls "prize" spam; every call fails when `reachable` is false
struct MockApi {
    reachable: bool,
}

impl MockApi {
    fn result(text: &str) -> ClassificationResult {
        let spam = text.contains("prize");
        ClassificationResult {
            is_spam: spam,
            confidence: if spam { 0.88 } else { 0.12 },
            elapsed_time: 0.004,
        }
    }

    fn check(&self) -> Result<()> {
        if self.reachable {
            Ok(())
        } else {
            Err(Error::downstream("request failed: connection refused"))
        }
    }
}

#[async_trait]
impl PredictionApi for MockApi {
    async fn predict(&self, request: &ClassificationRequest) -> Result<ClassificationResult> {
        self.check()?;
        Ok(Self::result(&request.text))
    }

    async fn batch_predict(&self, requests: &[ClassificationRequest]) -> Result<BatchResponse> {
        self.check()?;
        Ok(BatchResponse::new(
            requests
                .iter()
                .map(|r| BatchItemResult::success(r, &Self::result(&r.text)))
                .collect(),
        ))
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.check()?;
        Ok(HealthStatus::from_loaded(true))
    }
}

fn app_with(reachable: bool) -> (Router, DashboardState) {
    let state = DashboardState::new(Arc::new(MockApi { reachable }), 1000);
    (build_app(state.clone()), state)
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_passthrough_and_unreachable() {
    let (app, _) = app_with(true);
    let (status, body) = call(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy", "model_loaded": true }));

    let (app, _) = app_with(false);
    let (_, body) = call(&app, get("/api/health")).await;
    assert_eq!(body, json!({ "status": "unreachable", "model_loaded": false }));
}

#[tokio::test]
async fn test_analyze_records_history() {
    let (app, state) = app_with(true);

    let (status, body) = call(&app, post("/api/analyze", json!({ "text": "Claim your prize" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_spam"], true);
    assert_eq!(body["text"], "Claim your prize");
    assert_eq!(body["prediction_time"], 0.004);
    assert_eq!(state.history.len(), 1);

    let (_, history) = call(&app, get("/api/history")).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_analyze_empty_text_is_rejected() {
    let (app, state) = app_with(true);

    for body in [json!({ "text": "" }), json!({})] {
        let (status, response) = call(&app, post("/api/analyze", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Please enter a message first.");
    }
    assert!(state.history.is_empty());
}

#[tokio::test]
async fn test_analyze_accepts_whitespace_text() {
    let (app, state) = app_with(true);

    let (status, body) = call(&app, post("/api/analyze", json!({ "text": "   " }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "   ");
    assert_eq!(body["is_spam"], false);
    assert_eq!(state.history.len(), 1);
}

#[tokio::test]
async fn test_analyze_upstream_failure() {
    let (app, state) = app_with(false);

    let (status, body) = call(&app, post("/api/analyze", json!({ "text": "hello" }))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().starts_with("API Error"));
    assert!(state.history.is_empty());
}

#[tokio::test]
async fn test_history_limit_and_stats() {
    let (app, _) = app_with(true);

    for text in ["win a prize", "hello", "prize inside", "see you"] {
        call(&app, post("/api/analyze", json!({ "text": text }))).await;
    }

    let (_, recent) = call(&app, get("/api/history?limit=2")).await;
    let recent = recent.as_array().unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0]["text"], "see you");
    assert_eq!(recent[1]["text"], "prize inside");

    let (_, stats) = call(&app, get("/api/stats")).await;
    assert_eq!(stats["total"], 4);
    assert_eq!(stats["spam_count"], 2);
    assert_eq!(stats["spam_rate"], 50.0);

    let (status, _) = call(&app, post("/api/history/clear", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, stats) = call(&app, get("/api/stats")).await;
    assert_eq!(stats["total"], 0);
}

#[tokio::test]
async fn test_batch_summary() {
    let (app, state) = app_with(true);

    let messages = json!({ "messages": ["grand prize", "hi mom", "prize draw"] });
    let (status, body) = call(&app, post("/api/batch", messages)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["spam_count"], 2);
    assert_eq!(body["results"][1]["text"], "hi mom");
    // batches are not part of the single-message history
    assert!(state.history.is_empty());
}

#[tokio::test]
async fn test_batch_rejects_empty_and_malformed() {
    let (app, _) = app_with(true);

    let (status, _) = call(&app, post("/api/batch", json!({ "messages": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, post("/api/batch", json!({ "rows": ["x"] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_index_page_served() {
    let (app, _) = app_with(true);

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8_lossy(&bytes);
    assert!(page.contains("Spam Detection Dashboard"));
}

#[tokio::test]
async fn test_unknown_api_path_is_404() {
    let (app, _) = app_with(true);
    let (status, body) = call(&app, get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}
