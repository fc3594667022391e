//! Prediction logic behind the HTTP handlers

use futures::future::join_all;
use spamguard_core::{
    BatchItemResult, BatchResponse, ClassificationRequest, ClassificationResult, Result,
};
use tracing::{debug, warn};

use crate::state::AppState;

/// Classify one request
pub async fn predict(state: &AppState, request: &ClassificationRequest) -> Result<ClassificationResult> {
    let classifier = state.classifier()?;
    let verdict = classifier.classify(&request.text).await?;

    metrics::counter!("spamguard_predictions_total", "label" => verdict.label()).increment(1);
    metrics::histogram!("spamguard_inference_latency_us")
        .record(verdict.latency.as_micros() as f64);
    debug!(
        user_id = request.user_id.as_deref().unwrap_or("-"),
        label = verdict.label(),
        confidence = verdict.confidence,
        "Classified message"
    );

    Ok(verdict.into())
}

/// Classify every request independently.
///
/// Output order matches input order and a failing item becomes a tagged
/// error entry instead of failing the batch.
pub async fn batch_predict(state: &AppState, requests: &[ClassificationRequest]) -> BatchResponse {
    let results = join_all(requests.iter().map(|request| async move {
        match predict(state, request).await {
            Ok(result) => BatchItemResult::success(request, &result),
            Err(e) => {
                warn!("Batch item failed: {}", e);
                metrics::counter!("spamguard_errors_total", "kind" => e.kind()).increment(1);
                BatchItemResult::failure(request, e)
            }
        }
    }))
    .await;

    BatchResponse::new(results)
}
