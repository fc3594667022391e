//! Prediction API abstraction

use async_trait::async_trait;
use spamguard_core::{
    BatchResponse, ClassificationRequest, ClassificationResult, HealthStatus, Result,
};

/// Operations of the prediction API as seen by its callers
#[async_trait]
pub trait PredictionApi: Send + Sync {
    /// `POST /predict`
    async fn predict(&self, request: &ClassificationRequest) -> Result<ClassificationResult>;

    /// `POST /batch_predict`
    async fn batch_predict(&self, requests: &[ClassificationRequest]) -> Result<BatchResponse>;

    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus>;
}
