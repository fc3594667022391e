//! reqwest implementation of [`PredictionApi`]

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use spamguard_core::{
    BatchResponse, ClassificationRequest, ClassificationResult, Error, HealthStatus, Result,
};
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::PredictionApi;

/// Connection settings for the prediction API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL, e.g. `http://api:8000`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// First backoff delay
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Backoff delay cap
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Response statuses worth another attempt; anything else fails at once
    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            retry_statuses: default_retry_statuses(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(self.min_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_max_times(self.max_retries)
            .with_jitter()
    }
}

fn default_base_url() -> String {
    "http://api:8000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> usize {
    3
}

fn default_min_delay_ms() -> u64 {
    200
}

fn default_max_delay_ms() -> u64 {
    2_000
}

// 500 and 503 from the prediction API are deterministic (failed inference,
// model not loaded), so only gateway failures are retried
fn default_retry_statuses() -> Vec<u16> {
    vec![502, 504]
}

/// Failure of a single attempt
#[derive(Debug)]
enum CallError {
    Transport(reqwest::Error),
    Status { status: StatusCode, body: String },
}

impl CallError {
    /// Transport failures and the configured statuses are worth another attempt
    fn is_retryable(&self, retry_statuses: &[u16]) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Status { status, .. } => retry_statuses.contains(&status.as_u16()),
        }
    }
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "{}", e),
            Self::Status { status, body } => write!(f, "status {}: {}", status, body),
        }
    }
}

impl From<CallError> for Error {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Transport(e) if e.is_timeout() => Error::Timeout,
            CallError::Transport(e) => Error::downstream(format!("request failed: {}", e)),
            CallError::Status { status, body } => {
                Error::downstream(format!("prediction API returned {}: {}", status, body))
            }
        }
    }
}

/// Prediction API client over HTTP
#[derive(Clone)]
pub struct HttpPredictionClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpPredictionClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> std::result::Result<T, CallError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CallError::Status { status, body });
        }
        response.json::<T>().await.map_err(CallError::Transport)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let url = url.as_str();
        debug!("POST {}", url);

        let attempt = || async move {
            let response = self
                .http
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(CallError::Transport)?;
            Self::decode::<T>(response).await
        };

        attempt
            .retry(self.config.backoff())
            .when(|e: &CallError| e.is_retryable(&self.config.retry_statuses))
            .notify(|err, delay| warn!("POST {} failed ({}), retrying in {:?}", url, err, delay))
            .await
            .map_err(Error::from)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let url = url.as_str();
        debug!("GET {}", url);

        let attempt = || async move {
            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(CallError::Transport)?;
            Self::decode::<T>(response).await
        };

        attempt
            .retry(self.config.backoff())
            .when(|e: &CallError| e.is_retryable(&self.config.retry_statuses))
            .notify(|err, delay| warn!("GET {} failed ({}), retrying in {:?}", url, err, delay))
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl PredictionApi for HttpPredictionClient {
    async fn predict(&self, request: &ClassificationRequest) -> Result<ClassificationResult> {
        self.post_json("/predict", request).await
    }

    async fn batch_predict(&self, requests: &[ClassificationRequest]) -> Result<BatchResponse> {
        self.post_json("/batch_predict", requests).await
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.get_json("/health").await
    }
}
