//! Core types for SpamGuard

use serde::{Deserialize, Serialize};

/// Number of characters of input echoed back in batch results
pub const ECHO_LIMIT: usize = 100;

/// Marker appended to echoed text that was cut at [`ECHO_LIMIT`]
pub const ECHO_MARKER: &str = "....";

/// A single text to classify
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    /// Text content to classify
    pub text: String,

    /// Opaque caller metadata, passed through untouched
    #[serde(default)]
    pub user_id: Option<String>,
}

impl ClassificationRequest {
    /// Create a request without a user id
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            user_id: None,
        }
    }

    /// Attach a user id
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Outcome of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Whether the text was classified as spam
    pub is_spam: bool,

    /// Probability of spam in [0, 1]
    pub confidence: f64,

    /// Wall-clock inference time in seconds
    #[serde(rename = "prediction_time")]
    pub elapsed_time: f64,
}

/// One entry of a batch response.
///
/// Exactly one of the two shapes is produced per input item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItemResult {
    Success {
        text: String,
        is_spam: bool,
        confidence: f64,
        user_id: Option<String>,
    },
    Failure {
        text: String,
        error: String,
    },
}

impl BatchItemResult {
    /// Build a success entry, echoing a truncated copy of the input
    pub fn success(request: &ClassificationRequest, result: &ClassificationResult) -> Self {
        Self::Success {
            text: echo_text(&request.text),
            is_spam: result.is_spam,
            confidence: result.confidence,
            user_id: request.user_id.clone(),
        }
    }

    /// Build a failure entry, echoing a truncated copy of the input
    pub fn failure(request: &ClassificationRequest, error: impl ToString) -> Self {
        Self::Failure {
            text: echo_text(&request.text),
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Spam flag of a successful entry
    pub fn is_spam(&self) -> Option<bool> {
        match self {
            Self::Success { is_spam, .. } => Some(*is_spam),
            Self::Failure { .. } => None,
        }
    }

    /// The echoed text
    pub fn text(&self) -> &str {
        match self {
            Self::Success { text, .. } | Self::Failure { text, .. } => text,
        }
    }
}

/// Response of the batch prediction endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItemResult>,
    pub total: usize,
}

impl BatchResponse {
    pub fn new(results: Vec<BatchItemResult>) -> Self {
        let total = results.len();
        Self { results, total }
    }

    /// Number of entries classified as spam
    pub fn spam_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.is_spam() == Some(true))
            .count()
    }
}

/// Readiness report of the prediction API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "healthy" or "unhealthy"
    pub status: String,

    /// Whether the classifier loaded successfully
    pub model_loaded: bool,
}

impl HealthStatus {
    pub fn from_loaded(model_loaded: bool) -> Self {
        let status = if model_loaded { "healthy" } else { "unhealthy" };
        Self {
            status: status.to_string(),
            model_loaded,
        }
    }
}

/// Echo `text` cut to [`ECHO_LIMIT`] characters, followed by [`ECHO_MARKER`]
/// when it was longer. Shorter texts are returned unchanged.
pub fn echo_text(text: &str) -> String {
    match text.char_indices().nth(ECHO_LIMIT) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ECHO_MARKER),
        None => text.to_string(),
    }
}
