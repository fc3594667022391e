//! Classifier trait and verdict type

use async_trait::async_trait;
use spamguard_core::{ClassificationResult, Result};
use std::time::Duration;

/// Trait for spam classifiers.
///
/// Implementations take `&self` and must be safe to call concurrently; the
/// prediction service shares one instance across all requests.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the given text
    async fn classify(&self, text: &str) -> Result<Verdict>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Spam/ham decision for one text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// Whether the text is spam under the configured threshold
    pub is_spam: bool,

    /// Transformed score in [0, 1]
    pub confidence: f32,

    /// Wall-clock time spent in inference
    pub latency: Duration,
}

impl Verdict {
    /// Label used in logs and metrics
    pub fn label(&self) -> &'static str {
        if self.is_spam {
            "spam"
        } else {
            "ham"
        }
    }
}

impl From<Verdict> for ClassificationResult {
    fn from(verdict: Verdict) -> Self {
        Self {
            is_spam: verdict.is_spam,
            confidence: f64::from(verdict.confidence),
            elapsed_time: verdict.latency.as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_into_result() {
        let verdict = Verdict {
            is_spam: true,
            confidence: 0.5,
            latency: Duration::from_millis(250),
        };
        assert_eq!(verdict.label(), "spam");

        let result: ClassificationResult = verdict.into();
        assert!(result.is_spam);
        assert_eq!(result.confidence, 0.5);
        assert!((result.elapsed_time - 0.25).abs() < 1e-9);
    }
}
