//! Decision policy: raw model output to spam verdict

use crate::classifier::Verdict;
use serde::{Deserialize, Serialize};
use spamguard_core::{Error, Result};
use std::time::Duration;

/// How the raw model output is squashed into a confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTransform {
    /// Logistic sigmoid over a raw logit
    #[default]
    Sigmoid,
    /// The model already emits a probability; clamp to [0, 1]
    Identity,
}

impl ScoreTransform {
    pub fn apply(self, raw: f32) -> f32 {
        match self {
            Self::Sigmoid => 1.0 / (1.0 + (-raw).exp()),
            Self::Identity => raw.clamp(0.0, 1.0),
        }
    }
}

/// Threshold and transform applied to every prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    /// A confidence strictly above this value is spam
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    #[serde(default)]
    pub transform: ScoreTransform,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            transform: ScoreTransform::default(),
        }
    }
}

impl DecisionPolicy {
    /// Validate that the threshold is a usable probability
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::config(format!(
                "decision threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Turn a raw model output into a verdict
    pub fn decide(&self, raw: f32, latency: Duration) -> Result<Verdict> {
        let confidence = self.transform.apply(raw);
        if !confidence.is_finite() {
            return Err(Error::prediction(format!(
                "model produced a non-finite score ({})",
                raw
            )));
        }

        Ok(Verdict {
            is_spam: confidence > self.threshold,
            confidence,
            latency,
        })
    }
}

fn default_threshold() -> f32 {
    0.5
}
