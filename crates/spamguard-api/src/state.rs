//! Application state shared across requests

use metrics_exporter_prometheus::PrometheusHandle;
use spamguard_classifiers::{Classifier, SpamModel};
use spamguard_core::{Error, Result};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::ApiConfig;

/// Composition root of the prediction API.
///
/// The classifier is `None` when loading failed; the service then runs in a
/// degraded mode where health reports unhealthy and predictions return 503.
#[derive(Clone)]
pub struct AppState {
    classifier: Option<Arc<dyn Classifier>>,
    metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(classifier: Option<Arc<dyn Classifier>>) -> Self {
        Self {
            classifier,
            metrics_handle: None,
        }
    }

    /// Load the classifier described by `config`, degrading on failure
    pub fn from_config(config: &ApiConfig) -> Self {
        let loaded = config
            .model
            .to_model_config()
            .and_then(|model_config| SpamModel::load(&model_config));

        match loaded {
            Ok(model) => {
                info!(
                    "Classifier '{}' ready (threshold {})",
                    model.name(),
                    model.policy().threshold
                );
                Self::new(Some(Arc::new(model)))
            }
            Err(e) => {
                error!("Failed to load model: {}", e);
                Self::new(None)
            }
        }
    }

    /// Attach the Prometheus handle used by `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    /// The loaded classifier, or `ServiceUnavailable`
    pub fn classifier(&self) -> Result<&Arc<dyn Classifier>> {
        self.classifier
            .as_ref()
            .ok_or_else(|| Error::unavailable("Model not loaded"))
    }

    pub fn metrics_handle(&self) -> Option<&PrometheusHandle> {
        self.metrics_handle.as_ref()
    }
}
