use spamguard_client::PredictionApi;
use std::sync::Arc;

use crate::history::History;

/// Shared application state
#[derive(Clone)]
pub struct DashboardState {
    /// Prediction API client
    pub api: Arc<dyn PredictionApi>,

    /// Analyzed messages for the history panel
    pub history: Arc<History>,
}

impl DashboardState {
    pub fn new(api: Arc<dyn PredictionApi>, history_capacity: usize) -> Self {
        Self {
            api,
            history: Arc::new(History::new(history_capacity)),
        }
    }
}
