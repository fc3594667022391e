//! SpamGuard Prediction API
//!
//! Stateless HTTP layer over the spam classifier: health, single and batch
//! prediction, and Prometheus metrics. The only shared state is a read-only
//! handle to the classifier loaded at startup.

pub mod cli;
pub mod config;
pub mod routes;
pub mod service;
pub mod state;

pub use cli::Cli;
pub use config::{ApiConfig, ModelSettings};
pub use routes::create_router;
pub use state::AppState;
