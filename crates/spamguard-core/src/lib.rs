//! SpamGuard Core
//!
//! Types and errors shared by every SpamGuard component.
//!
//! This crate provides:
//! - The wire types of the prediction API (requests, results, batch items)
//! - The error taxonomy used across the classifier, service and router layers
//! - The text echo helper used in batch responses and dashboard history

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    echo_text, BatchItemResult, BatchResponse, ClassificationRequest, ClassificationResult,
    HealthStatus, ECHO_LIMIT, ECHO_MARKER,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        BatchItemResult, BatchResponse, ClassificationRequest, ClassificationResult,
        HealthStatus,
    };
}
