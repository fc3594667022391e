//! SpamGuard Client
//!
//! Typed access to the prediction API for the message router and the
//! dashboard. Every call is bounded by a request timeout and retried with
//! exponential backoff on transport failures and 5xx responses.

pub mod api;
pub mod http;

pub use api::PredictionApi;
pub use http::{ClientConfig, HttpPredictionClient};
