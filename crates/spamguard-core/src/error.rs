//! Error types for SpamGuard

/// Result type alias using SpamGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for SpamGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model artifact is missing, corrupted or in an incompatible format
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// No classifier was loaded at startup
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The inference call failed
    #[error("prediction error: {0}")]
    Prediction(String),

    /// An inbound message payload could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// A call to the prediction API failed or returned a non-success status
    #[error("downstream call error: {0}")]
    Downstream(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timeout errors
    #[error("operation timed out")]
    Timeout,

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new model load error
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create a new service unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    /// Create a new prediction error
    pub fn prediction(msg: impl Into<String>) -> Self {
        Self::Prediction(msg.into())
    }

    /// Create a new decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new downstream call error
    pub fn downstream(msg: impl Into<String>) -> Self {
        Self::Downstream(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short machine-readable name of the error kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModelLoad(_) => "model_load",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Prediction(_) => "prediction",
            Self::Decode(_) => "decode",
            Self::Downstream(_) => "downstream",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Timeout => "timeout",
            Self::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::unavailable("Model not loaded");
        assert_eq!(err.to_string(), "service unavailable: Model not loaded");
        assert_eq!(err.kind(), "service_unavailable");

        assert_eq!(Error::Timeout.to_string(), "operation timed out");
    }

    #[test]
    fn test_serde_error_converts() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "serialization");
    }
}
