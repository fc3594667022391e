//! SpamGuard Classifiers
//!
//! The classifier adapter: loads a serialized text model once and exposes a
//! single inference call producing a spam/ham verdict.
//!
//! The model is an opaque artifact on disk. It is loaded with Candle and run
//! on CPU by default; the decision threshold and score transform are
//! configuration, not constants.

pub mod classifier;
pub mod model_config;
pub mod model_loader;
pub mod policy;
pub mod text_model;

pub use classifier::{Classifier, Verdict};
pub use model_config::{Architecture, TextModelConfig};
pub use model_loader::{DeviceType, ModelConfig, SpamModel};
pub use policy::{DecisionPolicy, ScoreTransform};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Classifier, Verdict};
    pub use crate::model_loader::{DeviceType, ModelConfig, SpamModel};
    pub use crate::policy::{DecisionPolicy, ScoreTransform};
}
