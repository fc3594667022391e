//! SpamGuard Router
//!
//! Bridges an MQTT broker and the prediction API. Messages arriving on the
//! inbound topics are classified over HTTP and the outcome is republished on
//! the result topics.

pub mod bridge;
pub mod cli;
pub mod config;
pub mod publisher;
pub mod router;
pub mod topics;

pub use bridge::{Bridge, ConnectionState, Session};
pub use cli::Cli;
pub use config::{BrokerConfig, RouterConfig};
pub use publisher::{MqttPublisher, Publisher};
pub use router::MessageRouter;
