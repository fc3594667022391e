//! Outbound side of the bridge

use async_trait::async_trait;
use rumqttc::{AsyncClient, QoS};
use spamguard_core::{Error, Result};

/// Sink for messages the router emits
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;
}

/// Publishes through a rumqttc client handle
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
    qos: QoS,
}

impl MqttPublisher {
    pub fn new(client: AsyncClient) -> Self {
        Self {
            client,
            qos: QoS::AtLeastOnce,
        }
    }

    pub fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }
}

#[async_trait]
impl Publisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.client
            .publish(topic, self.qos, false, payload)
            .await
            .map_err(|e| Error::downstream(format!("publish to {} failed: {}", topic, e)))
    }
}
