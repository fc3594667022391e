//! Router configuration

use rumqttc::MqttOptions;
use serde::{Deserialize, Serialize};
use spamguard_client::ClientConfig;
use std::path::Path;
use std::time::Duration;

use crate::cli::Cli;

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// MQTT broker connection
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Prediction API client
    #[serde(default)]
    pub api: ClientConfig,

    /// Maximum messages processed concurrently
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Messages allowed to wait for a processing slot; further arrivals are dropped
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,

    /// Address for the Prometheus exporter, disabled when unset
    #[serde(default)]
    pub metrics_listen: Option<String>,
}

impl RouterConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(&cli.config).exists() {
            let content = std::fs::read_to_string(&cli.config)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(host) = &cli.broker_host {
            config.broker.host = host.clone();
        }
        if let Some(port) = cli.broker_port {
            config.broker.port = port;
        }
        if let Some(client_id) = &cli.client_id {
            config.broker.client_id = client_id.clone();
        }
        if let Some(api_url) = &cli.api_url {
            config.api.base_url = api_url.clone();
        }
        if let Some(max_in_flight) = cli.max_in_flight {
            config.max_in_flight = max_in_flight;
        }
        if let Some(max_pending) = cli.max_pending {
            config.max_pending = max_pending;
        }
        if let Some(listen) = &cli.metrics_listen {
            config.metrics_listen = Some(listen.clone());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_in_flight == 0 {
            anyhow::bail!("max_in_flight must be at least 1");
        }
        if self.broker.keep_alive_secs < 5 {
            anyhow::bail!("broker.keep_alive_secs must be at least 5");
        }
        if self.broker.capacity == 0 {
            anyhow::bail!("broker.capacity must be at least 1");
        }
        Ok(())
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            api: ClientConfig::default(),
            max_in_flight: default_max_in_flight(),
            max_pending: default_max_pending(),
            metrics_listen: None,
        }
    }
}

/// MQTT broker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Keep-alive interval in seconds
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,

    /// Pause before polling again after a connection error
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,

    /// Bound of the request channel between client and event loop
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl BrokerConfig {
    pub fn mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(Duration::from_secs(self.keep_alive_secs));
        options
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            client_id: default_client_id(),
            keep_alive_secs: default_keep_alive(),
            reconnect_delay_ms: default_reconnect_delay(),
            capacity: default_capacity(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "spamguard-router".to_string()
}

fn default_keep_alive() -> u64 {
    60
}

fn default_reconnect_delay() -> u64 {
    1_000
}

fn default_capacity() -> usize {
    64
}

fn default_max_pending() -> usize {
    1024
}

fn default_max_in_flight() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cli = Cli {
            config: "/nonexistent/router.yaml".to_string(),
            ..Default::default()
        };
        let config = RouterConfig::load(&cli).unwrap();

        assert_eq!(config.broker.host, "localhost");
        assert_eq!(config.broker.port, 1883);
        assert_eq!(config.broker.client_id, "spamguard-router");
        assert_eq!(config.broker.keep_alive_secs, 60);
        assert_eq!(config.api.base_url, "http://api:8000");
        assert_eq!(config.max_in_flight, 64);
        assert_eq!(config.max_pending, 1024);
        assert!(config.metrics_listen.is_none());
    }

    #[test]
    fn test_file_then_cli_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "broker:\n  host: mosquitto\n  port: 1884\napi:\n  base_url: http://localhost:8000\n  max_retries: 5"
        )
        .unwrap();

        let cli = Cli {
            config: file.path().to_string_lossy().to_string(),
            broker_port: Some(1999),
            ..Default::default()
        };
        let config = RouterConfig::load(&cli).unwrap();

        assert_eq!(config.broker.host, "mosquitto");
        assert_eq!(config.broker.port, 1999);
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.max_retries, 5);
        assert_eq!(config.api.timeout_ms, 10_000);
    }

    #[test]
    fn test_zero_in_flight_rejected() {
        let cli = Cli {
            config: "/nonexistent/router.yaml".to_string(),
            max_in_flight: Some(0),
            ..Default::default()
        };
        assert!(RouterConfig::load(&cli).is_err());
    }

    #[test]
    fn test_mqtt_options() {
        let options = BrokerConfig::default().mqtt_options();
        assert_eq!(options.broker_address(), ("localhost".to_string(), 1883));
        assert_eq!(options.client_id(), "spamguard-router");
        assert_eq!(options.keep_alive(), Duration::from_secs(60));
    }
}
