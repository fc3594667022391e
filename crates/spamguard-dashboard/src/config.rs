//! Dashboard configuration

use serde::{Deserialize, Serialize};
use spamguard_client::ClientConfig;
use std::path::Path;

use crate::cli::Cli;
use crate::history::DEFAULT_CAPACITY;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Prediction API client
    #[serde(default)]
    pub api: ClientConfig,

    /// Analyzed messages kept for the history panel
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl DashboardConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = if Path::new(&cli.config).exists() {
            let content = std::fs::read_to_string(&cli.config)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Some(address) = &cli.address {
            config.listen = address.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(api_url) = &cli.api_url {
            config.api.base_url = api_url.clone();
        }

        Ok(config)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            api: ClientConfig::default(),
            history_capacity: default_history_capacity(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_history_capacity() -> usize {
    DEFAULT_CAPACITY
}
