use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "spamguard-router")]
#[command(about = "Routes MQTT messages through the SpamGuard prediction API", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "router.yaml")]
    pub config: String,

    /// MQTT broker host
    #[arg(short = 'H', long, env = "SPAMGUARD_BROKER_HOST")]
    pub broker_host: Option<String>,

    /// MQTT broker port
    #[arg(short = 'p', long, env = "SPAMGUARD_BROKER_PORT")]
    pub broker_port: Option<u16>,

    /// MQTT client identifier
    #[arg(long, env = "SPAMGUARD_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Prediction API base URL
    #[arg(short, long, env = "SPAMGUARD_API_URL")]
    pub api_url: Option<String>,

    /// Maximum messages processed concurrently
    #[arg(long, env = "SPAMGUARD_MAX_IN_FLIGHT")]
    pub max_in_flight: Option<usize>,

    /// Messages allowed to wait for a processing slot
    #[arg(long, env = "SPAMGUARD_MAX_PENDING")]
    pub max_pending: Option<usize>,

    /// Serve Prometheus metrics on this address
    #[arg(long, env = "SPAMGUARD_METRICS_LISTEN")]
    pub metrics_listen: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
