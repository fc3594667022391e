use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "spamguard-dashboard")]
#[command(author, version, about = "Spam detection dashboard")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "dashboard.yaml")]
    pub config: String,

    /// Listen address
    #[arg(short, long, env = "SPAMGUARD_DASHBOARD_LISTEN")]
    pub address: Option<String>,

    /// Listen port
    #[arg(short, long, env = "SPAMGUARD_DASHBOARD_PORT")]
    pub port: Option<u16>,

    /// Prediction API base URL
    #[arg(long, env = "SPAMGUARD_API_URL")]
    pub api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
