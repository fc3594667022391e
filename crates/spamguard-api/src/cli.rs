use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "spamguard-api")]
#[command(about = "SpamGuard spam prediction API", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "api.yaml")]
    pub config: String,

    /// Model directory (config.json, tokenizer.json, model.safetensors)
    #[arg(short, long, env = "SPAMGUARD_MODEL_PATH")]
    pub model: Option<String>,

    /// Decision threshold on the spam confidence
    #[arg(short, long, env = "SPAMGUARD_THRESHOLD")]
    pub threshold: Option<f32>,

    /// Inference device: cpu, cuda[:N] or metal[:N]
    #[arg(short, long, env = "SPAMGUARD_DEVICE")]
    pub device: Option<String>,

    /// Listen address
    #[arg(short = 'l', long, env = "SPAMGUARD_LISTEN")]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "SPAMGUARD_PORT")]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
