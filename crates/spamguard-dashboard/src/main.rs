use clap::Parser;
use spamguard_dashboard::{run_server, Cli, DashboardConfig};
use tokio::signal;
use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = DashboardConfig::load(&cli)?;

    println!();
    println!("  SpamGuard Dashboard");
    println!();
    println!("  API:     {}", config.api.base_url);
    println!("  Open http://{}:{} in your browser", config.listen, config.port);
    println!();

    run_server(config, async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping dashboard...");
    })
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "spamguard_dashboard=debug,spamguard_client=debug,tower_http=debug"
    } else {
        "spamguard_dashboard=info,spamguard_client=info,tower_http=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
