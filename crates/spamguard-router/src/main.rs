//! SpamGuard Message Router
//!
//! Subscribes to the inbound message topics on an MQTT broker, classifies
//! each message through the prediction API and republishes the outcome.

use anyhow::Result;
use clap::Parser;
use spamguard_client::HttpPredictionClient;
use spamguard_router::{Bridge, Cli, RouterConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting SpamGuard message router");

    // Load configuration
    let config = RouterConfig::load(&cli)?;
    info!("Configuration loaded successfully");
    info!("Broker: {}:{}", config.broker.host, config.broker.port);
    info!("Prediction API: {}", config.api.base_url);
    info!(
        "Downstream: timeout {}ms, {} retries",
        config.api.timeout_ms, config.api.max_retries
    );
    info!(
        "Concurrency: {} in flight, {} pending",
        config.max_in_flight, config.max_pending
    );

    // Initialize metrics
    if let Some(listen) = &config.metrics_listen {
        init_metrics(listen)?;
    }

    let api = Arc::new(HttpPredictionClient::new(config.api.clone())?);
    let bridge = Bridge::new(&config, api);

    info!("Connecting to MQTT broker at {}:{}", config.broker.host, config.broker.port);
    bridge
        .run(async {
            shutdown_signal().await;
            warn!("Shutdown signal received, stopping router...");
        })
        .await;

    info!("Router shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
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

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("spamguard_router=debug,spamguard_client=debug,rumqttc=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("spamguard_router=info,spamguard_client=info,rumqttc=warn")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Serve Prometheus metrics on `listen`
fn init_metrics(listen: &str) -> Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let addr: SocketAddr = listen.parse()?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "spamguard_router_messages_total",
        "Messages received by inbound topic"
    );
    metrics::describe_counter!(
        "spamguard_router_failures_total",
        "Messages that failed processing by path"
    );
    metrics::describe_counter!(
        "spamguard_router_publish_failures_total",
        "Result publications that could not be queued, by topic"
    );
    metrics::describe_counter!(
        "spamguard_router_dropped_total",
        "Messages dropped because the processing backlog was full"
    );

    info!("Metrics exporter listening on http://{}/metrics", addr);
    Ok(())
}
