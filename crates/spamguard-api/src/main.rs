//! SpamGuard Prediction API
//!
//! Loads the spam classifier once and serves single and batch predictions
//! over HTTP. A model that fails to load leaves the server up in a degraded
//! state so health checks can report it.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use spamguard_api::{create_router, ApiConfig, AppState, Cli};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting SpamGuard prediction API");

    // Load configuration
    let config = ApiConfig::load(&cli)?;
    info!("Configuration loaded successfully");
    info!("Model: {}", config.model.path.display());
    info!("Device: {}", config.model.device);
    info!(
        "Decision: threshold {} ({:?})",
        config.model.threshold, config.model.transform
    );

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    // Load the classifier; failure leaves the service degraded, not down
    let state = AppState::from_config(&config).with_metrics(metrics_handle);
    if !state.model_loaded() {
        warn!("Serving without a model: /predict will return 503 until restarted");
    }

    let addr: SocketAddr = format!("{}:{}", config.listen, config.port).parse()?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Prediction API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            warn!("Shutdown signal received, stopping server...");
        })
        .await?;

    info!("Server shutdown complete");
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
        EnvFilter::new("spamguard_api=debug,spamguard_classifiers=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("spamguard_api=info,spamguard_classifiers=info")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "spamguard_requests_total",
        "Total number of prediction requests by endpoint"
    );
    metrics::describe_counter!(
        "spamguard_predictions_total",
        "Total number of predictions by label"
    );
    metrics::describe_histogram!(
        "spamguard_inference_latency_us",
        metrics::Unit::Microseconds,
        "Classifier inference latency in microseconds"
    );
    metrics::describe_counter!("spamguard_errors_total", "Total number of errors by kind");

    info!("Metrics exporter initialized");
    Ok(handle)
}
