use crate::config::DashboardConfig;
use crate::routes;
use crate::state::DashboardState;
use crate::static_files;
use axum::{
    routing::{get, post},
    Router,
};
use spamguard_client::HttpPredictionClient;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the Axum application
pub fn build_app(state: DashboardState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(routes::health))
        .route("/analyze", post(routes::analyze))
        .route("/batch", post(routes::batch))
        .route("/history", get(routes::history))
        .route("/history/clear", post(routes::clear_history))
        .route("/stats", get(routes::stats));

    Router::new()
        .nest("/api", api_routes)
        .fallback(static_files::serve_static)
        .layer(cors)
        .with_state(state)
}

/// Run the server until `shutdown` resolves
pub async fn run_server<F>(config: DashboardConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let api = Arc::new(HttpPredictionClient::new(config.api.clone())?);
    let state = DashboardState::new(api, config.history_capacity);
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", config.listen, config.port).parse()?;
    tracing::info!("Starting SpamGuard dashboard on {}", addr);
    tracing::info!("Prediction API: {}", config.api.base_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
