use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber;

use screener_api::{config::Settings, handlers, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    // Local .env is optional
    dotenvy::dotenv().ok();

    info!("Starting Screener API...");

    let settings = Settings::from_env();
    let state = Arc::new(AppState::from_settings(&settings));
    info!(
        "✓ Universe cache at {} (ttl {}s, {} workers)",
        settings.cache_path,
        settings.cache_ttl.as_secs(),
        settings.max_workers
    );

    let cors = CorsLayer::new().allow_origin(Any);

    // /health must be registered before the strategy capture takes over
    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/{strategy}", get(handlers::run_strategy))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", settings.port)).await?;
    info!("🚀 Screener API listening on port {}", settings.port);

    axum::serve(listener, app).await?;

    Ok(())
}
