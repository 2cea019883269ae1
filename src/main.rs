//! Posture Monitor backend
//!
//! Serves the posture API and, optionally, the web front-end.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use posture_monitor::config::{Config, LogFormat};
use posture_monitor::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting Posture Monitor");
    tracing::info!("Data file: {:?}", config.data_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    match &config.static_dir {
        Some(dir) => tracing::info!("Serving front-end from {:?}", dir),
        None => tracing::warn!("No POSTURE_STATIC_DIR configured; only the API is served"),
    }

    let bind_addr = config.bind_addr;
    let state = AppState::new(config);

    // Report an unreadable history file at startup
    match state.store.load().await {
        Ok(document) => tracing::info!(
            "Loaded posture history with {} checks",
            document.posture_history.len()
        ),
        Err(e) => tracing::warn!("Posture history is not readable: {}", e),
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
