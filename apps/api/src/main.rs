mod config;
mod cors;
mod errors;
mod llm_client;
mod routes;
mod shifts;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::errors::log_error;
use crate::llm_client::{GeminiClient, ModelClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a missing API key stops the process here.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            init_tracing("info");
            log_error(&err);
            return Err(err.into());
        }
    };

    init_tracing(&config.rust_log);

    info!("Starting Shift API v{}", env!("CARGO_PKG_VERSION"));

    let llm = GeminiClient::from_config(&config)?;
    info!(
        "LLM client initialized (model: {}, timeout: {:?})",
        llm.model_name(),
        config.model_timeout
    );
    info!(
        "CORS allow-list: {} origin(s), environment: {:?}",
        config.allowed_origins.len(),
        config.environment
    );

    let port = config.port;
    let state = AppState::new(config, Arc::new(llm));

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initializes structured logging. `RUST_LOG` in the environment wins over
/// the configured default level.
fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
