mod api;
mod comments;
mod config;
mod error;
mod extractors;
mod gate;
mod models;
mod routes;
mod session;
mod state;
mod validate;

use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Config};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args and load config
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    // Initialize logging; production keeps the console quiet by default
    let default_filter = if config.server.production {
        "recirc=info,warn"
    } else {
        "recirc=debug,info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!("Backend API: {}", config.api.base_url);

    // Build app state and router
    let state = AppState::new(config.clone())?;
    let app = routes::router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
