//! Notebook HTTP API Server
//!
//! Serves `POST /execute` on top of [`notebook::Dispatcher`], plus a small
//! surface for inspecting and dropping sessions.

pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;

use server::{ServerConfig, start_server};
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. `RUST_LOG`, when set, takes precedence
/// over `log_level`.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Start the server with the default configuration
pub async fn start() -> anyhow::Result<()> {
    start_server(ServerConfig::default()).await
}

/// Start the server with a custom configuration
pub async fn start_with_config(config: ServerConfig) -> anyhow::Result<()> {
    start_server(config).await
}
