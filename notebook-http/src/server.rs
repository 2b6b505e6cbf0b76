use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use notebook::{ContextStore, Dispatcher, NotebookConfig};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::routes::create_api_router;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    pub notebook: NotebookConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            notebook: NotebookConfig::default(),
        }
    }
}

/// State shared by every handler.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn from_config(config: &NotebookConfig) -> Self {
        Self::new(Dispatcher::from_config(config))
    }
}

/// Router with state, tracing and CORS applied.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Periodically drops sessions the store's eviction policy rejects.
///
/// `period` must be non-zero.
pub fn spawn_eviction_task(store: Arc<ContextStore>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = store.evict_expired();
            if evicted > 0 {
                info!(evicted, remaining = store.session_count(), "Evicted idle sessions");
            } else {
                debug!("No idle sessions to evict");
            }
        }
    })
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config.notebook);
    info!(
        interpreters = ?state.dispatcher.registry().names(),
        "Initialized dispatcher"
    );

    let sweeper = match config.notebook.session_idle_timeout {
        Some(_) if config.notebook.eviction_interval.is_zero() => {
            warn!("eviction_interval is zero, idle sessions will never be swept");
            None
        }
        Some(idle) => {
            info!(
                idle_ms = idle.as_millis() as u64,
                interval_ms = config.notebook.eviction_interval.as_millis() as u64,
                "Starting session eviction task"
            );
            Some(spawn_eviction_task(
                state.dispatcher.store().clone(),
                config.notebook.eviction_interval,
            ))
        }
        None => None,
    };

    let app = build_app(state);

    let addr = format!("{}:{}", config.host, config.port).parse::<SocketAddr>()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app).await;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    served?;

    Ok(())
}
