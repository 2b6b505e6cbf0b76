use anyhow::Context;
use clap::{Parser, Subcommand};
use notebook::NotebookConfig;
use notebook_http::server::ServerConfig;
use std::path::PathBuf;
use tracing::info;

/// Notebook HTTP API Server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(short = 'H', long, env = "NOTEBOOK_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "NOTEBOOK_PORT", default_value_t = 3000)]
    port: u16,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server with a specific configuration file
    Config {
        /// Path to a JSON notebook configuration
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    notebook_http::init_tracing(&cli.log_level);

    let notebook = match &cli.command {
        Some(Commands::Config { file }) => {
            info!("Loading configuration from file: {}", file.display());
            NotebookConfig::from_file(file)
                .with_context(|| format!("failed to load {}", file.display()))?
        }
        None => NotebookConfig::default(),
    };

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        notebook,
    };
    notebook_http::start_with_config(config).await
}
