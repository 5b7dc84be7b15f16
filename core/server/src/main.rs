//! Inkpress server binary.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use inkpress_server::{router, AppState, ServerConfig};

#[derive(Parser)]
#[command(name = "inkpress-server")]
#[command(about = "Inkpress - HTML to PDF publishing service")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Listening port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,

    /// Credential file location (overrides INKPRESS_CREDENTIALS).
    #[arg(long)]
    credentials: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set up logging")?;

    let mut config = ServerConfig::from_env().context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(credentials) = cli.credentials {
        config.credential_path = credentials;
    }

    let state = AppState::from_config(&config)
        .await
        .context("Failed to initialize service")?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    info!(port = config.port, "Inkpress listening");

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
