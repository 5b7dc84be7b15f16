//! Inkpress CLI - Command line interface for operator tasks.
//!
//! This tool drives the one-time authorization flow and offers a local
//! render command for checking documents without publishing them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use inkpress_auth::{AuthFlow, AuthStatus, CredentialStore, OAuthConfig};
use inkpress_render::{ChromeRenderer, RenderConfig, RenderEngine};

#[derive(Parser)]
#[command(name = "inkpress")]
#[command(about = "Inkpress - HTML to PDF publishing")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Credential file location (default: platform config directory).
    #[arg(long)]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize Inkpress against your Drive account.
    Login {
        /// Print the consent URL instead of opening a browser.
        #[arg(long)]
        no_browser: bool,
    },

    /// Show the current authorization state.
    Status,

    /// Render an HTML file to PDF locally, without publishing.
    Render {
        /// Source HTML file.
        #[arg(short, long)]
        input: PathBuf,

        /// Destination PDF file.
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let credential_path = cli
        .credentials
        .unwrap_or_else(CredentialStore::default_path);

    match cli.command {
        Commands::Login { no_browser } => cmd_login(&credential_path, no_browser).await,
        Commands::Status => cmd_status(&credential_path).await,
        Commands::Render { input, output } => cmd_render(&input, &output).await,
    }
}

fn flow_for(credential_path: &PathBuf) -> Result<(Arc<AuthFlow>, Arc<CredentialStore>)> {
    let store = Arc::new(CredentialStore::new(credential_path));
    let config = OAuthConfig::from_env()
        .context("OAuth client configuration missing from the environment")?;
    let flow = Arc::new(AuthFlow::new(config, Arc::clone(&store))?);
    Ok((flow, store))
}

async fn cmd_login(credential_path: &PathBuf, no_browser: bool) -> Result<()> {
    let (flow, _store) = flow_for(credential_path)?;

    let consent_url = flow.begin_authorization();
    if no_browser {
        println!("Visit this URL to authorize Inkpress:\n\n{}\n", consent_url);
    } else {
        println!("Opening the consent page in your browser...");
        if open::that(&consent_url).is_err() {
            println!("Could not open a browser. Visit:\n\n{}\n", consent_url);
        }
    }

    print!("Paste the authorization code: ");
    std::io::stdout().flush()?;
    let mut code = String::new();
    std::io::stdin().read_line(&mut code)?;

    let credential = flow
        .complete_authorization(code.trim())
        .await
        .context("Authorization failed")?;

    info!(
        path = %credential_path.display(),
        expires_at = %credential.expires_at,
        "Credential stored"
    );
    println!("Authorization complete.");
    Ok(())
}

async fn cmd_status(credential_path: &PathBuf) -> Result<()> {
    let (flow, _store) = flow_for(credential_path)?;

    match flow.status().await {
        AuthStatus::Authenticated => println!("Authenticated."),
        AuthStatus::Unauthenticated { auth_url } => {
            println!("Not authenticated. Run `inkpress login` or visit:\n\n{}", auth_url);
        }
    }
    Ok(())
}

async fn cmd_render(input: &PathBuf, output: &PathBuf) -> Result<()> {
    let html = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let renderer = ChromeRenderer::new(RenderConfig::default());
    let rendered = renderer
        .render(&html)
        .await
        .context("Rendering failed")?;

    tokio::fs::write(output, &rendered.bytes)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Rendered {} ({} bytes, page height {:.1} mm)",
        output.display(),
        rendered.bytes.len(),
        rendered.page_height_mm
    );
    Ok(())
}
