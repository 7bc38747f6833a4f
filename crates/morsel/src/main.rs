//! Morsel - meal assistant with persistent dietary-constraint memory.
//!
//! Main entry point for the Morsel server binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use morsel_llm::GeminiBackend;
use morsel_memory::ConstraintStore;
use morsel_server::{Server, ServerConfig};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Morsel - meal assistant with persistent dietary-constraint memory
#[derive(Parser)]
#[command(name = "morsel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the Morsel backend server
    Serve(ServeArgs),
}

/// Arguments for the serve command.
#[derive(clap::Args)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Path to the SQLite database (default: data dir)
    #[arg(long, env = "MORSEL_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Shared secret required in X-Internal-Token (unset disables the check)
    #[arg(long, env = "INTERNAL_SHARED_SECRET")]
    pub internal_token: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "morsel=debug,morsel_memory=debug,morsel_llm=debug,morsel_server=debug,info"
    } else {
        "morsel=info,morsel_memory=info,morsel_llm=info,morsel_server=info,warn"
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Serve(args) => serve(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let db_path = match args.db_path {
        Some(path) => path,
        None => default_db_path()?,
    };

    info!(path = %db_path.display(), "Opening constraint store");
    let store = ConstraintStore::open(&db_path).context("failed to open constraint store")?;

    let backend =
        Arc::new(GeminiBackend::from_env().context("failed to configure model backend")?);

    if args.internal_token.is_none() {
        info!("No internal token configured, running in open local mode");
    }

    let config = ServerConfig::new(args.internal_token).with_bind_address(args.bind);
    let server = Server::new(store, backend, config);

    server.run().await.context("server exited with error")?;
    Ok(())
}

/// Default database location under the platform data directory.
fn default_db_path() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .context("could not determine data directory")?
        .join("morsel");
    Ok(dir.join("morsel.db"))
}
