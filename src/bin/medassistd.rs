//! medassistd: the medassist daemon.
//!
//! Loads the model artifacts once, then serves diagnosis and triage over
//! newline-delimited JSON on TCP. Missing or invalid artifacts abort startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use medassist::server::{Config, MedAssistService};
use medassist::{ArtifactStore, Diagnoser, MedAssistError, TriageMatcher};

/// medassist daemon: diagnosis and triage service.
#[derive(Parser)]
#[command(name = "medassistd")]
#[command(version = medassist::PKG_VERSION)]
#[command(about = "medassist diagnosis and triage daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "MEDASSIST_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to (overrides config).
    #[arg(short, long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(address) = args.address {
        config.server.address = address;
    }

    let artifacts = match ArtifactStore::load(&config.artifacts) {
        Ok(artifacts) => Arc::new(artifacts),
        Err(e) => {
            error!(error = %e, "cannot load model artifacts, refusing to start");
            return Err(e.into());
        }
    };

    let addr: SocketAddr = config
        .server
        .address
        .parse()
        .map_err(|e| MedAssistError::Configuration(format!("Invalid address: {e}")))?;

    let diagnoser = Diagnoser::new(artifacts, config.gate);
    let service = Arc::new(MedAssistService::new(
        diagnoser,
        TriageMatcher::standard(),
        &config,
    ));

    let listener = TcpListener::bind(addr).await?;
    info!(version = medassist::version_string(), %addr, "medassistd starting");

    service
        .serve_with_shutdown(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;

    Ok(())
}
