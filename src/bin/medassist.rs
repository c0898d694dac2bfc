//! medassist: diagnosis and triage from the command line.
//!
//! Loads the artifacts in-process, answers one request, and prints JSON.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args as ClapArgs, Parser, Subcommand};
use medassist::server::Config;
use medassist::{ArtifactPaths, ArtifactStore, Diagnoser, TriageMatcher};

/// medassist CLI
#[derive(Parser)]
#[command(name = "medassist")]
#[command(version = medassist::PKG_VERSION)]
#[command(about = "Symptom diagnosis and emergency triage")]
struct Args {
    #[command(flatten)]
    artifacts: ArtifactArgs,

    #[command(subcommand)]
    command: Command,
}

/// Where to find configuration and artifacts.
#[derive(ClapArgs)]
struct ArtifactArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "MEDASSIST_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding model.json and disease_info.json.
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Pipeline artifact (overrides config and --artifact-dir).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Disease info artifact (overrides config and --artifact-dir).
    #[arg(long)]
    disease_info: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Diagnose a symptom description
    Predict {
        /// Symptom text (or omit to read from stdin)
        text: Option<String>,
    },

    /// Triage an emergency description
    Triage {
        /// Emergency text (or omit to read from stdin)
        text: Option<String>,
    },

    /// Load and validate the artifacts, then print a summary
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        // Triage needs no artifacts.
        Command::Triage { text } => {
            let text = read_text(text)?.unwrap_or_default();
            let reply = TriageMatcher::standard().triage(&text);
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Command::Predict { text } => {
            let (config, artifacts) = load(args.artifacts)?;
            let text = read_text(text)?.unwrap_or_default();
            let diagnoser = Diagnoser::new(Arc::new(artifacts), config.gate);
            let result = diagnoser.predict(&text)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Check => {
            let (_, artifacts) = load(args.artifacts)?;
            println!("{}", serde_json::to_string_pretty(&artifacts.summary())?);
        }
    }

    Ok(())
}

/// Resolve configuration, apply path overrides, and load the artifacts.
fn load(args: ArtifactArgs) -> medassist::Result<(Config, ArtifactStore)> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(dir) = args.artifact_dir {
        config.artifacts = ArtifactPaths::in_dir(dir);
    }
    if let Some(model) = args.model {
        config.artifacts.model = model;
    }
    if let Some(disease_info) = args.disease_info {
        config.artifacts.disease_info = disease_info;
    }

    let artifacts = ArtifactStore::load(&config.artifacts)?;
    Ok((config, artifacts))
}

/// Text from the argument, else from piped stdin, else `None`.
fn read_text(arg: Option<String>) -> io::Result<Option<String>> {
    if arg.is_some() {
        return Ok(arg);
    }
    if io::stdin().is_terminal() {
        return Ok(None);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(Some(buf.trim().to_string()))
}
