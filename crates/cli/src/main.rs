//! GoalFlow CLI: the main entry point.
//!
//! Commands:
//! - `run`: Run the pipeline once on a single payload
//! - `listen`: Process JSON-line payloads from stdin
//! - `serve`: Start the HTTP ingest gateway
//! - `tools`: List the registered backend tools
//! - `onboard`: Write a default config file

use std::path::PathBuf;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "goalflow",
    about = "GoalFlow — goal-driven LLM orchestration of backend tools",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (default: ~/.goalflow/config.toml)
    #[arg(short, long, global = true, env = "GOALFLOW_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once and print the summary
    Run {
        /// Read the payload from a file
        #[arg(short, long, conflicts_with = "payload")]
        file: Option<PathBuf>,

        /// Payload JSON given inline (stdin is read when neither is set)
        #[arg(short, long)]
        payload: Option<String>,

        /// Print the full run report as JSON instead of the summary
        #[arg(long)]
        report: bool,
    },

    /// Read newline-delimited payloads from stdin until EOF
    Listen {
        /// Print each run report as a JSON line instead of the summary
        #[arg(long)]
        report: bool,
    },

    /// Start the HTTP ingest gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the registered backend tools
    Tools,

    /// Write a default config file
    Onboard {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only results
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Run {
            file,
            payload,
            report,
        } => commands::run::run(config_path, file, payload, report).await?,
        Commands::Listen { report } => commands::listen::run(config_path, report).await?,
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Tools => commands::tools::run(config_path).await?,
        Commands::Onboard { force } => commands::onboard::run(config_path, force).await?,
    }

    Ok(())
}
