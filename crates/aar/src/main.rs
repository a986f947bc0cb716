//! AAR analysis-pipeline binary.
//!
//! `serve` loads configuration, wires the dependency graph, and runs the
//! Worker Loop until interrupted. `validate-config` loads and validates
//! configuration without starting anything, for CI and pre-deploy checks.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use aar_application::worker::run_worker_loop;
use aar_infrastructure::{build_context, logging, ConfigLoader};

#[derive(Parser)]
#[command(name = "aar")]
#[command(about = "Archive ingestion and multi-agent code review pipeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Worker Loop, consuming analysis jobs until interrupted.
    Serve {
        /// Explicit path to a YAML config file, overriding `AAR_ENV` resolution.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Load and validate configuration, then exit.
    ValidateConfig {
        /// Explicit path to a YAML config file, overriding `AAR_ENV` resolution.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config).await,
        Commands::ValidateConfig { config } => validate_config(config),
    }
}

async fn serve(config_path: Option<PathBuf>) -> Result<()> {
    let loader = match config_path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load().context("loading configuration")?;
    logging::init_logging(&config.logging);

    info!(
        max_concurrency = config.orchestrator.max_concurrency,
        mock_mode = config.model.mock_mode,
        "starting aar worker loop"
    );

    let ctx = build_context(&config);
    let shutdown = CancellationToken::new();
    let worker_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received interrupt signal; shutting down");
            worker_shutdown.cancel();
        }
    });

    run_worker_loop(
        Arc::clone(&ctx.queue),
        Arc::clone(&ctx.orchestrator),
        ctx.working_dir_root,
        ctx.worker_config,
        shutdown,
        ctx.run_registry,
    )
    .await
    .context("worker loop exited with an error")?;

    Ok(())
}

fn validate_config(config_path: Option<PathBuf>) -> Result<()> {
    let loader = match config_path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load().context("loading configuration")?;
    println!(
        "configuration OK: max_concurrency={} mock_mode={} storage={}",
        config.orchestrator.max_concurrency,
        config.model.mock_mode,
        config.storage.base_dir.display()
    );
    Ok(())
}
