//! Pester test explorer CLI
//!
//! Discovers Pester tests, runs selected nodes and reports pass/fail states
//! from the result file written by the runner.

use std::path::PathBuf;

use clap::Parser;
use pester_explorer::commands::Commands;
use pester_explorer::common::{config::Config, logging, paths};
use pester_explorer::{cli, Result};

#[derive(Parser)]
#[command(name = "pester-explorer", about = "Pester test explorer engine")]
#[command(version, long_about = None)]
struct Cli {
    /// Workspace root (default: current directory)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Configuration file (default: workspace or user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

async fn run(cli: Cli) -> Result<()> {
    let workspace = paths::resolve_workspace(cli.workspace)?;
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(&workspace)?,
    };
    cli::dispatch(cli.command, &workspace, config).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Watch sessions keep a log file, short commands log to stderr only
    if matches!(cli.command, Commands::Watch) {
        if let Some(path) = logging::init_with_file() {
            tracing::debug!(path = %path.display(), "Logging to file");
        }
    } else {
        logging::init_cli();
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
