//! CLI command definitions
//!
//! Defines the clap commands for the test explorer CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Discover tests and print the tree
    Discover {
        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run tests or suites by node id
    Run {
        /// Node ids to run (suites run every test below them)
        #[arg(required = true)]
        ids: Vec<String>,

        /// Run under the debugger
        #[arg(long)]
        debug: bool,
    },

    /// Correlate the result file with the discovered tree once
    Correlate {
        /// Result file to read (default: located in the workspace)
        #[arg(long)]
        results: Option<PathBuf>,
    },

    /// Discover, then report results every time the result file changes
    Watch,
}
