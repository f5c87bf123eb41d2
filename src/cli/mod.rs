//! CLI command handling
//!
//! Runs commands against an [`Explorer`] and prints the lifecycle events
//! they produce.

mod output;

use std::path::Path;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::Result;
use crate::events::drain;
use crate::explorer::Explorer;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, workspace: &Path, config: Config) -> Result<()> {
    let explorer = Explorer::from_config(workspace, config)?;

    match command {
        Commands::Discover { json } => {
            let snapshot = explorer.load().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(snapshot.root())?);
            } else {
                print!("{}", output::format_tree(snapshot.root()));
                println!("{} tests", snapshot.test_count());
            }
            Ok(())
        }

        Commands::Run { ids, debug } => {
            explorer.load().await?;
            let mut rx = explorer.subscribe();
            let summary = explorer.run(ids.as_slice(), debug);

            for event in drain(&mut rx) {
                println!("{}", output::format_event(&event));
            }
            if summary.unknown > 0 {
                println!("{} id(s) not found in the current tree", summary.unknown);
            }
            Ok(())
        }

        Commands::Correlate { results } => {
            // Subscribe first: discovery may already correlate an existing file
            let mut rx = explorer.subscribe();
            explorer.load().await?;

            if let Some(path) = results {
                drain(&mut rx);
                explorer.load_results(&path).await?;
            }

            let events = drain(&mut rx);
            if events.is_empty() {
                println!("No result file found");
            }
            for event in events {
                println!("{}", output::format_event(&event));
            }
            Ok(())
        }

        Commands::Watch => {
            let rx = explorer.subscribe();
            let printer = tokio::spawn(output::print_events(rx));

            explorer.load().await?;
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                }
            };
            let result = explorer.watch(shutdown).await;

            printer.abort();
            result
        }
    }
}
