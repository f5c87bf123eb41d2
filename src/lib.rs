//! Pester test explorer engine
//!
//! Reconciles a discovered test tree with the NUnit result file written by
//! the test runner, and maps selected tree nodes back to the file and line
//! needed to run them. State changes are published as lifecycle events.

pub mod cli;
pub mod commands;
pub mod common;
pub mod discovery;
pub mod dispatch;
pub mod events;
pub mod explorer;
pub mod results;
pub mod tree;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use events::{EventReceiver, EventSink, LifecycleEvent, SuiteState, TestState};
pub use explorer::Explorer;
pub use tree::{Node, Tree, TreeStore};
