//! Dispatch of selected nodes
//!
//! Resolves requested ids against a tree snapshot and runs them. Suites are
//! expanded depth-first so selecting a suite runs every test below it, each
//! reported on its own.

mod executor;
mod location;

pub use executor::{ExecutionRequest, Executor, ProcessExecutor};
pub use location::{TestLocation, ID_DELIMITER};

use crate::events::{EventSink, LifecycleEvent, SuiteState, TestState};
use crate::tree::{Node, Tree};

/// Counts of what one dispatch did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Requested ids found in the tree
    pub resolved: usize,
    /// Requested ids not present in the tree
    pub unknown: usize,
    /// Tests handed to the executor
    pub executed: usize,
    /// Tests that could not be handed off
    pub failed: usize,
}

/// Resolves node ids and hands tests to an executor
pub struct Dispatcher<'a> {
    sink: &'a EventSink,
    executor: &'a dyn Executor,
}

impl<'a> Dispatcher<'a> {
    pub fn new(sink: &'a EventSink, executor: &'a dyn Executor) -> Self {
        Self { sink, executor }
    }

    /// Run the requested ids in order
    ///
    /// Ids missing from `tree` are skipped without events; they usually
    /// come from a selection made against an older tree.
    pub fn dispatch<S: AsRef<str>>(&self, tree: &Tree, ids: &[S], is_debug: bool) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        for id in ids {
            let id = id.as_ref();
            match tree.lookup(id) {
                Some(node) => {
                    summary.resolved += 1;
                    self.run_node(node, is_debug, &mut summary);
                }
                None => {
                    summary.unknown += 1;
                    tracing::debug!(id, "Skipping unknown node id");
                }
            }
        }
        summary
    }

    fn run_node(&self, node: &Node, is_debug: bool, summary: &mut DispatchSummary) {
        match node {
            Node::Suite(suite) => {
                self.sink
                    .emit(LifecycleEvent::suite(&suite.id, SuiteState::Running));
                for child in &suite.children {
                    self.run_node(child, is_debug, summary);
                }
            }
            Node::Test(test) => {
                self.sink
                    .emit(LifecycleEvent::test(&test.id, TestState::Running));

                let location = match TestLocation::parse(&test.id) {
                    Ok(location) => location,
                    Err(e) => {
                        summary.failed += 1;
                        tracing::warn!(id = %test.id, error = %e, "Cannot run test");
                        return;
                    }
                };

                match self.executor.execute(ExecutionRequest::new(location, is_debug)) {
                    Ok(()) => summary.executed += 1,
                    Err(e) => {
                        summary.failed += 1;
                        tracing::warn!(id = %test.id, error = %e, "Failed to execute test");
                    }
                }
            }
        }
    }
}
