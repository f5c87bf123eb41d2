//! Result correlation
//!
//! Walks the discovery tree and the result document side by side. Every
//! suite visited is reported `completed`; every test visited is reported
//! `passed` or `failed` from the outcome of its paired entry. Pairing is by
//! label against the entry `description`, except when a result entry has a
//! single nested entry (see [`SingletonPolicy`]).

use serde::Deserialize;

use crate::events::{EventSink, LifecycleEvent, SuiteState, TestState};
use crate::tree::{Node, Tree};

use super::{ResultDocument, ResultNode};

/// How tree children are paired when a result entry has exactly one
/// nested entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SingletonPolicy {
    /// Pair every tree child with the lone entry, whatever its label.
    /// A failing singleton therefore fails all of its sibling tests.
    #[default]
    FanOut,
    /// Treat the lone entry like a sequence of one and pair by label
    MatchLabel,
}

/// Counts of events emitted by one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrelationSummary {
    pub suites: usize,
    pub passed: usize,
    pub failed: usize,
}

impl CorrelationSummary {
    pub fn tests(&self) -> usize {
        self.passed + self.failed
    }
}

/// Pairs a result document with a tree and emits the resulting states
pub struct Correlator<'a> {
    sink: &'a EventSink,
    policy: SingletonPolicy,
    failure_marker: &'a str,
}

impl<'a> Correlator<'a> {
    pub fn new(sink: &'a EventSink, policy: SingletonPolicy, failure_marker: &'a str) -> Self {
        Self {
            sink,
            policy,
            failure_marker,
        }
    }

    /// Run one correlation pass
    ///
    /// Events are emitted in tree order, parents before children. The pass
    /// has no state of its own, so the same inputs always produce the same
    /// events.
    pub fn correlate(&self, tree: &Tree, results: &ResultDocument) -> CorrelationSummary {
        let mut summary = CorrelationSummary::default();
        self.visit(tree.root(), results.root(), &mut summary);
        tracing::info!(
            suites = summary.suites,
            passed = summary.passed,
            failed = summary.failed,
            "Correlated results"
        );
        summary
    }

    fn visit(&self, node: &Node, entry: &ResultNode, summary: &mut CorrelationSummary) {
        match node {
            Node::Suite(suite) => {
                self.sink
                    .emit(LifecycleEvent::suite(&suite.id, SuiteState::Completed));
                summary.suites += 1;

                match (entry.nested(), self.policy) {
                    ([], _) => {}
                    ([only], SingletonPolicy::FanOut) => {
                        for child in &suite.children {
                            self.visit(child, only, summary);
                        }
                    }
                    (entries, _) => {
                        for child in &suite.children {
                            match entries
                                .iter()
                                .find(|e| e.description() == Some(child.label()))
                            {
                                Some(matched) => self.visit(child, matched, summary),
                                None => tracing::debug!(
                                    id = child.id(),
                                    label = child.label(),
                                    "No result entry for node"
                                ),
                            }
                        }
                    }
                }
            }
            Node::Test(test) => {
                let state = if entry.result() == Some(self.failure_marker) {
                    summary.failed += 1;
                    TestState::Failed
                } else {
                    summary.passed += 1;
                    TestState::Passed
                };
                self.sink.emit(LifecycleEvent::test(&test.id, state));
            }
        }
    }
}
