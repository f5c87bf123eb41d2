//! Lifecycle events sent to the test explorer
//!
//! Events are constructed and forwarded immediately; nothing here keeps a
//! history. Each subscriber gets its own queue so any number of consumers
//! (the CLI printer, a UI bridge, tests) can listen.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::mpsc;

/// Receiving end handed to each subscriber
pub type EventReceiver = mpsc::UnboundedReceiver<LifecycleEvent>;

/// State reported for a suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteState {
    Running,
    Completed,
}

/// State reported for a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestState {
    Running,
    Passed,
    Failed,
}

/// A state transition emitted for the explorer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A user-requested run is starting
    RunStarted { tests: Vec<String> },
    /// A user-requested run has been handed off
    RunFinished,
    /// A suite changed state
    Suite { suite: String, state: SuiteState },
    /// A test changed state
    Test { test: String, state: TestState },
}

impl LifecycleEvent {
    pub fn suite(id: &str, state: SuiteState) -> Self {
        Self::Suite {
            suite: id.to_string(),
            state,
        }
    }

    pub fn test(id: &str, state: TestState) -> Self {
        Self::Test {
            test: id.to_string(),
            state,
        }
    }
}

impl std::fmt::Display for SuiteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::fmt::Display for TestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Producer side of the event channel
///
/// Every subscriber gets its own unbounded queue, so a synchronous pass
/// can emit any number of events before anyone reads them.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<LifecycleEvent>>>>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Forward an event to all current subscribers
    ///
    /// Having no subscribers is not an error; the event is dropped.
    /// Subscribers whose receiver is gone are pruned.
    pub fn emit(&self, event: LifecycleEvent) {
        tracing::trace!(?event, "emit");
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        if subscribers.is_empty() {
            tracing::trace!("No event subscribers");
        }
    }
}

/// Drain every event currently queued in a receiver
///
/// Used by the CLI after synchronous passes and by tests.
pub fn drain(rx: &mut EventReceiver) -> Vec<LifecycleEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
