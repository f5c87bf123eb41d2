//! Explorer session
//!
//! Ties the pieces together for one workspace: discovery fills the tree
//! store, dispatch runs selected nodes, and the watch loop correlates the
//! result artifact every time the runner rewrites it. Correlation and
//! dispatch always use the tree that is current when they start.

mod watcher;

pub use watcher::ArtifactWatcher;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::common::config::Config;
use crate::common::Result;
use crate::discovery::{files, Discoverer, ProcessDiscoverer};
use crate::dispatch::{DispatchSummary, Dispatcher, Executor, ProcessExecutor};
use crate::events::{EventReceiver, EventSink, LifecycleEvent};
use crate::results::{CorrelationSummary, Correlator, ResultDocument};
use crate::tree::{TreeSnapshot, TreeStore};

/// State and collaborators for one workspace
pub struct Explorer {
    workspace: PathBuf,
    config: Config,
    store: TreeStore,
    sink: EventSink,
    discoverer: Box<dyn Discoverer>,
    executor: Box<dyn Executor>,
    watcher: Mutex<ArtifactWatcher>,
}

impl Explorer {
    pub fn new(
        workspace: &Path,
        config: Config,
        discoverer: Box<dyn Discoverer>,
        executor: Box<dyn Executor>,
    ) -> Self {
        tracing::info!(workspace = %workspace.display(), "Initializing Pester test explorer");
        let artifact = files::artifact_path(workspace, &config.results.file_name);
        Self {
            workspace: workspace.to_path_buf(),
            watcher: Mutex::new(ArtifactWatcher::new(artifact)),
            config,
            store: TreeStore::new(),
            sink: EventSink::new(),
            discoverer,
            executor,
        }
    }

    /// Build an explorer backed by the PowerShell runtime
    pub fn from_config(workspace: &Path, config: Config) -> Result<Self> {
        let discoverer = ProcessDiscoverer::from_config(&config, workspace)?;
        let program = match &config.execution.command {
            Some(command) => command.clone(),
            None => config.runtime.resolve()?,
        };
        let executor = ProcessExecutor::new(program, config.execution.args.clone(), workspace);
        Ok(Self::new(
            workspace,
            config,
            Box::new(discoverer),
            Box::new(executor),
        ))
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn sink(&self) -> &EventSink {
        &self.sink
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> EventReceiver {
        self.sink.subscribe()
    }

    /// Location of the result artifact in the workspace root
    pub fn artifact_path(&self) -> PathBuf {
        files::artifact_path(&self.workspace, &self.config.results.file_name)
    }

    /// Run discovery and replace the tree
    ///
    /// When a result artifact already exists it is correlated once against
    /// the new tree. Its state is recorded for [`Explorer::watch`], so only
    /// later writes trigger another pass. A broken artifact is logged and
    /// does not fail the discovery.
    pub async fn load(&self) -> Result<Arc<TreeSnapshot>> {
        let test_files = files::find_test_files(&self.workspace, &self.config.discovery.pattern_suffix);
        tracing::debug!("Found {} paths", test_files.len());

        let tree = self.discoverer.discover(&test_files).await?;
        let snapshot = self.store.replace(tree);
        tracing::info!(
            generation = snapshot.generation(),
            tests = snapshot.test_count(),
            "Discovery complete"
        );

        let artifact = self.artifact_path();
        let present = self.watcher.lock().await.prime().await;
        if present {
            if let Err(e) = self.load_results(&artifact).await {
                tracing::error!(path = %artifact.display(), error = %e, "Failed to load results");
            }
        } else {
            tracing::debug!(path = %artifact.display(), "No result file yet");
        }

        Ok(snapshot)
    }

    /// Read, parse and correlate a result file
    pub async fn load_results(&self, path: &Path) -> Result<CorrelationSummary> {
        let document = ResultDocument::load(path).await?;
        Ok(self.correlate(&document))
    }

    /// Correlate a parsed document with the current tree
    pub fn correlate(&self, document: &ResultDocument) -> CorrelationSummary {
        let snapshot = self.store.current();
        Correlator::new(
            &self.sink,
            self.config.correlation.singleton,
            &self.config.results.failure_marker,
        )
        .correlate(&snapshot, document)
    }

    /// Run the requested ids against the current tree
    ///
    /// The run is bracketed by `RunStarted` / `RunFinished` when at least
    /// one id resolves. A run made only of stale ids emits nothing.
    pub fn run<S: AsRef<str>>(&self, ids: &[S], is_debug: bool) -> DispatchSummary {
        let snapshot = self.store.current();
        let bracketed = ids.iter().any(|id| snapshot.lookup(id.as_ref()).is_some());
        if bracketed {
            self.sink.emit(LifecycleEvent::RunStarted {
                tests: ids.iter().map(|id| id.as_ref().to_string()).collect(),
            });
        }
        let summary = Dispatcher::new(&self.sink, self.executor.as_ref()).dispatch(&snapshot, ids, is_debug);
        if bracketed {
            self.sink.emit(LifecycleEvent::RunFinished);
        }

        tracing::info!(
            resolved = summary.resolved,
            unknown = summary.unknown,
            executed = summary.executed,
            "Dispatched tests"
        );
        summary
    }

    /// Correlate the result artifact every time it changes until `shutdown`
    /// completes
    ///
    /// Changes are measured from the state [`Explorer::load`] last saw, so
    /// an artifact written between `load` and `watch` still gets its pass.
    /// Failed loads are logged and the loop keeps going.
    pub async fn watch<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let artifact = self.artifact_path();
        tracing::info!(path = %artifact.display(), "Watching result file");

        let mut ticker = tokio::time::interval(Duration::from_millis(
            self.config.watch.poll_interval_ms.max(1),
        ));
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Stopping result watch");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    // Released before correlating so a concurrent load can prime
                    let changed = self.watcher.lock().await.poll().await;
                    if !changed {
                        continue;
                    }
                    tracing::debug!(path = %artifact.display(), "Result file changed");
                    if let Err(e) = self.load_results(&artifact).await {
                        tracing::error!(path = %artifact.display(), error = %e, "Failed to load results");
                    }
                }
            }
        }
    }
}
