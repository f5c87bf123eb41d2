//! Result artifact change detection
//!
//! The artifact is polled rather than watched through OS notifications. A
//! change is any difference in modification time or length, including the
//! file appearing. Disappearance is recorded but not reported.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Metadata used to decide whether the artifact changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

/// Polls a single result artifact for changes
#[derive(Debug)]
pub struct ArtifactWatcher {
    path: PathBuf,
    last: Option<Fingerprint>,
}

impl ArtifactWatcher {
    pub fn new(path: PathBuf) -> Self {
        Self { path, last: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn fingerprint(&self) -> Option<Fingerprint> {
        let metadata = tokio::fs::metadata(&self.path).await.ok()?;
        if !metadata.is_file() {
            return None;
        }
        Some(Fingerprint {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }

    /// Record the current state without reporting it as a change
    ///
    /// Returns whether the artifact exists.
    pub async fn prime(&mut self) -> bool {
        self.last = self.fingerprint().await;
        self.last.is_some()
    }

    /// Check the artifact, returning true when it appeared or changed
    pub async fn poll(&mut self) -> bool {
        let current = self.fingerprint().await;
        let changed = match (self.last, current) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(last), Some(now)) => last != now,
        };
        if self.last.is_some() && current.is_none() {
            tracing::debug!(path = %self.path.display(), "Result file removed");
        }
        self.last = current;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_appearance_is_one_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("TestExplorerResults.xml");
        let mut watcher = ArtifactWatcher::new(path.clone());
        assert!(!watcher.prime().await);
        assert!(!watcher.poll().await);

        std::fs::write(&path, "<test-results/>").unwrap();
        assert!(watcher.poll().await);
        assert!(!watcher.poll().await);
    }

    #[tokio::test]
    async fn test_rewrite_is_a_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("TestExplorerResults.xml");
        std::fs::write(&path, "a").unwrap();
        let mut watcher = ArtifactWatcher::new(path.clone());
        assert!(watcher.prime().await);
        assert!(!watcher.poll().await);

        std::fs::write(&path, "longer content").unwrap();
        assert!(watcher.poll().await);
    }

    #[tokio::test]
    async fn test_removal_is_not_a_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("TestExplorerResults.xml");
        std::fs::write(&path, "a").unwrap();
        let mut watcher = ArtifactWatcher::new(path.clone());
        watcher.prime().await;

        std::fs::remove_file(&path).unwrap();
        assert!(!watcher.poll().await);

        std::fs::write(&path, "a").unwrap();
        assert!(watcher.poll().await);
    }
}
