//! Tree store holding the current discovery tree
//!
//! Each discovery publishes a new immutable snapshot. Readers take an
//! `Arc<TreeSnapshot>` and work against that value, so a discovery landing
//! mid-way through a correlation pass never changes the tree under it.

use std::ops::Deref;
use std::sync::Arc;

use tokio::sync::watch;

use super::Tree;

/// An immutable, versioned discovery tree
#[derive(Debug)]
pub struct TreeSnapshot {
    generation: u64,
    tree: Tree,
}

impl TreeSnapshot {
    /// Number of replacements before this snapshot; the empty tree is 0
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }
}

impl Deref for TreeSnapshot {
    type Target = Tree;

    fn deref(&self) -> &Tree {
        &self.tree
    }
}

/// Owner of the current tree
///
/// Cloning the store shares the same underlying tree.
#[derive(Debug, Clone)]
pub struct TreeStore {
    tx: Arc<watch::Sender<Arc<TreeSnapshot>>>,
}

impl TreeStore {
    /// Create a store holding the empty tree
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(TreeSnapshot {
            generation: 0,
            tree: Tree::empty(),
        }));
        Self { tx: Arc::new(tx) }
    }

    /// The current snapshot
    pub fn current(&self) -> Arc<TreeSnapshot> {
        Arc::clone(&self.tx.borrow())
    }

    /// Replace the whole tree, returning the published snapshot
    ///
    /// Last write wins; ids from the previous tree stop resolving.
    pub fn replace(&self, tree: Tree) -> Arc<TreeSnapshot> {
        let snapshot = Arc::new(TreeSnapshot {
            generation: self.current().generation + 1,
            tree,
        });
        self.tx.send_replace(Arc::clone(&snapshot));
        tracing::debug!(
            generation = snapshot.generation,
            tests = snapshot.test_count(),
            "Tree replaced"
        );
        snapshot
    }

    /// Receive a notification every time the tree is replaced
    pub fn subscribe(&self) -> watch::Receiver<Arc<TreeSnapshot>> {
        self.tx.subscribe()
    }
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    fn tree_with(ids: &[&str]) -> Tree {
        Tree::new(Node::suite(
            "root",
            "Pester",
            ids.iter().map(|id| Node::test(*id, *id)).collect(),
        ))
        .unwrap()
    }

    #[test]
    fn test_starts_empty() {
        let store = TreeStore::new();
        let snapshot = store.current();
        assert_eq!(snapshot.generation(), 0);
        assert!(snapshot.root().children().is_empty());
    }

    #[test]
    fn test_replace_drops_stale_ids() {
        let store = TreeStore::new();
        store.replace(tree_with(&["a:1", "a:2"]));
        assert!(store.current().lookup("a:2").is_some());

        let snapshot = store.replace(tree_with(&["a:1"]));
        assert_eq!(snapshot.generation(), 2);
        assert!(store.current().lookup("a:2").is_none());
        assert!(store.current().lookup("a:1").is_some());
    }

    #[test]
    fn test_old_snapshot_survives_replacement() {
        let store = TreeStore::new();
        let old = store.replace(tree_with(&["a:1"]));
        store.replace(tree_with(&["b:1"]));
        assert!(old.lookup("a:1").is_some());
        assert!(store.current().lookup("a:1").is_none());
    }

    #[test]
    fn test_clones_share_tree() {
        let store = TreeStore::new();
        let other = store.clone();
        store.replace(tree_with(&["a:1"]));
        assert!(other.current().lookup("a:1").is_some());
    }

    #[tokio::test]
    async fn test_subscribers_see_replacement() {
        let store = TreeStore::new();
        let mut rx = store.subscribe();
        store.replace(tree_with(&["a:1"]));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().generation(), 1);
    }
}
