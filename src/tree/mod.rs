//! Discovery tree
//!
//! The tree arrives as JSON from the discovery process and is decoded into a
//! closed `Node` union. Decoding validates the shape up front (root suite,
//! unique ids) so the correlator and dispatcher can trust it.

mod store;

pub use store::{TreeSnapshot, TreeStore};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::common::{Error, Result};

/// Id of the root suite
pub const ROOT_ID: &str = "root";

/// Label given to the empty tree before the first discovery
pub const ROOT_LABEL: &str = "Pester";

/// A suite or a test in the discovery tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Suite(SuiteInfo),
    Test(TestInfo),
}

/// A suite and its ordered children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteInfo {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

/// A single runnable test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestInfo {
    /// `<file>:<line>`
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl Node {
    /// Build a suite node
    pub fn suite(id: impl Into<String>, label: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Suite(SuiteInfo {
            id: id.into(),
            label: label.into(),
            children,
            file: None,
            line: None,
            description: None,
            tooltip: None,
        })
    }

    /// Build a test node
    pub fn test(id: impl Into<String>, label: impl Into<String>) -> Self {
        Node::Test(TestInfo {
            id: id.into(),
            label: label.into(),
            file: None,
            line: None,
            description: None,
            tooltip: None,
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Node::Suite(suite) => &suite.id,
            Node::Test(test) => &test.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Node::Suite(suite) => &suite.label,
            Node::Test(test) => &test.label,
        }
    }

    /// Children in declared order; always empty for tests
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Suite(suite) => &suite.children,
            Node::Test(_) => &[],
        }
    }

    /// Depth-first search for a node by id
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.id() == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    /// Number of test nodes in this subtree
    pub fn test_count(&self) -> usize {
        match self {
            Node::Suite(suite) => suite.children.iter().map(Node::test_count).sum(),
            Node::Test(_) => 1,
        }
    }
}

/// A validated discovery tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    root: Node,
}

impl Tree {
    /// Validate a root node and wrap it as a tree
    ///
    /// The root must be a suite with id `root` and every id must be unique.
    pub fn new(root: Node) -> Result<Self> {
        match &root {
            Node::Suite(suite) if suite.id == ROOT_ID => {}
            Node::Suite(suite) => {
                return Err(Error::InvalidTree(format!(
                    "root suite has id '{}', expected '{}'",
                    suite.id, ROOT_ID
                )))
            }
            Node::Test(test) => {
                return Err(Error::InvalidTree(format!(
                    "root must be a suite, found test '{}'",
                    test.id
                )))
            }
        }

        let mut seen = HashSet::new();
        check_unique(&root, &mut seen)?;

        Ok(Self { root })
    }

    /// The tree in place before any discovery has completed
    pub fn empty() -> Self {
        Self {
            root: Node::suite(ROOT_ID, ROOT_LABEL, Vec::new()),
        }
    }

    /// Decode the JSON emitted by the discovery process
    pub fn from_json(json: &str) -> Result<Self> {
        let root: Node = serde_json::from_str(json).map_err(Error::TreeDecode)?;
        Self::new(root)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Find a node by id, `None` when the id is not part of this tree
    pub fn lookup(&self, id: &str) -> Option<&Node> {
        self.root.find(id)
    }

    pub fn test_count(&self) -> usize {
        self.root.test_count()
    }
}

fn check_unique<'a>(node: &'a Node, seen: &mut HashSet<&'a str>) -> Result<()> {
    if !seen.insert(node.id()) {
        return Err(Error::InvalidTree(format!("duplicate node id '{}'", node.id())));
    }
    node.children()
        .iter()
        .try_for_each(|child| check_unique(child, seen))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        Tree::new(Node::suite(
            "root",
            "Pester",
            vec![Node::suite(
                "/t/a.Tests.ps1",
                "a.Tests.ps1",
                vec![
                    Node::suite(
                        "/t/a.Tests.ps1:1",
                        "A",
                        vec![
                            Node::test("/t/a.Tests.ps1:2", "a1"),
                            Node::test("/t/a.Tests.ps1:5", "a2"),
                        ],
                    ),
                    Node::test("/t/a.Tests.ps1:9", "top"),
                ],
            )],
        ))
        .unwrap()
    }

    #[test]
    fn test_lookup_finds_every_id() {
        let tree = sample();
        for id in [
            "root",
            "/t/a.Tests.ps1",
            "/t/a.Tests.ps1:1",
            "/t/a.Tests.ps1:2",
            "/t/a.Tests.ps1:5",
            "/t/a.Tests.ps1:9",
        ] {
            assert_eq!(tree.lookup(id).map(Node::id), Some(id));
        }
    }

    #[test]
    fn test_lookup_missing_id() {
        assert!(sample().lookup("/t/gone.Tests.ps1:3").is_none());
    }

    #[test]
    fn test_test_count() {
        assert_eq!(sample().test_count(), 3);
        assert_eq!(Tree::empty().test_count(), 0);
    }

    #[test]
    fn test_decode_json() {
        let json = r#"{
            "type": "suite", "id": "root", "label": "Pester",
            "children": [
                {"type": "suite", "id": "C:\\t\\a.Tests.ps1", "label": "a.Tests.ps1", "file": "C:\\t\\a.Tests.ps1",
                 "children": [
                    {"type": "test", "id": "C:\\t\\a.Tests.ps1:4", "label": "works", "line": 3}
                 ]}
            ]
        }"#;
        let tree = Tree::from_json(json).unwrap();
        match tree.lookup("C:\\t\\a.Tests.ps1:4") {
            Some(Node::Test(test)) => {
                assert_eq!(test.label, "works");
                assert_eq!(test.line, Some(3));
            }
            other => panic!("Expected test node, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_suite_without_children() {
        let tree = Tree::from_json(r#"{"type": "suite", "id": "root", "label": "Pester"}"#).unwrap();
        assert!(tree.root().children().is_empty());
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let err = Tree::from_json(r#"{"type": "folder", "id": "root", "label": "x"}"#).unwrap_err();
        assert!(matches!(err, Error::TreeDecode(_)));
    }

    #[test]
    fn test_decode_rejects_truncated_json() {
        let err = Tree::from_json(r#"{"type": "suite", "id": "root""#).unwrap_err();
        assert!(matches!(err, Error::TreeDecode(_)));
    }

    #[test]
    fn test_root_must_be_named_root() {
        let err = Tree::new(Node::suite("top", "Pester", vec![])).unwrap_err();
        assert!(matches!(err, Error::InvalidTree(_)));
    }

    #[test]
    fn test_root_must_be_suite() {
        let err = Tree::new(Node::test("root", "Pester")).unwrap_err();
        assert!(matches!(err, Error::InvalidTree(_)));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Tree::new(Node::suite(
            "root",
            "Pester",
            vec![Node::test("a:1", "x"), Node::test("a:1", "y")],
        ))
        .unwrap_err();
        assert!(err.to_string().contains("duplicate node id 'a:1'"));
    }
}
