//! NUnit result document
//!
//! Only the parts the correlator needs are kept: the nesting of
//! `test-suite` / `test-case` entries reached through `results` elements,
//! and the `name`, `description` and `result` attributes of each entry.
//! Everything else (environment, culture info, failure messages) is skipped.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::common::{Error, Result};

const TEST_RESULTS_TAG: &str = "test-results";
const TEST_SUITE_TAG: &str = "test-suite";
const TEST_CASE_TAG: &str = "test-case";
const RESULTS_TAG: &str = "results";

/// Kind of a result entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Suite,
    Case,
}

impl EntryKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            TEST_SUITE_TAG => Some(Self::Suite),
            TEST_CASE_TAG => Some(Self::Case),
            _ => None,
        }
    }
}

/// One `test-suite` or `test-case` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultNode {
    kind: EntryKind,
    name: Option<String>,
    description: Option<String>,
    result: Option<String>,
    suites: Vec<ResultNode>,
    cases: Vec<ResultNode>,
}

impl ResultNode {
    fn from_start(kind: EntryKind, start: &BytesStart<'_>) -> Result<Self> {
        let mut node = Self {
            kind,
            name: None,
            description: None,
            result: None,
            suites: Vec::new(),
            cases: Vec::new(),
        };

        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let slot = match attr.key.as_ref() {
                b"name" => &mut node.name,
                b"description" => &mut node.description,
                b"result" => &mut node.result,
                _ => continue,
            };
            *slot = Some(attr.unescape_value()?.into_owned());
        }

        Ok(node)
    }

    fn push_child(&mut self, child: ResultNode) {
        match child.kind {
            EntryKind::Suite => self.suites.push(child),
            EntryKind::Case => self.cases.push(child),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Correlation key matched against tree labels
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Outcome marker, e.g. `Success` or `Failure`
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Nested entries in document order
    ///
    /// Suites take precedence: cases are only reported when the entry has
    /// no nested suites.
    pub fn nested(&self) -> &[ResultNode] {
        if self.suites.is_empty() {
            &self.cases
        } else {
            &self.suites
        }
    }
}

/// A parsed result artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDocument {
    root: ResultNode,
}

impl ResultDocument {
    /// Parse result XML
    pub fn parse(xml: &str) -> Result<Self> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut builder = DocumentBuilder::default();
        loop {
            match reader.read_event()? {
                Event::Start(start) => builder.open(&start)?,
                Event::Empty(start) => {
                    builder.open(&start)?;
                    builder.close()?;
                }
                Event::End(_) => builder.close()?,
                Event::Eof => break,
                _ => {}
            }
        }
        builder.finish()
    }

    /// Read and parse a result file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::file_read(path, &e))?;
        Self::parse(&content)
    }

    /// The top `test-suite` under `test-results`
    pub fn root(&self) -> &ResultNode {
        &self.root
    }
}

struct OpenEntry {
    node: ResultNode,
    attached: bool,
}

/// Tracks open elements while streaming through the document
#[derive(Default)]
struct DocumentBuilder {
    path: Vec<String>,
    entries: Vec<OpenEntry>,
    root: Option<ResultNode>,
    seen_document_element: bool,
    ignored_roots: usize,
}

impl DocumentBuilder {
    fn open(&mut self, start: &BytesStart<'_>) -> Result<()> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();

        if self.path.is_empty() {
            if tag != TEST_RESULTS_TAG {
                return Err(Error::InvalidResults(format!(
                    "expected <{}> document element, found <{}>",
                    TEST_RESULTS_TAG, tag
                )));
            }
            self.seen_document_element = true;
        }

        if let Some(kind) = EntryKind::from_tag(&tag) {
            let attached = self.accepts(kind);
            let node = ResultNode::from_start(kind, start)?;
            self.entries.push(OpenEntry { node, attached });
        }

        self.path.push(tag);
        Ok(())
    }

    /// Whether an entry opened at the current position belongs to the tree
    fn accepts(&self, kind: EntryKind) -> bool {
        match self.path.as_slice() {
            [document] => document == TEST_RESULTS_TAG && kind == EntryKind::Suite,
            [.., parent, last] => last == RESULTS_TAG && EntryKind::from_tag(parent).is_some(),
            [] => false,
        }
    }

    fn close(&mut self) -> Result<()> {
        let tag = self
            .path
            .pop()
            .ok_or_else(|| Error::InvalidResults("unbalanced closing tag".to_string()))?;

        if EntryKind::from_tag(&tag).is_none() {
            return Ok(());
        }

        let entry = self
            .entries
            .pop()
            .ok_or_else(|| Error::Internal(format!("no open entry for <{}>", tag)))?;
        if !entry.attached {
            return Ok(());
        }

        match self.entries.last_mut() {
            Some(parent) => parent.node.push_child(entry.node),
            None if self.root.is_none() => self.root = Some(entry.node),
            None => self.ignored_roots += 1,
        }
        Ok(())
    }

    fn finish(self) -> Result<ResultDocument> {
        if let Some(open) = self.path.last() {
            return Err(Error::InvalidResults(format!(
                "document ends inside <{}>",
                open
            )));
        }
        if !self.seen_document_element {
            return Err(Error::InvalidResults(format!(
                "missing <{}> document element",
                TEST_RESULTS_TAG
            )));
        }
        if self.ignored_roots > 0 {
            tracing::warn!(
                ignored = self.ignored_roots,
                "Result file has more than one top-level suite; using the first"
            );
        }

        let root = self.root.ok_or_else(|| {
            Error::InvalidResults(format!(
                "no <{}> under <{}>",
                TEST_SUITE_TAG, TEST_RESULTS_TAG
            ))
        })?;
        Ok(ResultDocument { root })
    }
}
