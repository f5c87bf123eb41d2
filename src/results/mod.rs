//! Result artifact parsing and correlation

mod correlate;
mod document;

pub use correlate::{CorrelationSummary, Correlator, SingletonPolicy};
pub use document::{EntryKind, ResultDocument, ResultNode};
