//! Error types for the test explorer
//!
//! Error messages are written to be actionable from the command line, with
//! hints on how to resolve common setup issues.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the test explorer
#[derive(Error, Debug)]
pub enum Error {
    // === Setup Errors ===
    #[error("No PowerShell runtime found. Searched: {searched}. Set [runtime] path in the config file")]
    RuntimeNotFound { searched: String },

    // === Discovery Errors ===
    #[error("Failed to start discovery process: {0}")]
    DiscoverySpawn(String),

    #[error("Discovery process reported an error: {0}")]
    DiscoveryFailed(String),

    #[error("Failed to decode discovery tree: {0}")]
    TreeDecode(#[source] serde_json::Error),

    #[error("Invalid discovery tree: {0}")]
    InvalidTree(String),

    // === Result Artifact Errors ===
    #[error("Failed to parse result file: {0}")]
    ResultParse(#[from] quick_xml::Error),

    #[error("Invalid result file: {0}")]
    InvalidResults(String),

    // === Dispatch Errors ===
    #[error("Node id '{0}' does not encode a <file>:<line> location")]
    InvalidNodeId(String),

    #[error("Failed to execute test at {location}: {reason}")]
    ExecutionFailed { location: String, reason: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a runtime not found error listing the names that were searched
    pub fn runtime_not_found<S: AsRef<str>>(searched: &[S]) -> Self {
        Self::RuntimeNotFound {
            searched: searched
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Create an execution failed error
    pub fn execution_failed(location: &str, reason: &str) -> Self {
        Self::ExecutionFailed {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a file read error for a path
    pub fn file_read(path: &std::path::Path, error: &io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Whether this error aborts setup rather than a single operation
    pub fn is_fatal_setup(&self) -> bool {
        matches!(
            self,
            Error::RuntimeNotFound { .. } | Error::Config(_) | Error::ConfigParse(_)
        )
    }

    /// Process exit code: 2 for setup problems, 1 for failed operations
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal_setup() {
            2
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_not_found_message() {
        let err = Error::runtime_not_found(&["pwsh", "powershell"]);
        assert!(err.to_string().contains("pwsh, powershell"));
        assert!(err.is_fatal_setup());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_config_errors_are_fatal() {
        assert_eq!(Error::ConfigParse("bad".to_string()).exit_code(), 2);
        assert_eq!(Error::Config("no script".to_string()).exit_code(), 2);
    }

    #[test]
    fn test_transient_errors_are_not_fatal() {
        assert!(!Error::InvalidNodeId("root".to_string()).is_fatal_setup());
        assert!(!Error::DiscoveryFailed("boom".to_string()).is_fatal_setup());
        assert_eq!(Error::DiscoveryFailed("boom".to_string()).exit_code(), 1);
    }
}
