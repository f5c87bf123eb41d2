//! Configuration file handling
//!
//! Configuration is read from `pester-explorer.toml` in the workspace root
//! when present, otherwise from the user config file. Every section is
//! optional and falls back to defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::{config_path, workspace_config_path};
use super::{Error, Result};
use crate::results::SingletonPolicy;

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// PowerShell runtime lookup
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Test discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Result artifact settings
    #[serde(default)]
    pub results: ResultsConfig,

    /// Result correlation settings
    #[serde(default)]
    pub correlation: CorrelationConfig,

    /// Artifact watch settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Test execution settings
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// PowerShell runtime lookup
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// Explicit path to the runtime executable
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Executable names searched on PATH, in order
    #[serde(default = "default_runtime_candidates")]
    pub candidates: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            path: None,
            candidates: default_runtime_candidates(),
        }
    }
}

fn default_runtime_candidates() -> Vec<String> {
    vec!["pwsh".to_string(), "powershell".to_string()]
}

/// Test discovery settings
#[derive(Debug, Deserialize, Clone)]
pub struct DiscoveryConfig {
    /// File name suffix identifying test definition files
    #[serde(default = "default_pattern_suffix")]
    pub pattern_suffix: String,

    /// Discovery script run by the runtime with `-File`
    #[serde(default)]
    pub script: Option<PathBuf>,

    /// Arguments passed to the runtime before the script
    #[serde(default = "default_discovery_args")]
    pub args: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            pattern_suffix: default_pattern_suffix(),
            script: None,
            args: default_discovery_args(),
        }
    }
}

fn default_pattern_suffix() -> String {
    ".Tests.ps1".to_string()
}

fn default_discovery_args() -> Vec<String> {
    vec!["-NoProfile".to_string(), "-NonInteractive".to_string()]
}

/// Result artifact settings
#[derive(Debug, Deserialize, Clone)]
pub struct ResultsConfig {
    /// File name of the result artifact, searched in the workspace
    #[serde(default = "default_results_file")]
    pub file_name: String,

    /// Value of the `result` attribute that marks a failed test
    #[serde(default = "default_failure_marker")]
    pub failure_marker: String,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            file_name: default_results_file(),
            failure_marker: default_failure_marker(),
        }
    }
}

fn default_results_file() -> String {
    "TestExplorerResults.xml".to_string()
}

fn default_failure_marker() -> String {
    "Failure".to_string()
}

/// Result correlation settings
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CorrelationConfig {
    /// How tree children pair with a lone nested result entry
    #[serde(default)]
    pub singleton: SingletonPolicy,
}

/// Artifact watch settings
#[derive(Debug, Deserialize, Clone)]
pub struct WatchConfig {
    /// Interval between artifact metadata polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_poll_interval() -> u64 {
    500
}

/// Test execution settings
///
/// `args` may contain the placeholders `{file}`, `{line}` and `{debug}`.
#[derive(Debug, Deserialize, Clone)]
pub struct ExecutionConfig {
    /// Program to run; the resolved runtime when unset
    #[serde(default)]
    pub command: Option<PathBuf>,

    /// Argument template
    #[serde(default = "default_execution_args")]
    pub args: Vec<String>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: default_execution_args(),
        }
    }
}

fn default_execution_args() -> Vec<String> {
    vec![
        "-NoProfile".to_string(),
        "-NonInteractive".to_string(),
        "-Command".to_string(),
        "Invoke-Pester -Script '{file}' -OutputFormat NUnitXml -OutputFile TestExplorerResults.xml"
            .to_string(),
    ]
}

impl Config {
    /// Load configuration for a workspace
    ///
    /// Prefers the workspace file, then the user config file, and returns
    /// the default configuration if neither exists
    pub fn load(workspace: &Path) -> Result<Self> {
        let workspace_file = workspace_config_path(workspace);
        if workspace_file.exists() {
            return Self::load_from(&workspace_file);
        }

        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}

impl RuntimeConfig {
    /// Resolve the runtime executable
    ///
    /// An explicit path wins; otherwise the candidates are searched on PATH
    pub fn resolve(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            if path.exists() {
                return Ok(path.clone());
            }
            return which::which(path).map_err(|_| Error::runtime_not_found(&[path.display().to_string()]));
        }

        self.candidates
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| Error::runtime_not_found(&self.candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.results.file_name, "TestExplorerResults.xml");
        assert_eq!(config.results.failure_marker, "Failure");
        assert_eq!(config.discovery.pattern_suffix, ".Tests.ps1");
        assert_eq!(config.correlation.singleton, SingletonPolicy::FanOut);
        assert_eq!(config.watch.poll_interval_ms, 500);
        assert_eq!(config.runtime.candidates, vec!["pwsh", "powershell"]);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [correlation]
            singleton = "match_label"

            [watch]
            poll_interval_ms = 50

            [discovery]
            script = "tools/discover.ps1"
            "#,
        )
        .unwrap();
        assert_eq!(config.correlation.singleton, SingletonPolicy::MatchLabel);
        assert_eq!(config.watch.poll_interval_ms, 50);
        assert_eq!(config.discovery.script, Some(PathBuf::from("tools/discover.ps1")));
        assert_eq!(config.discovery.args, vec!["-NoProfile", "-NonInteractive"]);
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let err = Config::parse("[watch]\npoll_interval_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_workspace_file_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            workspace_config_path(dir.path()),
            "[results]\nfile_name = \"out.xml\"\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.results.file_name, "out.xml");
    }

    #[test]
    fn test_missing_runtime_is_reported() {
        let runtime = RuntimeConfig {
            path: None,
            candidates: vec!["definitely-not-a-real-runtime-xyz".to_string()],
        };
        let err = runtime.resolve().unwrap_err();
        assert!(matches!(err, Error::RuntimeNotFound { .. }));
    }
}
