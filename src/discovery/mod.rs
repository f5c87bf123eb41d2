//! Test discovery
//!
//! Discovery runs an external analyzer over the workspace test files and
//! decodes the JSON tree it prints. The analyzer's output is read to
//! completion before decoding; any stderr output fails the discovery.

pub mod files;

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::tree::Tree;

/// Produces a discovery tree from test definition files
#[async_trait]
pub trait Discoverer: Send + Sync {
    async fn discover(&self, files: &[PathBuf]) -> Result<Tree>;
}

/// Runs a discovery script with the PowerShell runtime
///
/// The test files are appended to the configured arguments.
#[derive(Debug, Clone)]
pub struct ProcessDiscoverer {
    program: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl ProcessDiscoverer {
    pub fn new(program: PathBuf, args: Vec<String>, working_dir: &Path) -> Self {
        Self {
            program,
            args,
            working_dir: working_dir.to_path_buf(),
        }
    }

    /// Build a discoverer from configuration
    ///
    /// Resolves the runtime and requires `[discovery] script`.
    pub fn from_config(config: &Config, workspace: &Path) -> Result<Self> {
        let script = config.discovery.script.as_ref().ok_or_else(|| {
            Error::Config("No discovery script configured. Set [discovery] script".to_string())
        })?;
        let script = if script.is_relative() {
            workspace.join(script)
        } else {
            script.clone()
        };

        let program = config.runtime.resolve()?;
        tracing::debug!(runtime = %program.display(), "Using PowerShell runtime");

        let mut args = config.discovery.args.clone();
        args.push("-File".to_string());
        args.push(script.display().to_string());

        Ok(Self::new(program, args, workspace))
    }
}

#[async_trait]
impl Discoverer for ProcessDiscoverer {
    async fn discover(&self, files: &[PathBuf]) -> Result<Tree> {
        tracing::debug!(files = files.len(), "Starting discovery process");

        let output = Command::new(&self.program)
            .args(&self.args)
            .args(files)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                Error::DiscoverySpawn(format!("{}: {}", self.program.display(), e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        tracing::debug!(stdout = %stdout, "Discovery output");

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(stderr = %stderr, "Discovery process wrote to stderr");
            return Err(Error::DiscoveryFailed(stderr.trim().to_string()));
        }

        tracing::debug!(code = ?output.status.code(), "Discovery process exited");
        Tree::from_json(&stdout)
    }
}
