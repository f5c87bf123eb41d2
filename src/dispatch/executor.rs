//! Execution collaborators
//!
//! The dispatcher hands every resolved test to an [`Executor`] and does not
//! wait for the outcome; results come back later through the result
//! artifact.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::common::{Error, Result};

use super::TestLocation;

/// Everything needed to run a single test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub file_path: PathBuf,
    pub is_debug: bool,
    /// Always `None`; tests are selected by line, not by breakpoint
    pub breakpoint: Option<String>,
    pub line: String,
}

impl ExecutionRequest {
    pub fn new(location: TestLocation, is_debug: bool) -> Self {
        Self {
            file_path: location.file,
            is_debug,
            breakpoint: None,
            line: location.line,
        }
    }
}

/// Runs tests on behalf of the dispatcher
///
/// Implementations must return promptly. An error only means the request
/// could not be handed off.
pub trait Executor: Send + Sync {
    fn execute(&self, request: ExecutionRequest) -> Result<()>;
}

/// Runs each request as a child process built from an argument template
///
/// The template may use `{file}`, `{line}` and `{debug}`. Must be called
/// from within a tokio runtime; the child is reaped by a background task.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl ProcessExecutor {
    pub fn new(program: PathBuf, args: Vec<String>, working_dir: &Path) -> Self {
        Self {
            program,
            args,
            working_dir: working_dir.to_path_buf(),
        }
    }

    /// Expand the argument template for a request
    pub fn render_args(&self, request: &ExecutionRequest) -> Vec<String> {
        let file = request.file_path.display().to_string();
        let debug = request.is_debug.to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{file}", &file)
                    .replace("{line}", &request.line)
                    .replace("{debug}", &debug)
            })
            .collect()
    }
}

impl Executor for ProcessExecutor {
    fn execute(&self, request: ExecutionRequest) -> Result<()> {
        let args = self.render_args(&request);
        let location = format!("{}:{}", request.file_path.display(), request.line);
        tracing::debug!(program = %self.program.display(), ?args, "Executing test");

        let mut child = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::execution_failed(&location, &e.to_string()))?;

        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => tracing::debug!(%location, ?status, "Test process exited"),
                Err(e) => tracing::warn!(%location, error = %e, "Failed to wait for test process"),
            }
        });
        Ok(())
    }
}
