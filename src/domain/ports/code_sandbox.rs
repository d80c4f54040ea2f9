//! Code Sandbox Port
//!
//! Runs one untrusted program in an isolated, time-bounded worker.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::models::{AnswerMode, SandboxResult};

/// Failures of the sandbox machinery itself.
///
/// Anything the candidate program does wrong (raising, hanging, printing
/// garbage) is reported through [`SandboxResult`], never through this error.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("Failed to spawn sandbox worker '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Sandbox worker I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode sandbox job: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Port trait for isolated code execution
#[async_trait]
pub trait CodeSandbox: Send + Sync {
    /// Execute `code` in a fresh worker, killing it at `timeout`.
    async fn execute(
        &self,
        code: &str,
        timeout: Duration,
        mode: &AnswerMode,
    ) -> Result<SandboxResult, SandboxError>;
}
