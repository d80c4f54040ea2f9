//! Domain errors for the SwiftSage reasoning loop.

use thiserror::Error;

use super::ports::{ProviderError, SandboxError};

/// Failures that abort a solve session.
///
/// Parse errors, failing candidate programs, empty batches and iteration
/// exhaustion are all handled inside the loop; only collaborator failures
/// reach the caller.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("{role} completion failed: {source}")]
    Provider {
        role: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error("{role} returned {got} completions, expected {expected}")]
    IncompleteBatch {
        role: &'static str,
        expected: u32,
        got: usize,
    },

    #[error("Invalid solve parameters: {0}")]
    InvalidParameters(String),
}

impl SolveError {
    pub fn provider(role: &'static str, source: ProviderError) -> Self {
        Self::Provider { role, source }
    }
}

pub type SolveResult<T> = Result<T, SolveError>;
