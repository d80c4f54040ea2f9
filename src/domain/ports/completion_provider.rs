//! Completion Provider Port
//!
//! Abstraction over text-completion backends. Each backend (OpenAI-compatible
//! clouds, a self-hosted vLLM server, a scripted stand-in) implements this
//! trait once and is selected when the solver is constructed.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::models::{Message, PrefillMode};

/// A batched completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Ordered role-tagged messages. A trailing assistant message is a
    /// prefix the backend should continue.
    pub messages: Vec<Message>,

    /// Number of completions to sample
    pub n: u32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>, n: u32) -> Self {
        Self {
            messages,
            n: n.max(1),
        }
    }

    /// Whether the request ends with an assistant prefix.
    pub fn has_prefill(&self) -> bool {
        self.messages
            .last()
            .is_some_and(|m| m.role == crate::domain::models::ChatRole::Assistant)
    }
}

/// Error types for completion backends
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimitExceeded(_) | Self::NetworkError(_) | Self::Timeout(_) => true,
            Self::ApiError { status, .. } => matches!(status, 500 | 502 | 503 | 504 | 529),
            Self::NotConfigured(_) | Self::AuthError(_) | Self::InvalidResponse(_) => false,
        }
    }
}

/// Port trait for completion backends
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the solver holds them behind `Arc`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Stable backend identifier, e.g. "together", "vllm"
    fn provider_id(&self) -> &str;

    /// Model the backend was configured with
    fn model(&self) -> &str;

    /// How this backend treats a trailing assistant prefix
    fn prefill_mode(&self) -> PrefillMode;

    /// Sample `request.n` completions in one call.
    ///
    /// Returns exactly `request.n` texts on success. Partial batches are
    /// never returned.
    async fn complete(&self, request: CompletionRequest) -> Result<Vec<String>, ProviderError>;
}

/// One backend per model role.
#[derive(Clone)]
pub struct RoleProviders {
    pub swift: Arc<dyn CompletionProvider>,
    pub feedback: Arc<dyn CompletionProvider>,
    pub sage: Arc<dyn CompletionProvider>,
    pub choice: Arc<dyn CompletionProvider>,
}

impl RoleProviders {
    /// Use the same backend for every role.
    pub fn shared(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            swift: Arc::clone(&provider),
            feedback: Arc::clone(&provider),
            sage: Arc::clone(&provider),
            choice: provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_clamps_n() {
        let request = CompletionRequest::new(vec![Message::user("hi")], 0);
        assert_eq!(request.n, 1);
    }

    #[test]
    fn test_has_prefill() {
        let request = CompletionRequest::new(
            vec![Message::user("hi"), Message::assistant("<plan>")],
            1,
        );
        assert!(request.has_prefill());
        assert!(!CompletionRequest::new(vec![Message::user("hi")], 1).has_prefill());
    }

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::RateLimitExceeded("slow down".into()).is_transient());
        assert!(ProviderError::ApiError { status: 503, message: String::new() }.is_transient());
        assert!(!ProviderError::ApiError { status: 400, message: String::new() }.is_transient());
        assert!(!ProviderError::AuthError("bad key".into()).is_transient());
    }
}
