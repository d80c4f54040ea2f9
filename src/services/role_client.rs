//! Shared request path for the model roles.

use std::sync::Arc;
use tracing::debug;

use crate::domain::errors::{SolveError, SolveResult};
use crate::domain::models::{normalize_prefill, role_messages, RawExchange};
use crate::domain::ports::{CompletionProvider, CompletionRequest};

/// A completion provider bound to one role and its assistant prefix.
#[derive(Clone)]
pub struct RoleClient {
    role: &'static str,
    prefix: &'static str,
    provider: Arc<dyn CompletionProvider>,
}

impl RoleClient {
    pub fn new(role: &'static str, prefix: &'static str, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            role,
            prefix,
            provider,
        }
    }

    pub fn role(&self) -> &'static str {
        self.role
    }

    pub fn provider(&self) -> &Arc<dyn CompletionProvider> {
        &self.provider
    }

    /// Send `prompt` and return `n` completions with the prefix restored.
    pub async fn ask(&self, prompt: &str, n: u32) -> SolveResult<RawExchange> {
        let prefill = self.provider.prefill_mode();
        let request = CompletionRequest::new(role_messages(prompt, self.prefix, prefill), n);
        let expected = request.n;

        debug!(
            role = self.role,
            provider = self.provider.provider_id(),
            model = self.provider.model(),
            n = expected,
            prompt = %prompt,
            "Sending role prompt"
        );

        let completions = self
            .provider
            .complete(request)
            .await
            .map_err(|e| SolveError::provider(self.role, e))?;

        if completions.len() != expected as usize {
            return Err(SolveError::IncompleteBatch {
                role: self.role,
                expected,
                got: completions.len(),
            });
        }

        let model_output: Vec<String> = if prefill.is_supported() {
            completions
                .iter()
                .map(|c| normalize_prefill(self.prefix, c))
                .collect()
        } else {
            completions
        };

        debug!(role = self.role, outputs = ?model_output, "Received completions");

        Ok(RawExchange {
            model_input: prompt.to_string(),
            model_output,
        })
    }
}

impl std::fmt::Debug for RoleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleClient")
            .field("role", &self.role)
            .field("provider", &self.provider.provider_id())
            .field("model", &self.provider.model())
            .finish()
    }
}
