//! Self-hosted vLLM backend.
//!
//! vLLM speaks the OpenAI wire format. Continuing an assistant prefix needs
//! two extra body fields so the chat template leaves the final message open.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::openai_compatible::OpenAiCompatibleProvider;
use crate::domain::models::{PrefillMode, RoleConfig};
use crate::domain::ports::{CompletionProvider, CompletionRequest, ProviderError};

pub struct VllmProvider {
    inner: OpenAiCompatibleProvider,
}

impl VllmProvider {
    pub fn new(config: &RoleConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            inner: OpenAiCompatibleProvider::new(config)?,
        })
    }

    /// Extra body fields for a request.
    pub fn extra_body(request: &CompletionRequest) -> Map<String, Value> {
        let mut extra = Map::new();
        if request.has_prefill() {
            extra.insert("add_generation_prompt".to_string(), Value::Bool(false));
            extra.insert("continue_final_message".to_string(), Value::Bool(true));
        }
        extra
    }
}

#[async_trait]
impl CompletionProvider for VllmProvider {
    fn provider_id(&self) -> &str {
        "vllm"
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn prefill_mode(&self) -> PrefillMode {
        self.inner.prefill_mode()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Vec<String>, ProviderError> {
        let extra = Self::extra_body(&request);
        self.inner.complete_with(&request, extra).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Message, ProviderKind};

    #[test]
    fn test_extra_body_only_with_prefill() {
        let plain = CompletionRequest::new(vec![Message::user("q")], 1);
        assert!(VllmProvider::extra_body(&plain).is_empty());

        let prefilled =
            CompletionRequest::new(vec![Message::user("q"), Message::assistant("<plan>")], 1);
        let extra = VllmProvider::extra_body(&prefilled);
        assert_eq!(extra["add_generation_prompt"], Value::Bool(false));
        assert_eq!(extra["continue_final_message"], Value::Bool(true));
    }

    #[test]
    fn test_no_api_key_needed() {
        let config = RoleConfig {
            provider: ProviderKind::Vllm,
            ..RoleConfig::default()
        };
        let provider = VllmProvider::new(&config).unwrap();
        assert_eq!(provider.provider_id(), "vllm");
        assert_eq!(provider.prefill_mode(), PrefillMode::Echo);
    }
}
