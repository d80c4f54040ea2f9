//! OpenAI-compatible chat completions backend.
//!
//! Serves OpenAI, SambaNova, Together and Groq, which all speak the
//! `/chat/completions` wire format and differ only in base URL, API key
//! variable and whether they continue an assistant prefix.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::retry::RetryPolicy;
use crate::domain::models::{Message, PrefillMode, ProviderKind, RoleConfig};
use crate::domain::ports::{CompletionProvider, CompletionRequest, ProviderError};

/// Body of a `/chat/completions` request.
#[derive(Debug, Serialize)]
pub struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub n: u32,

    /// Backend-specific fields merged into the top level
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: Option<u32>,
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completions client bound to one role's settings.
pub struct OpenAiCompatibleProvider {
    kind: ProviderKind,
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    timeout_secs: u64,
    prefill: PrefillMode,
    retry_policy: RetryPolicy,
}

impl OpenAiCompatibleProvider {
    /// Build a client from a role's configuration.
    ///
    /// Fails when the backend needs an API key and none was resolved, or
    /// when there is no base URL.
    pub fn new(config: &RoleConfig) -> Result<Self, ProviderError> {
        let kind = config.provider;
        let base_url = config.effective_base_url().ok_or_else(|| {
            ProviderError::NotConfigured(format!("no base URL for provider '{}'", kind.as_str()))
        })?;

        if kind.requires_api_key() && config.api_key.is_none() {
            return Err(ProviderError::NotConfigured(format!(
                "{} not set for provider '{}'",
                kind.api_key_env().unwrap_or("API key"),
                kind.as_str()
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            kind,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
            prefill: config.effective_prefill(),
            retry_policy: RetryPolicy::new(config.max_retries, 1_000, 30_000),
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Send a request with extra top-level body fields, retrying transient failures.
    pub async fn complete_with(
        &self,
        request: &CompletionRequest,
        extra: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Vec<String>, ProviderError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            n: request.n,
            extra,
        };

        self.retry_policy
            .execute(|| self.send_request(&body, request.n))
            .await
    }

    async fn send_request(
        &self,
        body: &ChatCompletionBody<'_>,
        n: u32,
    ) -> Result<Vec<String>, ProviderError> {
        debug!(
            provider = self.kind.as_str(),
            model = %self.model,
            n,
            "Sending chat completion request"
        );

        let mut builder = self
            .client
            .post(self.endpoint())
            .header(header::CONTENT_TYPE, "application/json")
            .json(body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| self.map_send_error(&e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(error_from_status(status, body));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("failed to parse response: {e}")))?;

        collect_choices(parsed, n)
    }

    fn map_send_error(&self, err: &reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout_secs)
        } else {
            ProviderError::NetworkError(err.to_string())
        }
    }
}

/// Map an HTTP error status onto a provider error.
pub fn error_from_status(status: StatusCode, body: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthError(body),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(body),
        _ => ProviderError::ApiError {
            status: status.as_u16(),
            message: body,
        },
    }
}

/// Order choices by index and require exactly `n` texts.
fn collect_choices(response: ChatCompletionResponse, n: u32) -> Result<Vec<String>, ProviderError> {
    let mut choices = response.choices;
    choices.sort_by_key(|c| c.index.unwrap_or(u32::MAX));

    if choices.len() < n as usize {
        return Err(ProviderError::InvalidResponse(format!(
            "expected {n} choices, got {}",
            choices.len()
        )));
    }

    Ok(choices
        .into_iter()
        .take(n as usize)
        .map(|c| c.message.content.unwrap_or_default())
        .collect())
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    fn provider_id(&self) -> &str {
        self.kind.as_str()
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn prefill_mode(&self) -> PrefillMode {
        self.prefill
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Vec<String>, ProviderError> {
        self.complete_with(&request, serde_json::Map::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn together() -> RoleConfig {
        RoleConfig {
            provider: ProviderKind::Together,
            api_key: Some("test-key".to_string()),
            ..RoleConfig::default()
        }
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let config = RoleConfig {
            provider: ProviderKind::Groq,
            api_key: None,
            ..RoleConfig::default()
        };
        let err = OpenAiCompatibleProvider::new(&config).err().unwrap();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let config = RoleConfig {
            base_url: Some("http://localhost:9999/v1/".to_string()),
            ..together()
        };
        let provider = OpenAiCompatibleProvider::new(&config).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:9999/v1/chat/completions");
        assert_eq!(provider.provider_id(), "together");
        assert_eq!(provider.prefill_mode(), PrefillMode::Continuation);
    }

    #[test]
    fn test_body_serialization() {
        let messages = vec![Message::system(""), Message::user("hi")];
        let mut extra = serde_json::Map::new();
        extra.insert("continue_final_message".to_string(), serde_json::Value::Bool(true));
        let body = ChatCompletionBody {
            model: "m",
            messages: &messages,
            temperature: 0.5,
            top_p: 1.0,
            max_tokens: 16,
            n: 2,
            extra,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["n"], 2);
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["continue_final_message"], true);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            error_from_status(StatusCode::UNAUTHORIZED, String::new()),
            ProviderError::AuthError(_)
        ));
        assert!(matches!(
            error_from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            ProviderError::RateLimitExceeded(_)
        ));
        assert!(error_from_status(StatusCode::BAD_GATEWAY, String::new()).is_transient());
        assert!(!error_from_status(StatusCode::BAD_REQUEST, String::new()).is_transient());
    }

    #[test]
    fn test_choices_sorted_and_counted() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[
                {"index":1,"message":{"content":"b"}},
                {"index":0,"message":{"content":"a"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(collect_choices(response, 2).unwrap(), vec!["a", "b"]);

        let short: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"a"}}]}"#).unwrap();
        assert!(matches!(
            collect_choices(short, 2),
            Err(ProviderError::InvalidResponse(_))
        ));
    }
}
