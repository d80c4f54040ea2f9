//! Scripted completion backend for tests and dry runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::models::{PrefillMode, RoleConfig};
use crate::domain::ports::{CompletionProvider, CompletionRequest, ProviderError};

/// Serves canned completions in order, `n` at a time.
///
/// When the script runs out the backend fails with
/// [`ProviderError::InvalidResponse`], or keeps repeating the last
/// completion when built with [`ScriptedProvider::repeat_last`].
pub struct ScriptedProvider {
    model: String,
    prefill: PrefillMode,
    script: Mutex<VecDeque<String>>,
    repeat_last: bool,
    last: Mutex<Option<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model: "scripted".to_string(),
            prefill: PrefillMode::Echo,
            script: Mutex::new(script.into_iter().map(Into::into).collect()),
            repeat_last: false,
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn from_config(config: &RoleConfig) -> Self {
        Self::new(config.script.clone())
            .with_model(config.model.clone())
            .with_prefill(config.effective_prefill())
            .repeat_last()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_prefill(mut self, prefill: PrefillMode) -> Self {
        self.prefill = prefill;
        self
    }

    /// Keep serving the last completion once the script is exhausted.
    pub fn repeat_last(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map_or(0, |s| s.len())
    }

    fn next_completion(&self) -> Result<String, ProviderError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| ProviderError::InvalidResponse("script lock poisoned".to_string()))?;
        let mut last = self
            .last
            .lock()
            .map_err(|_| ProviderError::InvalidResponse("script lock poisoned".to_string()))?;

        match script.pop_front() {
            Some(text) => {
                *last = Some(text.clone());
                Ok(text)
            }
            None if self.repeat_last => last
                .clone()
                .ok_or_else(|| ProviderError::NotConfigured("empty script".to_string())),
            None => Err(ProviderError::InvalidResponse("script exhausted".to_string())),
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn provider_id(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn prefill_mode(&self) -> PrefillMode {
        self.prefill
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Vec<String>, ProviderError> {
        let n = request.n;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        (0..n).map(|_| self.next_completion()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Message;

    fn request(n: u32) -> CompletionRequest {
        CompletionRequest::new(vec![Message::user("q")], n)
    }

    #[tokio::test]
    async fn test_serves_in_order() {
        let provider = ScriptedProvider::new(["a", "b", "c"]);
        assert_eq!(provider.complete(request(2)).await.unwrap(), vec!["a", "b"]);
        assert_eq!(provider.complete(request(1)).await.unwrap(), vec!["c"]);
        assert!(provider.complete(request(1)).await.is_err());
        assert_eq!(provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_repeat_last() {
        let provider = ScriptedProvider::new(["only"]).repeat_last();
        provider.complete(request(1)).await.unwrap();
        assert_eq!(
            provider.complete(request(2)).await.unwrap(),
            vec!["only", "only"]
        );
    }

    #[tokio::test]
    async fn test_empty_repeating_script_fails() {
        let provider = ScriptedProvider::new(Vec::<String>::new()).repeat_last();
        assert!(matches!(
            provider.complete(request(1)).await,
            Err(ProviderError::NotConfigured(_))
        ));
    }
}
