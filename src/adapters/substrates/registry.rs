//! Completion backend registry and factory.

use std::sync::Arc;
use tracing::debug;

use super::openai_compatible::OpenAiCompatibleProvider;
use super::scripted::ScriptedProvider;
use super::vllm::VllmProvider;
use crate::domain::models::{ProviderKind, RoleConfig, RolesConfig};
use crate::domain::ports::{CompletionProvider, ProviderError, RoleProviders};

/// Builds backends from role configuration.
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Create the backend a role is configured for.
    pub fn create(config: &RoleConfig) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
        debug!(
            provider = config.provider.as_str(),
            model = %config.model,
            "Creating completion provider"
        );

        let provider: Arc<dyn CompletionProvider> = match config.provider {
            ProviderKind::OpenAi
            | ProviderKind::SambaNova
            | ProviderKind::Together
            | ProviderKind::Groq => Arc::new(OpenAiCompatibleProvider::new(config)?),
            ProviderKind::Vllm => Arc::new(VllmProvider::new(config)?),
            ProviderKind::Scripted => Arc::new(ScriptedProvider::from_config(config)),
        };
        Ok(provider)
    }

    /// Create the backends for all four roles.
    pub fn create_roles(roles: &RolesConfig) -> Result<RoleProviders, ProviderError> {
        Ok(RoleProviders {
            swift: Self::create(&roles.swift)?,
            feedback: Self::create(&roles.feedback)?,
            sage: Self::create(&roles.sage)?,
            choice: Self::create(&roles.choice)?,
        })
    }

    /// Supported backend identifiers.
    pub fn available_types() -> Vec<&'static str> {
        [
            ProviderKind::OpenAi,
            ProviderKind::SambaNova,
            ProviderKind::Together,
            ProviderKind::Groq,
            ProviderKind::Vllm,
            ProviderKind::Scripted,
        ]
        .iter()
        .map(ProviderKind::as_str)
        .collect()
    }
}
