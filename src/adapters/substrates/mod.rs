//! Completion backend implementations.

pub mod openai_compatible;
pub mod registry;
pub mod retry;
pub mod scripted;
pub mod vllm;

pub use openai_compatible::OpenAiCompatibleProvider;
pub use registry::ProviderRegistry;
pub use retry::RetryPolicy;
pub use scripted::ScriptedProvider;
pub use vllm::VllmProvider;
