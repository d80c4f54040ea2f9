//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - CompletionProvider: text-completion backends behind the model roles
//! - CodeSandbox: isolated execution of generated programs
//!
//! These traits keep the reasoning loop independent of any specific
//! backend or interpreter.

pub mod code_sandbox;
pub mod completion_provider;

pub use code_sandbox::{CodeSandbox, SandboxError};
pub use completion_provider::{
    CompletionProvider, CompletionRequest, ProviderError, RoleProviders,
};
