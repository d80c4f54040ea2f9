//! SwiftSage - dual-strategy reasoning with sandboxed code execution
//!
//! A fast generator (Swift) proposes plan+code candidates for a problem.
//! Each candidate's code runs in an isolated, time-bounded Python worker;
//! the surviving answers are majority-voted and scored by a feedback
//! evaluator. When scores stall or the iteration budget runs out, a slow
//! fallback solver (Sage) gives the final verdict.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, port traits and errors
//! - **Adapters** (`adapters`): Completion backends and the Python sandbox
//! - **Service Layer** (`services`): Markup parsing, voting, the model roles and the orchestrator
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use swiftsage::adapters::sandbox::PythonSandbox;
//! use swiftsage::adapters::substrates::ProviderRegistry;
//! use swiftsage::services::{PromptTemplates, SwiftSage};
//! use swiftsage::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let providers = ProviderRegistry::create_roles(&config.roles)?;
//!     let sandbox = Arc::new(PythonSandbox::from_config(&config.sandbox));
//!     let mut solver = SwiftSage::new(&config, providers, sandbox, PromptTemplates::builtin());
//!
//!     let outcome = solver.solve("What is 17 * 23?", 3, 1).await?;
//!     println!("{}", outcome.solution);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{SolveError, SolveResult};
pub use domain::models::{
    AnswerMode, Candidate, Config, ExecStatus, Problem, RawTrace, SandboxResult, Trace,
    TraceRecord,
};
pub use domain::ports::{CodeSandbox, CompletionProvider, CompletionRequest, RoleProviders};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{SolveOutcome, SwiftSage, Termination};
