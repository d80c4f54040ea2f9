//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Environment variable overrides
//! - API key resolution from backend variables
//! - Configuration validation

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
