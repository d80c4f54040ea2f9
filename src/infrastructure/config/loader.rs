use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::domain::models::config::{Config, ProviderKind};

/// Project configuration file
pub const PROJECT_CONFIG: &str = ".swiftsage/config.yaml";

/// Project local overrides
pub const LOCAL_CONFIG: &str = ".swiftsage/local.yaml";

/// Environment variable prefix; `__` separates nested keys
pub const ENV_PREFIX: &str = "SWIFTSAGE_";

/// Overrides the OpenAI base URL for roles that do not set one
pub const OPENAI_URL_ENV: &str = "OPENAI_API_URL";

/// Placeholder shown instead of secrets
pub const REDACTED: &str = "***";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_iterations: {0}. Must be at least 1")]
    InvalidMaxIterations(u32),

    #[error("Invalid best_of_n: {0}. Must be at least 1")]
    InvalidBestOfN(u32),

    #[error("Invalid stagnation_limit: {0}. Must be at least 1")]
    InvalidStagnationLimit(u32),

    #[error("Invalid {field}: timeouts must be positive")]
    InvalidTimeout { field: String },

    #[error("Model for role '{0}' cannot be empty")]
    EmptyModel(String),

    #[error("Python binary cannot be empty")]
    EmptyPythonBin,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .swiftsage/config.yaml (project config)
    /// 3. .swiftsage/local.yaml (project local overrides, optional)
    /// 4. Environment variables (SWIFTSAGE_* prefix, highest priority)
    ///
    /// API keys missing from every layer are then taken from each backend's
    /// conventional variable.
    pub fn load() -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(PROJECT_CONFIG))
            .merge(Yaml::file(LOCAL_CONFIG))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::finish(figment).context("Failed to extract configuration from figment")
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::finish(figment).context(format!("Failed to load config from {}", path.display()))
    }

    /// Load from `path` when given, otherwise from the project hierarchy
    pub fn load_with(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }

    fn finish(figment: Figment) -> Result<Config> {
        let mut config: Config = figment.extract()?;
        Self::resolve_environment(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Fill unset API keys and the OpenAI base URL from the environment
    pub fn resolve_environment(config: &mut Config) {
        let openai_url = std::env::var(OPENAI_URL_ENV).ok().filter(|v| !v.is_empty());

        for (role, settings) in config.roles.iter_mut() {
            if settings.api_key.is_none() {
                if let Some(var) = settings.provider.api_key_env() {
                    settings.api_key = std::env::var(var).ok().filter(|v| !v.is_empty());
                    if settings.api_key.is_some() {
                        debug!(role, var, "Resolved API key from environment");
                    }
                }
            }

            if settings.provider == ProviderKind::OpenAi && settings.base_url.is_none() {
                settings.base_url.clone_from(&openai_url);
            }
        }
    }

    /// A copy of `config` that is safe to print
    pub fn redacted(config: &Config) -> Config {
        let mut config = config.clone();
        for (_, settings) in config.roles.iter_mut() {
            if settings.api_key.is_some() {
                settings.api_key = Some(REDACTED.to_string());
            }
        }
        config
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let solver = &config.solver;
        if solver.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations(solver.max_iterations));
        }
        if solver.best_of_n == 0 {
            return Err(ConfigError::InvalidBestOfN(solver.best_of_n));
        }
        if solver.stagnation_limit == 0 {
            return Err(ConfigError::InvalidStagnationLimit(solver.stagnation_limit));
        }

        let sandbox = &config.sandbox;
        if sandbox.python_bin.trim().is_empty() {
            return Err(ConfigError::EmptyPythonBin);
        }
        if sandbox.swift_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                field: "sandbox.swift_timeout_secs".to_string(),
            });
        }
        if sandbox.sage_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                field: "sandbox.sage_timeout_secs".to_string(),
            });
        }

        for (role, settings) in config.roles.iter() {
            if settings.model.trim().is_empty() {
                return Err(ConfigError::EmptyModel(role.to_string()));
            }
            if settings.timeout_secs == 0 {
                return Err(ConfigError::InvalidTimeout {
                    field: format!("roles.{role}.timeout_secs"),
                });
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}
