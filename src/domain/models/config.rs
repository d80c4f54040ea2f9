use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::message::PrefillMode;

/// Main configuration structure for SwiftSage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Reasoning loop configuration
    #[serde(default)]
    pub solver: SolverConfig,

    /// Code sandbox configuration
    #[serde(default)]
    pub sandbox: SandboxConfig,

    /// Completion backends for each role
    #[serde(default)]
    pub roles: RolesConfig,

    /// Prompt template configuration
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Reasoning loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverConfig {
    /// Maximum generate/evaluate cycles before escalating
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Score at or above which a solution is accepted
    #[serde(default = "default_reward_threshold")]
    pub reward_threshold: i64,

    /// Candidates requested per Swift iteration
    #[serde(default = "default_best_of_n")]
    pub best_of_n: u32,

    /// Consecutive non-improving scores before consulting Sage
    #[serde(default = "default_stagnation_limit")]
    pub stagnation_limit: u32,
}

const fn default_max_iterations() -> u32 {
    3
}

const fn default_reward_threshold() -> i64 {
    1
}

const fn default_best_of_n() -> u32 {
    1
}

const fn default_stagnation_limit() -> u32 {
    2
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            reward_threshold: default_reward_threshold(),
            best_of_n: default_best_of_n(),
            stagnation_limit: default_stagnation_limit(),
        }
    }
}

/// Code sandbox configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SandboxConfig {
    /// Python interpreter used for worker processes
    #[serde(default = "default_python_bin")]
    pub python_bin: String,

    /// Timeout for Swift candidate runs, in seconds
    #[serde(default = "default_swift_timeout_secs")]
    pub swift_timeout_secs: u64,

    /// Timeout for the Sage revised-code run, in seconds
    #[serde(default = "default_sage_timeout_secs")]
    pub sage_timeout_secs: u64,

    /// Setup snippets executed before every program
    #[serde(default)]
    pub headers: Vec<String>,

    /// Globals injected before every program
    #[serde(default)]
    pub globals: BTreeMap<String, serde_json::Value>,
}

fn default_python_bin() -> String {
    "python3".to_string()
}

const fn default_swift_timeout_secs() -> u64 {
    5
}

const fn default_sage_timeout_secs() -> u64 {
    10
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            python_bin: default_python_bin(),
            swift_timeout_secs: default_swift_timeout_secs(),
            sage_timeout_secs: default_sage_timeout_secs(),
            headers: vec![],
            globals: BTreeMap::new(),
        }
    }
}

/// Completion backend family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI chat completions
    OpenAi,
    /// SambaNova Cloud (OpenAI wire format)
    SambaNova,
    /// Together AI (OpenAI wire format)
    #[default]
    Together,
    /// Groq (OpenAI wire format)
    Groq,
    /// Self-hosted vLLM server
    Vllm,
    /// Canned responses, no network
    Scripted,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "open_ai",
            Self::SambaNova => "samba_nova",
            Self::Together => "together",
            Self::Groq => "groq",
            Self::Vllm => "vllm",
            Self::Scripted => "scripted",
        }
    }

    /// Default API base URL.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::SambaNova => Some("https://api.sambanova.ai/v1"),
            Self::Together => Some("https://api.together.xyz/v1"),
            Self::Groq => Some("https://api.groq.com/openai/v1"),
            Self::Vllm => Some("http://localhost:8000/v1"),
            Self::Scripted => None,
        }
    }

    /// Environment variable conventionally holding the API key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::SambaNova => Some("SAMBANOVA_API_KEY"),
            Self::Together => Some("TOGETHER_API_KEY"),
            Self::Groq => Some("GROQ_API_KEY"),
            Self::Vllm | Self::Scripted => None,
        }
    }

    /// How the backend handles an assistant prefix.
    pub fn default_prefill(&self) -> PrefillMode {
        match self {
            Self::OpenAi | Self::SambaNova => PrefillMode::Unsupported,
            Self::Together | Self::Groq => PrefillMode::Continuation,
            Self::Vllm | Self::Scripted => PrefillMode::Echo,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        self.api_key_env().is_some()
    }
}

/// Backend configuration for one role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RoleConfig {
    /// Backend family
    #[serde(default)]
    pub provider: ProviderKind,

    /// Model identifier sent to the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Override for the backend's base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API key; resolved from the backend's environment variable when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override for the backend's prefill behavior
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefill: Option<PrefillMode>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling mass
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum retries for transient backend errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Canned completions for the scripted backend, served in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub script: Vec<String>,
}

fn default_model() -> String {
    "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo".to_string()
}

const fn default_temperature() -> f32 {
    0.3
}

const fn default_top_p() -> f32 {
    1.0
}

const fn default_max_tokens() -> u32 {
    2048
}

const fn default_request_timeout_secs() -> u64 {
    120
}

const fn default_max_retries() -> u32 {
    3
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_model(),
            base_url: None,
            api_key: None,
            prefill: None,
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            script: vec![],
        }
    }
}

impl RoleConfig {
    /// Base URL after applying the backend default.
    pub fn effective_base_url(&self) -> Option<String> {
        self.base_url
            .clone()
            .or_else(|| self.provider.default_base_url().map(str::to_string))
    }

    /// Prefill behavior after applying the backend default.
    pub fn effective_prefill(&self) -> PrefillMode {
        self.prefill
            .unwrap_or_else(|| self.provider.default_prefill())
    }
}

/// Backends for the four model roles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RolesConfig {
    /// Fast plan+code generator
    #[serde(default = "default_swift_role")]
    pub swift: RoleConfig,

    /// Solution scorer
    #[serde(default)]
    pub feedback: RoleConfig,

    /// Slow fallback solver
    #[serde(default)]
    pub sage: RoleConfig,

    /// Multiple-choice mapper
    #[serde(default = "default_swift_role")]
    pub choice: RoleConfig,
}

fn default_swift_role() -> RoleConfig {
    RoleConfig {
        model: "meta-llama/Meta-Llama-3-8B-Instruct-Turbo".to_string(),
        ..RoleConfig::default()
    }
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            swift: default_swift_role(),
            feedback: RoleConfig::default(),
            sage: RoleConfig::default(),
            choice: default_swift_role(),
        }
    }
}

impl RolesConfig {
    /// Iterate roles with their names.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &RoleConfig)> {
        [
            ("swift", &self.swift),
            ("feedback", &self.feedback),
            ("sage", &self.sage),
            ("choice", &self.choice),
        ]
        .into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&'static str, &mut RoleConfig)> {
        [
            ("swift", &mut self.swift),
            ("feedback", &mut self.feedback),
            ("sage", &mut self.sage),
            ("choice", &mut self.choice),
        ]
        .into_iter()
    }
}

/// Prompt template configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PromptsConfig {
    /// Directory with `<role>_template.md` overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rotated log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Whether to log to stderr as well
    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// File rotation: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const fn default_true() -> bool {
    true
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_stdout: default_true(),
            rotation: default_rotation(),
        }
    }
}
