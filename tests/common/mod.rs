//! Common test utilities for integration tests
//!
//! Provides a recording sandbox, scripted role backends and a solver
//! builder shared across the integration test files.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use swiftsage::adapters::substrates::ScriptedProvider;
use swiftsage::domain::models::{AnswerMode, Config, SandboxResult};
use swiftsage::domain::ports::{CodeSandbox, RoleProviders, SandboxError};
use swiftsage::services::{PromptTemplates, SwiftSage};

/// Whether a usable `python3` is on the PATH
pub fn python_available() -> bool {
    Command::new("python3")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}

/// Sandbox stand-in that answers from a table and records every call.
///
/// Code without an entry in the table "prints" its own trimmed text.
#[derive(Default)]
pub struct RecordingSandbox {
    results: HashMap<String, SandboxResult>,
    calls: Mutex<Vec<(String, Duration)>>,
}

impl RecordingSandbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, code: &str, result: SandboxResult) -> Self {
        self.results.insert(code.to_string(), result);
        self
    }

    pub fn calls(&self) -> Vec<(String, Duration)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeSandbox for RecordingSandbox {
    async fn execute(
        &self,
        code: &str,
        timeout: Duration,
        _mode: &AnswerMode,
    ) -> Result<SandboxResult, SandboxError> {
        self.calls.lock().unwrap().push((code.to_string(), timeout));
        Ok(self
            .results
            .get(code)
            .cloned()
            .unwrap_or_else(|| SandboxResult::done(code.trim())))
    }
}

/// One scripted backend per role
pub struct ScriptedRoles {
    pub swift: Arc<ScriptedProvider>,
    pub feedback: Arc<ScriptedProvider>,
    pub sage: Arc<ScriptedProvider>,
    pub choice: Arc<ScriptedProvider>,
}

impl ScriptedRoles {
    pub fn new(
        swift: ScriptedProvider,
        feedback: ScriptedProvider,
        sage: ScriptedProvider,
        choice: ScriptedProvider,
    ) -> Self {
        Self {
            swift: Arc::new(swift),
            feedback: Arc::new(feedback),
            sage: Arc::new(sage),
            choice: Arc::new(choice),
        }
    }

    pub fn providers(&self) -> RoleProviders {
        RoleProviders {
            swift: self.swift.clone(),
            feedback: self.feedback.clone(),
            sage: self.sage.clone(),
            choice: self.choice.clone(),
        }
    }
}

/// A provider that fails on its first request
pub fn unused() -> ScriptedProvider {
    ScriptedProvider::new(Vec::<String>::new())
}

/// Swift response with a plan and a code block
pub fn swift_response(plan: &str, code: &str) -> String {
    format!("<plan>{plan}</plan>\n<code>\n```python\n{code}\n```\n</code>")
}

/// Feedback response with a score and critique
pub fn feedback_response(score: i64, feedback: &str) -> String {
    format!("<score>{score}</score>\n<feedback>{feedback}</feedback>")
}

pub fn test_config(stagnation_limit: u32) -> Config {
    let mut config = Config::default();
    config.solver.stagnation_limit = stagnation_limit;
    config
}

pub fn solver(config: &Config, roles: &ScriptedRoles, sandbox: Arc<RecordingSandbox>) -> SwiftSage {
    SwiftSage::new(config, roles.providers(), sandbox, PromptTemplates::builtin())
}
