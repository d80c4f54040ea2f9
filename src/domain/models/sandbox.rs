//! Sandbox execution domain models.
//!
//! A sandbox run turns one piece of untrusted source text into a bounded
//! result: the captured answer plus a status describing how the run ended.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status text reported for a successful run.
pub const STATUS_DONE: &str = "Done";

/// Status text reported for a run killed at its deadline.
pub const STATUS_TIMEOUT: &str = "Timeout Error";

/// How the answer of a sandbox run is obtained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerMode {
    /// Everything the program printed to standard output
    #[default]
    Stdout,

    /// The value bound to a named global after execution
    Symbol(String),

    /// An expression evaluated against the post-execution globals
    Expr(String),

    /// The program's last line, evaluated as an expression after the rest ran
    LastExpression,
}

impl AnswerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Symbol(_) => "symbol",
            Self::Expr(_) => "expr",
            Self::LastExpression => "last",
        }
    }
}

impl FromStr for AnswerMode {
    type Err = String;

    /// Parses `stdout`, `last`, `symbol:<name>` or `expr:<expression>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "stdout" => return Ok(Self::Stdout),
            "last" | "last_expression" => return Ok(Self::LastExpression),
            _ => {}
        }

        if let Some(name) = trimmed.strip_prefix("symbol:") {
            let name = name.trim();
            if name.is_empty() {
                return Err("symbol mode requires a variable name".to_string());
            }
            return Ok(Self::Symbol(name.to_string()));
        }

        if let Some(expr) = trimmed.strip_prefix("expr:") {
            let expr = expr.trim();
            if expr.is_empty() {
                return Err("expr mode requires an expression".to_string());
            }
            return Ok(Self::Expr(expr.to_string()));
        }

        Err(format!(
            "unknown answer mode '{trimmed}' (expected stdout, last, symbol:<name> or expr:<expression>)"
        ))
    }
}

/// How a sandbox run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecStatus {
    /// Finished and produced a serializable answer
    Done,

    /// Killed at the wall-clock deadline
    Timeout,

    /// Raised an exception, failed the serialization check, or died
    Error(String),
}

impl ExecStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Status text as reported to callers: `Done`, `Timeout Error`, or the error message.
    pub fn report(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ExecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => f.write_str(STATUS_DONE),
            Self::Timeout => f.write_str(STATUS_TIMEOUT),
            Self::Error(message) => f.write_str(message),
        }
    }
}

/// Outcome of one sandbox run. Produced per call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxResult {
    /// Captured answer text; empty unless the run finished
    pub value: String,

    /// How the run ended
    pub status: ExecStatus,
}

impl SandboxResult {
    pub fn done(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            status: ExecStatus::Done,
        }
    }

    pub fn timeout() -> Self {
        Self {
            value: String::new(),
            status: ExecStatus::Timeout,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            status: ExecStatus::Error(message.into()),
        }
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    /// The `(result_text, status_text)` pair.
    pub fn into_pair(self) -> (String, String) {
        let report = self.status.report();
        (self.value, report)
    }
}
