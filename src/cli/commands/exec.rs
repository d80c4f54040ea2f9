//! Exec CLI command: run one file through the sandbox.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::adapters::sandbox::PythonSandbox;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{AnswerMode, Config};
use crate::domain::ports::CodeSandbox;

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Python source file to run
    pub file: PathBuf,

    /// Timeout in seconds (defaults to the Swift sandbox timeout)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Answer mode: stdout, last, symbol:<name> or expr:<expression>
    #[arg(short, long, default_value = "stdout")]
    pub mode: String,
}

#[derive(Debug, Serialize)]
pub struct ExecOutput {
    pub value: String,
    pub status: String,
}

impl CommandOutput for ExecOutput {
    fn to_human(&self) -> String {
        format!("Status: {}\nValue: {}", self.status, self.value)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ExecArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mode: AnswerMode = args.mode.parse().map_err(anyhow::Error::msg)?;
    let code = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let timeout_secs = args.timeout.unwrap_or(config.sandbox.swift_timeout_secs);
    if timeout_secs == 0 {
        anyhow::bail!("Timeout must be at least 1 second");
    }

    let sandbox = PythonSandbox::from_config(&config.sandbox);
    let result = sandbox
        .execute(&code, Duration::from_secs(timeout_secs), &mode)
        .await
        .context("Sandbox failed to run the program")?;

    let (value, status) = result.into_pair();
    output(&ExecOutput { value, status }, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_output() {
        let out = ExecOutput {
            value: "42".to_string(),
            status: "Done".to_string(),
        };
        assert_eq!(out.to_human(), "Status: Done\nValue: 42");
        assert_eq!(out.to_json()["status"], "Done");
    }

    #[tokio::test]
    async fn test_rejects_bad_mode() {
        let args = ExecArgs {
            file: PathBuf::from("missing.py"),
            timeout: None,
            mode: "bogus".to_string(),
        };
        let err = execute(args, &Config::default(), true).await.unwrap_err();
        assert!(err.to_string().contains("unknown answer mode"));
    }
}
