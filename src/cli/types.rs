//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::config::ConfigArgs;
use crate::cli::commands::exec::ExecArgs;
use crate::cli::commands::solve::SolveArgs;

#[derive(Parser, Debug)]
#[command(name = "swiftsage")]
#[command(about = "SwiftSage - dual-strategy reasoning with sandboxed code execution", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .swiftsage/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve a problem with the Swift/Feedback/Sage loop
    Solve(SolveArgs),

    /// Run a Python file through the sandbox
    Exec(ExecArgs),

    /// Inspect configuration
    Config(ConfigArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_solve() {
        let cli = Cli::parse_from([
            "swiftsage",
            "--json",
            "solve",
            "What is 6 * 7?",
            "--max-iterations",
            "2",
            "--choice",
            "41",
            "--choice",
            "42",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Solve(args) => {
                assert_eq!(args.problem.as_deref(), Some("What is 6 * 7?"));
                assert_eq!(args.max_iterations, Some(2));
                assert_eq!(args.choices, vec!["41", "42"]);
            }
            other => panic!("Expected solve, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_exec_mode() {
        let cli = Cli::parse_from(["swiftsage", "exec", "prog.py", "--mode", "symbol:answer"]);
        match cli.command {
            Commands::Exec(args) => assert_eq!(args.mode, "symbol:answer"),
            other => panic!("Expected exec, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::parse_from(["swiftsage", "--config", "custom.yaml", "config", "show"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        assert!(matches!(cli.command, Commands::Config(_)));
    }
}
