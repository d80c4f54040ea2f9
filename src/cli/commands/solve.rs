//! Solve CLI command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{info, info_span, Instrument};

use crate::adapters::sandbox::PythonSandbox;
use crate::adapters::substrates::ProviderRegistry;
use crate::cli::output::progress::{create_spinner, hidden_spinner, ProgressBarExt};
use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, Problem, RawTrace, Trace};
use crate::domain::ports::CodeSandbox;
use crate::services::{PromptTemplates, SolveOutcome, SwiftSage, Termination};

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Problem text; `-` reads it from stdin
    pub problem: Option<String>,

    /// Read the problem text from a file
    #[arg(short, long, conflicts_with = "problem")]
    pub file: Option<PathBuf>,

    /// Multiple-choice option, repeat for up to five options
    #[arg(short = 'C', long = "choice")]
    pub choices: Vec<String>,

    /// Maximum Swift/Feedback iterations
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Score at or above which a Swift solution is accepted
    #[arg(long, allow_hyphen_values = true)]
    pub reward_threshold: Option<i64>,

    /// Candidates sampled per Swift iteration
    #[arg(long)]
    pub best_of_n: Option<u32>,

    /// Reference answer to compare against; never shown to the models
    #[arg(long)]
    pub ground_truth: Option<String>,

    /// Write the structured and raw trace as JSON to this file
    #[arg(long)]
    pub trace_out: Option<PathBuf>,

    /// Print the per-step trace table
    #[arg(long)]
    pub show_trace: bool,
}

#[derive(Debug, Serialize)]
pub struct SolveOutput {
    pub problem_id: String,
    pub solution: String,
    pub reasoning: String,
    pub termination: Termination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    #[serde(skip)]
    pub trace_table: Option<String>,
}

impl CommandOutput for SolveOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Solution: {}", self.solution),
            format!("Outcome: {}", self.termination),
        ];
        if let Some(ref choice) = self.choice {
            lines.push(format!("Choice: {choice}"));
        }
        if let Some(correct) = self.correct {
            lines.push(format!(
                "Ground truth: {}",
                if correct { "match" } else { "mismatch" }
            ));
        }
        lines.push(String::new());
        lines.push("Reasoning:".to_string());
        lines.push(self.reasoning.clone());
        if let Some(ref table) = self.trace_table {
            lines.push(String::new());
            lines.push(table.clone());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Contents of the `--trace-out` file
#[derive(Debug, Serialize)]
struct TraceFile<'a> {
    problem_id: String,
    question: &'a str,
    termination: Termination,
    trace: &'a Trace,
    raw_trace: &'a RawTrace,
}

pub async fn execute(args: SolveArgs, config: &Config, json_mode: bool) -> Result<()> {
    let question = read_problem(&args).await?;
    let mut problem = Problem::new(question);
    if let Some(ref answer) = args.ground_truth {
        problem = problem.with_ground_truth(answer.clone());
    }

    let providers = ProviderRegistry::create_roles(&config.roles)
        .context("Failed to create completion providers")?;
    let sandbox: Arc<dyn CodeSandbox> = Arc::new(PythonSandbox::from_config(&config.sandbox));
    let templates = PromptTemplates::load(config.prompts.template_dir.as_deref())
        .context("Failed to load prompt templates")?;

    let mut solver = SwiftSage::new(config, providers, sandbox, templates);
    if let Some(best_of_n) = args.best_of_n {
        solver = solver.with_best_of_n(best_of_n);
    }
    let max_iterations = args.max_iterations.unwrap_or(config.solver.max_iterations);
    let reward_threshold = args
        .reward_threshold
        .unwrap_or(config.solver.reward_threshold);

    let spinner = if json_mode {
        hidden_spinner()
    } else {
        create_spinner("Solving...")
    };

    let result = if args.choices.is_empty() {
        solver
            .solve_problem(&problem, max_iterations, reward_threshold)
            .await
            .map(|outcome| (outcome, None))
    } else {
        let span = info_span!("solve", problem_id = %problem.id);
        solver
            .solve_with_choices(
                &problem.question,
                &args.choices,
                max_iterations,
                reward_threshold,
            )
            .instrument(span)
            .await
            .map(|selected| (selected.outcome, selected.choice))
    };

    let (outcome, choice) = match result {
        Ok(solved) => {
            spinner.finish_success("Solved");
            solved
        }
        Err(err) => {
            spinner.finish_error("Failed");
            return Err(err).context("Solve session failed");
        }
    };

    if let Some(ref path) = args.trace_out {
        write_trace(path, &problem, &outcome)?;
        info!(path = %path.display(), "Wrote trace");
    }

    let answer = choice.as_deref().unwrap_or(&outcome.solution);
    let correct = problem
        .ground_truth
        .as_deref()
        .map(|truth| truth.trim().eq_ignore_ascii_case(answer.trim()));

    let trace_table = args
        .show_trace
        .then(|| TableFormatter::new().format_trace(&outcome.trace));

    let out = SolveOutput {
        problem_id: problem.id.to_string(),
        final_code: outcome.final_code().map(str::to_string),
        solution: outcome.solution,
        reasoning: outcome.reasoning,
        termination: outcome.termination,
        choice,
        correct,
        trace_table,
    };
    output(&out, json_mode);
    Ok(())
}

async fn read_problem(args: &SolveArgs) -> Result<String> {
    let text = match (&args.file, args.problem.as_deref()) {
        (Some(path), _) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read problem file {}", path.display()))?,
        (None, Some("-")) => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("Failed to read problem from stdin")?;
            buffer
        }
        (None, Some(text)) => text.to_string(),
        (None, None) => anyhow::bail!("No problem given. Pass it as an argument, `-` for stdin, or --file"),
    };

    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("Problem text is empty");
    }
    Ok(text.to_string())
}

fn write_trace(path: &Path, problem: &Problem, outcome: &SolveOutcome) -> Result<()> {
    let file = TraceFile {
        problem_id: problem.id.to_string(),
        question: &problem.question,
        termination: outcome.termination,
        trace: &outcome.trace,
        raw_trace: &outcome.raw_trace,
    };
    let json = serde_json::to_string_pretty(&file).context("Failed to serialize trace")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write trace to {}", path.display()))
}
