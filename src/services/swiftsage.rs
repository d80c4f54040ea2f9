//! SwiftSage orchestrator.
//!
//! Drives the bounded generate → execute → vote → score loop and escalates
//! to Sage once when scores stall or the iteration budget runs out:
//!
//! ```text
//! GENERATE ─▶ EVALUATE ─┬─▶ ACCEPT ─▶ DONE
//!    ▲                  │
//!    └──── CONTINUE ◀───┤
//!                       └─▶ ESCALATE ─▶ SAGE ─▶ DONE
//! ```
//!
//! Everything that happened is returned as an explicit [`Trace`] and
//! [`RawTrace`]; `tracing` events are ambient diagnostics only.

use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, Instrument};

use super::choice_agent::ChoiceAgent;
use super::feedback_agent::FeedbackAgent;
use super::prompt_template::PromptTemplates;
use super::sage_agent::{SageAgent, Verdict};
use super::swift_agent::{SwiftAgent, SwiftBatch};
use crate::domain::errors::{SolveError, SolveResult};
use crate::domain::models::{
    feedback_label, swift_label, AnswerMode, Candidate, Config, Problem, RawTrace,
    ReasoningState, Trace, TraceRecord, CHOICE_LABEL, NO_SOLUTION, SAGE_LABEL,
};
use crate::domain::ports::{CodeSandbox, RoleProviders};

/// Why the loop handed over to Sage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationReason {
    /// Scores stopped improving
    Stagnation,

    /// `max_iterations` ran out without an accepted score
    IterationsExhausted,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// A Swift solution reached the reward threshold
    Accepted { iteration: u32 },

    /// Sage produced the final answer
    Escalated { reason: EscalationReason },
}

impl Termination {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted { iteration } => write!(f, "accepted at iteration {iteration}"),
            Self::Escalated {
                reason: EscalationReason::Stagnation,
            } => f.write_str("escalated to Sage after scores stagnated"),
            Self::Escalated {
                reason: EscalationReason::IterationsExhausted,
            } => f.write_str("escalated to Sage after iterations ran out"),
        }
    }
}

/// Final answer of a session plus everything that led to it.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub reasoning: String,
    pub solution: String,
    pub trace: Trace,
    pub raw_trace: RawTrace,
    pub termination: Termination,
}

impl SolveOutcome {
    /// Code behind the final answer: Sage's revised program if it wrote one,
    /// otherwise the last chosen Swift program.
    pub fn final_code(&self) -> Option<&str> {
        let mut code = None;
        for (_, record) in self.trace.iter() {
            match record {
                TraceRecord::Swift { candidate, .. } => {
                    code = candidate.code.as_deref().or(code);
                }
                TraceRecord::Sage {
                    code: Some(sage_code),
                    ..
                } => code = Some(sage_code.as_str()),
                _ => {}
            }
        }
        code
    }
}

/// A session mapped onto a multiple-choice letter.
#[derive(Debug, Clone)]
pub struct ChoiceOutcome {
    pub outcome: SolveOutcome,

    /// Chosen option letter; `None` when the response named none
    pub choice: Option<String>,
}

/// Render a question with labelled options `(A) ..., (B) ...`.
pub fn format_choice_question(question: &str, choices: &[String]) -> String {
    let options: Vec<String> = choices
        .iter()
        .zip('A'..='E')
        .map(|(option, label)| format!("({label}) {}", option.trim()))
        .collect();
    format!(
        "{}\nWhat of the following is the right choice? Explain your answer.\n{}",
        question.trim(),
        options.join(", ")
    )
}

/// The reasoning loop.
///
/// `solve` takes `&mut self`: a session owns the evaluator's score history
/// for its whole duration.
pub struct SwiftSage {
    swift: SwiftAgent,
    feedback: FeedbackAgent,
    sage: SageAgent,
    choice: ChoiceAgent,
    sandbox: Arc<dyn CodeSandbox>,
    best_of_n: u32,
    sage_timeout: Duration,
}

impl SwiftSage {
    pub fn new(
        config: &Config,
        providers: RoleProviders,
        sandbox: Arc<dyn CodeSandbox>,
        templates: PromptTemplates,
    ) -> Self {
        let templates = Arc::new(templates);
        Self {
            swift: SwiftAgent::new(
                providers.swift,
                Arc::clone(&sandbox),
                Arc::clone(&templates),
                Duration::from_secs(config.sandbox.swift_timeout_secs),
            ),
            feedback: FeedbackAgent::new(
                providers.feedback,
                Arc::clone(&templates),
                config.solver.stagnation_limit,
            ),
            sage: SageAgent::new(providers.sage, Arc::clone(&templates)),
            choice: ChoiceAgent::new(providers.choice, templates),
            sandbox,
            best_of_n: config.solver.best_of_n.max(1),
            sage_timeout: Duration::from_secs(config.sandbox.sage_timeout_secs),
        }
    }

    /// Override the best-of-N batch size.
    #[must_use]
    pub fn with_best_of_n(mut self, best_of_n: u32) -> Self {
        self.best_of_n = best_of_n.max(1);
        self
    }

    pub fn best_of_n(&self) -> u32 {
        self.best_of_n
    }

    pub fn feedback(&self) -> &FeedbackAgent {
        &self.feedback
    }

    /// Solve a [`Problem`], tagging diagnostics with its id.
    pub async fn solve_problem(
        &mut self,
        problem: &Problem,
        max_iterations: u32,
        reward_threshold: i64,
    ) -> SolveResult<SolveOutcome> {
        let span = info_span!("solve", problem_id = %problem.id);
        self.solve(&problem.question, max_iterations, reward_threshold)
            .instrument(span)
            .await
    }

    /// Run one session.
    ///
    /// At most `max_iterations` Swift/Feedback cycles run, followed by at
    /// most one Sage call. Only provider or sandbox machinery failures are
    /// returned as errors.
    pub async fn solve(
        &mut self,
        problem: &str,
        max_iterations: u32,
        reward_threshold: i64,
    ) -> SolveResult<SolveOutcome> {
        if max_iterations == 0 {
            return Err(SolveError::InvalidParameters(
                "max_iterations must be at least 1".to_string(),
            ));
        }

        self.feedback.reset();
        let mut state = ReasoningState::new();
        let mut trace = Trace::new();
        let mut raw_trace = RawTrace::new();
        let mut reason = EscalationReason::IterationsExhausted;

        info!(
            max_iterations,
            reward_threshold,
            best_of_n = self.best_of_n,
            "Starting solve session"
        );

        for iteration in 1..=max_iterations {
            if self.feedback.should_consult_sage() {
                info!(
                    iteration,
                    stagnant_count = self.feedback.stagnant_count(),
                    "Scores stagnated, escalating to Sage"
                );
                reason = EscalationReason::Stagnation;
                break;
            }

            let batch = self.swift.generate(problem, &state, self.best_of_n).await?;
            raw_trace.insert(swift_label(iteration), batch.exchange.clone());

            let mut chosen = batch.chosen().clone();
            state.current_reasoning = chosen.reasoning();

            let Some(solution) = batch.solution() else {
                state.current_solution = NO_SOLUTION.to_string();
                state.critical_feedback = chosen.code_report.clone();
                trace.insert(swift_label(iteration), swift_record(&batch, chosen));

                self.feedback.record_score(0);
                trace.insert(
                    feedback_label(iteration),
                    TraceRecord::feedback(0, state.critical_feedback.clone()),
                );
                info!(
                    iteration,
                    generated = batch.candidates.len(),
                    "No candidate produced a solution"
                );
                continue;
            };

            chosen.solution = Some(solution.clone());
            state.current_solution = solution;
            trace.insert(swift_label(iteration), swift_record(&batch, chosen));

            let evaluation = self
                .feedback
                .evaluate(problem, &state.current_reasoning, &state.current_solution)
                .await?;
            raw_trace.insert(feedback_label(iteration), evaluation.exchange);

            let score = evaluation.score.unwrap_or(0);
            self.feedback.record_score(score);
            state.critical_feedback = evaluation.feedback;
            trace.insert(
                feedback_label(iteration),
                TraceRecord::feedback(score, state.critical_feedback.clone()),
            );

            info!(
                iteration,
                score,
                votes = batch.votes(),
                stagnant_count = self.feedback.stagnant_count(),
                solution = %state.current_solution,
                "Scored Swift solution"
            );

            if score >= reward_threshold {
                info!(iteration, score, "Solution accepted");
                return Ok(SolveOutcome {
                    reasoning: state.current_reasoning,
                    solution: state.current_solution,
                    trace,
                    raw_trace,
                    termination: Termination::Accepted { iteration },
                });
            }
        }

        self.escalate(problem, state, trace, raw_trace, reason).await
    }

    async fn escalate(
        &self,
        problem: &str,
        state: ReasoningState,
        mut trace: Trace,
        mut raw_trace: RawTrace,
        reason: EscalationReason,
    ) -> SolveResult<SolveOutcome> {
        info!(?reason, "Consulting Sage");

        let verdict = self
            .sage
            .generate(problem, &state.current_reasoning, &state.current_solution)
            .await?;
        raw_trace.insert(SAGE_LABEL, verdict.exchange.clone());

        let Verdict {
            solved,
            reasoning_steps,
            critical_feedback,
            code,
            ..
        } = verdict;
        let reasoning = reasoning_steps
            .clone()
            .unwrap_or_else(|| state.current_reasoning.clone());
        let termination = Termination::Escalated { reason };

        let code = match code {
            Some(code) if !solved => code,
            code => {
                trace.insert(
                    SAGE_LABEL,
                    TraceRecord::Sage {
                        solved,
                        feedback: critical_feedback,
                        plan: reasoning_steps,
                        code,
                        code_report: None,
                        solution: state.current_solution.clone(),
                        recorded_at: Utc::now(),
                    },
                );
                info!(solved, "Sage kept the current solution");
                return Ok(SolveOutcome {
                    reasoning,
                    solution: state.current_solution,
                    trace,
                    raw_trace,
                    termination,
                });
            }
        };

        let result = self
            .sandbox
            .execute(&code, self.sage_timeout, &AnswerMode::Stdout)
            .await?;
        let code_report = result.status.report();
        let solution = result.value;

        info!(status = %code_report, solution = %solution, "Ran Sage revision");

        trace.insert(
            SAGE_LABEL,
            TraceRecord::Sage {
                solved,
                feedback: critical_feedback,
                plan: reasoning_steps,
                code: Some(code.clone()),
                code_report: Some(code_report),
                solution: solution.clone(),
                recorded_at: Utc::now(),
            },
        );

        Ok(SolveOutcome {
            reasoning: format!("{reasoning}\n\nThe generated code is:\n\n```python\n{code}\n```"),
            solution,
            trace,
            raw_trace,
            termination,
        })
    }

    /// Solve a multiple-choice question and map the answer onto a letter.
    ///
    /// At most five options (`A`-`E`) are supported.
    pub async fn solve_with_choices(
        &mut self,
        question: &str,
        choices: &[String],
        max_iterations: u32,
        reward_threshold: i64,
    ) -> SolveResult<ChoiceOutcome> {
        if choices.is_empty() || choices.len() > 5 {
            return Err(SolveError::InvalidParameters(format!(
                "expected 1 to 5 choices, got {}",
                choices.len()
            )));
        }

        let full_question = format_choice_question(question, choices);
        let mut outcome = self
            .solve(&full_question, max_iterations, reward_threshold)
            .await?;

        let code = outcome.final_code().unwrap_or_default().to_string();
        let selection = self
            .choice
            .choose(&full_question, &outcome.reasoning, &code, &outcome.solution)
            .await?;
        outcome.raw_trace.insert(CHOICE_LABEL, selection.exchange);

        info!(choice = ?selection.choice, "Mapped solution onto a choice");
        Ok(ChoiceOutcome {
            outcome,
            choice: selection.choice,
        })
    }
}

fn swift_record(batch: &SwiftBatch, candidate: Candidate) -> TraceRecord {
    TraceRecord::Swift {
        candidate,
        generated: batch.candidates.len(),
        with_solution: batch.with_solution(),
        votes: batch.votes(),
        recorded_at: Utc::now(),
    }
}
