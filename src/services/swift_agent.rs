//! Swift: the fast plan+code generator.
//!
//! One call samples a best-of-N batch, runs every candidate program in the
//! sandbox and reduces the batch to a single chosen candidate by majority
//! vote over the program outputs.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use super::markup::extract_markup;
use super::prompt_template::{PromptRole, PromptTemplates};
use super::role_client::RoleClient;
use super::voting::{majority_vote, normalize_answer, Vote};
use crate::domain::errors::SolveResult;
use crate::domain::models::{AnswerMode, Candidate, RawExchange, ReasoningState};
use crate::domain::ports::{CodeSandbox, CompletionProvider};

/// Assistant prefix for Swift completions.
pub const SWIFT_PREFIX: &str = "<plan>";

/// Stand-in for the retrieved-examples section of the prompt.
pub const NO_EXAMPLES: &str = "No similar examples available.";

/// Result of one Swift iteration.
#[derive(Debug, Clone)]
pub struct SwiftBatch {
    /// Every candidate, in generation order
    pub candidates: Vec<Candidate>,

    /// Winning vote; `None` when no candidate produced a solution
    pub vote: Option<Vote>,

    /// Verbatim prompt and completions
    pub exchange: RawExchange,
}

impl SwiftBatch {
    /// The candidate reported for this iteration.
    ///
    /// The first candidate carrying the winning solution, or the first
    /// candidate of the batch when nothing produced a solution.
    pub fn chosen(&self) -> &Candidate {
        let index = self.vote.as_ref().map_or(0, |v| v.index);
        &self.candidates[index]
    }

    /// The winning solution after answer-clause normalization.
    pub fn solution(&self) -> Option<String> {
        self.vote.as_ref().and_then(|_| {
            self.chosen()
                .solution
                .as_deref()
                .map(normalize_answer)
        })
    }

    pub fn with_solution(&self) -> usize {
        self.candidates.iter().filter(|c| c.has_solution()).count()
    }

    pub fn votes(&self) -> usize {
        self.vote.as_ref().map_or(0, |v| v.count)
    }
}

/// Fast generator role.
#[derive(Clone)]
pub struct SwiftAgent {
    client: RoleClient,
    sandbox: Arc<dyn CodeSandbox>,
    templates: Arc<PromptTemplates>,
    timeout: Duration,
}

impl SwiftAgent {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        sandbox: Arc<dyn CodeSandbox>,
        templates: Arc<PromptTemplates>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: RoleClient::new("swift", SWIFT_PREFIX, provider),
            sandbox,
            templates,
            timeout,
        }
    }

    /// Render the Swift prompt for the current state.
    pub fn prompt(&self, problem: &str, state: &ReasoningState) -> String {
        self.templates.format(
            PromptRole::Swift,
            &[
                ("prompt", problem),
                ("current_reasoning", &state.current_reasoning),
                ("examples", NO_EXAMPLES),
                ("current_solution", &state.current_solution),
                ("critical_feedback", &state.critical_feedback),
            ],
        )
    }

    /// Sample `n` candidates, execute them, and vote.
    #[instrument(skip(self, problem, state))]
    pub async fn generate(
        &self,
        problem: &str,
        state: &ReasoningState,
        n: u32,
    ) -> SolveResult<SwiftBatch> {
        let prompt = self.prompt(problem, state);
        let exchange = self.client.ask(&prompt, n).await?;

        let mut candidates = Vec::with_capacity(exchange.model_output.len());
        for (index, output) in exchange.model_output.iter().enumerate() {
            let candidate = self.evaluate_output(output).await?;
            debug!(
                candidate = index,
                report = %candidate.code_report,
                solution = ?candidate.solution,
                "Executed candidate"
            );
            candidates.push(candidate);
        }

        let solutions: Vec<Option<String>> =
            candidates.iter().map(|c| c.solution.clone()).collect();
        let vote = majority_vote(&solutions);

        Ok(SwiftBatch {
            candidates,
            vote,
            exchange,
        })
    }

    async fn evaluate_output(&self, output: &str) -> SolveResult<Candidate> {
        let mut markup = extract_markup(output).into_inner();
        let plan = markup.remove("plan");

        match markup.remove("code").filter(|code| !code.is_empty()) {
            None => Ok(Candidate::without_code(plan)),
            Some(code) => {
                let result = self
                    .sandbox
                    .execute(&code, self.timeout, &AnswerMode::Stdout)
                    .await?;
                Ok(Candidate::from_execution(plan, code, result))
            }
        }
    }
}
