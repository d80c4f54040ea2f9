//! Feedback: scores a solution and tracks stagnation.

use std::sync::Arc;
use tracing::{debug, instrument};

use super::markup::{extract_markup, SCORE_UNAVAILABLE};
use super::prompt_template::{PromptRole, PromptTemplates};
use super::role_client::RoleClient;
use crate::domain::errors::SolveResult;
use crate::domain::models::RawExchange;
use crate::domain::ports::CompletionProvider;

/// Assistant prefix for Feedback completions.
pub const FEEDBACK_PREFIX: &str = "<score>";

/// Parsed reviewer response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Integer score, absent when the response carried none
    pub score: Option<i64>,

    /// Critique, or the whole response when it had no feedback field
    pub feedback: String,

    pub exchange: RawExchange,
}

impl Evaluation {
    /// Parse one reviewer response.
    pub fn parse(response: &str, exchange: RawExchange) -> Self {
        let markup = extract_markup(response);
        let score = Some(markup.score()).filter(|s| *s != SCORE_UNAVAILABLE);
        let feedback = markup
            .get("feedback")
            .map_or_else(|| response.to_string(), str::to_string);
        Self {
            score,
            feedback,
            exchange,
        }
    }
}

/// Reviewer role plus the session's score history.
#[derive(Clone)]
pub struct FeedbackAgent {
    client: RoleClient,
    templates: Arc<PromptTemplates>,
    stagnation_limit: u32,
    scores: Vec<i64>,
    stagnant_count: u32,
}

impl FeedbackAgent {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        templates: Arc<PromptTemplates>,
        stagnation_limit: u32,
    ) -> Self {
        Self {
            client: RoleClient::new("feedback", FEEDBACK_PREFIX, provider),
            templates,
            stagnation_limit,
            scores: Vec::new(),
            stagnant_count: 0,
        }
    }

    /// Score `solution` for `problem`.
    #[instrument(skip_all)]
    pub async fn evaluate(
        &self,
        problem: &str,
        reasoning: &str,
        solution: &str,
    ) -> SolveResult<Evaluation> {
        let prompt = self.templates.format(
            PromptRole::Feedback,
            &[
                ("problem", problem),
                ("reasoning", reasoning),
                ("current_solution", solution),
            ],
        );
        let exchange = self.client.ask(&prompt, 1).await?;
        let response = exchange.model_output.first().cloned().unwrap_or_default();
        let evaluation = Evaluation::parse(&response, exchange);
        debug!(score = ?evaluation.score, "Parsed evaluation");
        Ok(evaluation)
    }

    /// Append `score` to the history and update the stagnation counter.
    ///
    /// A score that is not strictly greater than the previous one (0 before
    /// the first) counts as stagnant; a strict improvement resets the count.
    pub fn record_score(&mut self, score: i64) {
        let previous = self.scores.last().copied().unwrap_or(0);
        if score <= previous {
            self.stagnant_count += 1;
        } else {
            self.stagnant_count = 0;
        }
        self.scores.push(score);
    }

    pub fn should_consult_sage(&self) -> bool {
        self.stagnant_count >= self.stagnation_limit
    }

    pub fn reset(&mut self) {
        self.scores.clear();
        self.stagnant_count = 0;
    }

    pub fn scores(&self) -> &[i64] {
        &self.scores
    }

    pub fn stagnant_count(&self) -> u32 {
        self.stagnant_count
    }

    pub fn stagnation_limit(&self) -> u32 {
        self.stagnation_limit
    }
}
