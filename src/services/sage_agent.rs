//! Sage: the slow fallback solver.

use std::sync::Arc;
use tracing::{debug, instrument};

use super::markup::extract_markup;
use super::prompt_template::{PromptRole, PromptTemplates};
use super::role_client::RoleClient;
use crate::domain::errors::SolveResult;
use crate::domain::models::RawExchange;
use crate::domain::ports::CompletionProvider;

/// Assistant prefix for Sage completions.
pub const SAGE_PREFIX: &str = "<solved>";

/// Parsed fallback verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the previous solution is judged correct
    pub solved: bool,

    pub reasoning_steps: Option<String>,

    pub critical_feedback: Option<String>,

    /// Revised program, when one was given
    pub code: Option<String>,

    pub exchange: RawExchange,
}

impl Verdict {
    pub fn parse(response: &str, exchange: RawExchange) -> Self {
        let mut markup = extract_markup(response).into_inner();
        let solved = markup
            .get("solved")
            .is_some_and(|s| s.eq_ignore_ascii_case("true"));

        Self {
            solved,
            reasoning_steps: markup.remove("reasoning_steps"),
            critical_feedback: markup.remove("critical_feedback"),
            code: markup.remove("code").filter(|c| !c.is_empty()),
            exchange,
        }
    }
}

/// Fallback solver role.
#[derive(Clone)]
pub struct SageAgent {
    client: RoleClient,
    templates: Arc<PromptTemplates>,
}

impl SageAgent {
    pub fn new(provider: Arc<dyn CompletionProvider>, templates: Arc<PromptTemplates>) -> Self {
        Self {
            client: RoleClient::new("sage", SAGE_PREFIX, provider),
            templates,
        }
    }

    /// Ask for a verdict on the current reasoning and solution.
    #[instrument(skip_all)]
    pub async fn generate(
        &self,
        problem: &str,
        reasoning: &str,
        solution: &str,
    ) -> SolveResult<Verdict> {
        let prompt = self.templates.format(
            PromptRole::Sage,
            &[
                ("prompt", problem),
                ("reasoning", reasoning),
                ("current_solution", solution),
            ],
        );
        let exchange = self.client.ask(&prompt, 1).await?;
        let response = exchange.model_output.first().cloned().unwrap_or_default();
        let verdict = Verdict::parse(&response, exchange);
        debug!(solved = verdict.solved, has_code = verdict.code.is_some(), "Parsed verdict");
        Ok(verdict)
    }
}
