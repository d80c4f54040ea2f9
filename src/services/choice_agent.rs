//! Maps a worked solution onto a multiple-choice letter.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, instrument, warn};

use super::markup::extract_markup;
use super::prompt_template::{PromptRole, PromptTemplates};
use super::role_client::RoleClient;
use crate::domain::errors::SolveResult;
use crate::domain::models::RawExchange;
use crate::domain::ports::CompletionProvider;

/// Assistant prefix for choice completions.
pub const CHOICE_PREFIX: &str = "<choice>";

static CHOICE_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-E]").expect("choice pattern is valid"));

/// Selected option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSelection {
    /// Option letter, `None` when no letter could be found
    pub choice: Option<String>,

    pub exchange: RawExchange,
}

/// Extract the chosen letter from a response.
///
/// A lone `choice` field is taken as given. Otherwise the first capital
/// `A`-`E` anywhere in the response is used.
pub fn parse_choice(response: &str) -> Option<String> {
    let markup = extract_markup(response);
    if markup.len() == 1 {
        if let Some(choice) = markup.non_empty("choice") {
            return Some(choice.to_string());
        }
    }
    CHOICE_LETTER
        .find(response)
        .map(|m| m.as_str().to_string())
}

/// Multiple-choice mapping role.
#[derive(Clone)]
pub struct ChoiceAgent {
    client: RoleClient,
    templates: Arc<PromptTemplates>,
}

impl ChoiceAgent {
    pub fn new(provider: Arc<dyn CompletionProvider>, templates: Arc<PromptTemplates>) -> Self {
        Self {
            client: RoleClient::new("choice", CHOICE_PREFIX, provider),
            templates,
        }
    }

    #[instrument(skip_all)]
    pub async fn choose(
        &self,
        question: &str,
        plan: &str,
        code: &str,
        code_result: &str,
    ) -> SolveResult<ChoiceSelection> {
        let prompt = self.templates.format(
            PromptRole::Choice,
            &[
                ("question", question),
                ("current_plan", plan),
                ("current_code", code),
                ("current_code_res", code_result),
            ],
        );
        let exchange = self.client.ask(&prompt, 1).await?;
        let response = exchange.model_output.first().cloned().unwrap_or_default();

        let choice = parse_choice(&response);
        match &choice {
            Some(letter) => debug!(choice = %letter, "Parsed choice"),
            None => warn!("No option letter in choice response"),
        }
        Ok(ChoiceSelection { choice, exchange })
    }
}
