//! Mutable reasoning state of a solve session.

use serde::{Deserialize, Serialize};

/// Reasoning placeholder before any iteration ran.
pub const NO_REASONING: &str = "No reasoning steps yet.";

/// Solution placeholder before any candidate produced one.
pub const NO_SOLUTION: &str = "No current solution yet.";

/// Feedback placeholder before any critique was given.
pub const NO_FEEDBACK: &str = "No critical feedback yet.";

/// What the session currently believes, fed into the next prompt.
///
/// Owned by the orchestrator for the duration of one `solve` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningState {
    pub current_reasoning: String,
    pub current_solution: String,
    pub critical_feedback: String,
}

impl ReasoningState {
    pub fn new() -> Self {
        Self {
            current_reasoning: NO_REASONING.to_string(),
            current_solution: NO_SOLUTION.to_string(),
            critical_feedback: NO_FEEDBACK.to_string(),
        }
    }

    /// Restore the placeholders.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ReasoningState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_restores_placeholders() {
        let mut state = ReasoningState::new();
        state.current_solution = "42".to_string();
        state.reset();
        assert_eq!(state.current_solution, NO_SOLUTION);
        assert_eq!(state.current_reasoning, NO_REASONING);
        assert_eq!(state.critical_feedback, NO_FEEDBACK);
    }
}
