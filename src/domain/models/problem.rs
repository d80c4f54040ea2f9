//! Problem domain model.
//!
//! A problem is the immutable input to one solve session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A question handed to the solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Unique problem identifier
    pub id: Uuid,

    /// Question text shown to every role
    pub question: String,

    /// Reference answer, if known. Never shown to any role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<String>,
}

impl Problem {
    /// Create a problem with a fresh id and no reference answer.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            ground_truth: None,
        }
    }

    /// Attach a reference answer.
    #[must_use]
    pub fn with_ground_truth(mut self, answer: impl Into<String>) -> Self {
        self.ground_truth = Some(answer.into());
        self
    }
}
