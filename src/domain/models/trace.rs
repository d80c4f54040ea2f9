//! Solve trace domain models.
//!
//! The trace is an ordered mapping from step label (`Swift 1`, `Feedback 1`,
//! `Sage`) to what happened at that step. A parallel raw trace keeps the
//! verbatim model input and output text for the same labels. Both are built
//! by the orchestrator and handed to the caller when `solve` returns.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::candidate::Candidate;

/// Label of the Swift step for a 1-indexed iteration.
pub fn swift_label(iteration: u32) -> String {
    format!("Swift {iteration}")
}

/// Label of the Feedback step for a 1-indexed iteration.
pub fn feedback_label(iteration: u32) -> String {
    format!("Feedback {iteration}")
}

/// Label of the single fallback step.
pub const SAGE_LABEL: &str = "Sage";

/// Raw-trace label of the multiple-choice mapping step.
pub const CHOICE_LABEL: &str = "Choice";

/// Insertion-ordered label → value mapping.
///
/// Re-inserting an existing label replaces the value in place and keeps
/// its position, so the log reads in the order steps first happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLog<T> {
    entries: Vec<(String, T)>,
}

impl<T> StepLog<T> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, label: impl Into<String>, value: T) {
        let label = label.into();
        if let Some(slot) = self.entries.iter_mut().find(|(l, _)| *l == label) {
            slot.1 = value;
        } else {
            self.entries.push((label, value));
        }
    }

    pub fn get(&self, label: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for StepLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<(String, T)>> for StepLog<T> {
    fn from(entries: Vec<(String, T)>) -> Self {
        let mut log = Self::new();
        for (label, value) in entries {
            log.insert(label, value);
        }
        log
    }
}

// Serialized as a JSON object whose keys keep insertion order.
impl<T: Serialize> Serialize for StepLog<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Structured record of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TraceRecord {
    /// The candidate chosen (or reported) by a Swift iteration
    Swift {
        #[serde(flatten)]
        candidate: Candidate,

        /// Number of candidates generated in the batch
        generated: usize,

        /// Number of candidates that produced a solution
        with_solution: usize,

        /// Votes received by the chosen solution
        votes: usize,

        recorded_at: DateTime<Utc>,
    },

    /// The score and critique for an iteration
    Feedback {
        score: i64,
        feedback: String,
        recorded_at: DateTime<Utc>,
    },

    /// The fallback verdict
    Sage {
        solved: bool,
        feedback: Option<String>,
        plan: Option<String>,
        code: Option<String>,
        code_report: Option<String>,
        solution: String,
        recorded_at: DateTime<Utc>,
    },
}

impl TraceRecord {
    pub fn feedback(score: i64, feedback: impl Into<String>) -> Self {
        Self::Feedback {
            score,
            feedback: feedback.into(),
            recorded_at: Utc::now(),
        }
    }

    /// Score carried by a feedback record.
    pub fn score(&self) -> Option<i64> {
        match self {
            Self::Feedback { score, .. } => Some(*score),
            _ => None,
        }
    }
}

/// Verbatim text exchanged with a model at one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExchange {
    /// Prompt text sent as the user message
    pub model_input: String,

    /// Completion texts, one per requested sample
    pub model_output: Vec<String>,
}

/// Structured per-step trace.
pub type Trace = StepLog<TraceRecord>;

/// Verbatim per-step trace.
pub type RawTrace = StepLog<RawExchange>;
