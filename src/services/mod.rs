//! Reasoning services: markup parsing, voting, prompt rendering, the four
//! model roles and the orchestrator that drives them.

pub mod choice_agent;
pub mod feedback_agent;
pub mod markup;
pub mod prompt_template;
pub mod role_client;
pub mod sage_agent;
pub mod swift_agent;
pub mod swiftsage;
pub mod voting;

pub use choice_agent::{ChoiceAgent, ChoiceSelection};
pub use feedback_agent::{Evaluation, FeedbackAgent};
pub use markup::{extract_markup, parse_score, Markup};
pub use prompt_template::{PromptRole, PromptTemplates};
pub use sage_agent::{SageAgent, Verdict};
pub use swift_agent::{SwiftAgent, SwiftBatch};
pub use swiftsage::{
    ChoiceOutcome, EscalationReason, SolveOutcome, SwiftSage, Termination,
};
pub use voting::{majority_vote, normalize_answer, Vote};
