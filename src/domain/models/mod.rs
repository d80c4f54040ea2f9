//! Domain models for the reasoning loop.

pub mod candidate;
pub mod config;
pub mod message;
pub mod problem;
pub mod sandbox;
pub mod state;
pub mod trace;

pub use candidate::Candidate;
pub use config::{
    Config, LoggingConfig, PromptsConfig, ProviderKind, RoleConfig, RolesConfig, SandboxConfig,
    SolverConfig,
};
pub use message::{normalize_prefill, role_messages, ChatRole, Message, PrefillMode};
pub use problem::Problem;
pub use sandbox::{AnswerMode, ExecStatus, SandboxResult, STATUS_DONE, STATUS_TIMEOUT};
pub use state::{ReasoningState, NO_FEEDBACK, NO_REASONING, NO_SOLUTION};
pub use trace::{
    feedback_label, swift_label, RawExchange, RawTrace, StepLog, Trace, TraceRecord, CHOICE_LABEL,
    SAGE_LABEL,
};
