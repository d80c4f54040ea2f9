//! Candidate domain model.
//!
//! A candidate is one plan+code generation attempt together with the
//! result of running its code.

use serde::{Deserialize, Serialize};

use super::sandbox::SandboxResult;

/// Plan text used when a generation carries no plan.
pub const NO_PLAN: &str = "No plan provided in the response.";

/// Code report used when a generation carries no code.
pub const NO_CODE: &str = "No code provided in the response.";

/// One generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Natural-language plan
    pub plan: String,

    /// Generated program, if any
    pub code: Option<String>,

    /// Execution status text, or an explanation of why nothing ran
    pub code_report: String,

    /// Program answer; absent when code is missing or execution failed
    pub solution: Option<String>,
}

impl Candidate {
    /// A generation that carried no code. It never has a solution.
    pub fn without_code(plan: Option<String>) -> Self {
        Self {
            plan: plan.unwrap_or_else(|| NO_PLAN.to_string()),
            code: None,
            code_report: NO_CODE.to_string(),
            solution: None,
        }
    }

    /// Build a candidate from the sandbox run of its code.
    pub fn from_execution(plan: Option<String>, code: String, result: SandboxResult) -> Self {
        let plan = plan.unwrap_or_else(|| NO_PLAN.to_string());
        if result.is_done() {
            Self {
                plan,
                code: Some(code),
                code_report: result.status.report(),
                solution: Some(result.value),
            }
        } else {
            Self {
                plan,
                code: Some(code),
                code_report: format!(
                    "Code execution failed. The error message is: \n{}",
                    result.status
                ),
                solution: None,
            }
        }
    }

    pub fn has_solution(&self) -> bool {
        self.solution.is_some()
    }

    /// Code text for display, with a placeholder when none was generated.
    pub fn code_or_placeholder(&self) -> &str {
        self.code.as_deref().unwrap_or(NO_CODE)
    }

    /// The plan followed by the generated program in a fenced block.
    pub fn reasoning(&self) -> String {
        format!(
            "{}\nThe generated code is:\n```python\n{}\n```",
            self.plan,
            self.code_or_placeholder()
        )
    }
}
