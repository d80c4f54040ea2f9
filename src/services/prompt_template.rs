//! Prompt templates for the model roles.
//!
//! Templates are plain markdown with `<name>` placeholders. Built-in
//! templates ship with the crate; a template directory may override any of
//! them with a `<role>_template.md` file.

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([a-z_]+)>").expect("placeholder pattern is valid"));

/// Model role a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptRole {
    Swift,
    Feedback,
    Sage,
    Choice,
}

impl PromptRole {
    pub const ALL: [Self; 4] = [Self::Swift, Self::Feedback, Self::Sage, Self::Choice];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Swift => "swift",
            Self::Feedback => "feedback",
            Self::Sage => "sage",
            Self::Choice => "choice",
        }
    }

    /// Override file name inside a template directory.
    pub fn file_name(&self) -> String {
        format!("{}_template.md", self.as_str())
    }

    fn builtin(&self) -> &'static str {
        match self {
            Self::Swift => include_str!("../../prompts/swift_template.md"),
            Self::Feedback => include_str!("../../prompts/feedback_template.md"),
            Self::Sage => include_str!("../../prompts/sage_template.md"),
            Self::Choice => include_str!("../../prompts/choice_template.md"),
        }
    }
}

/// Loaded templates for every role.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    templates: HashMap<PromptRole, String>,
}

impl PromptTemplates {
    /// Templates bundled with the crate.
    pub fn builtin() -> Self {
        let templates = PromptRole::ALL
            .iter()
            .map(|role| (*role, role.builtin().to_string()))
            .collect();
        Self { templates }
    }

    /// Built-in templates overridden by any `<role>_template.md` in `dir`.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            anyhow::bail!("Template directory not found: {}", dir.display());
        }

        let mut templates = Self::builtin();
        for role in PromptRole::ALL {
            let path = dir.join(role.file_name());
            if !path.exists() {
                debug!(role = role.as_str(), "Using built-in template");
                continue;
            }

            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template file: {}", path.display()))?;
            info!(role = role.as_str(), path = %path.display(), "Loaded template override");
            templates.templates.insert(role, content);
        }

        Ok(templates)
    }

    /// Load from an optional directory, falling back to the built-ins.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::load_dir(dir),
            None => Ok(Self::builtin()),
        }
    }

    /// Replace a single template.
    pub fn with_template(mut self, role: PromptRole, template: impl Into<String>) -> Self {
        self.templates.insert(role, template.into());
        self
    }

    pub fn get(&self, role: PromptRole) -> &str {
        self.templates.get(&role).map_or("", String::as_str)
    }

    /// Render the template for `role`, replacing every `<name>` with its value.
    ///
    /// Substitution is a single pass, so values are never rescanned.
    /// Placeholders without a value are left as they are.
    pub fn format(&self, role: PromptRole, vars: &[(&str, &str)]) -> String {
        PLACEHOLDER
            .replace_all(self.get(role), |caps: &Captures<'_>| {
                vars.iter()
                    .find(|(name, _)| *name == &caps[1])
                    .map_or_else(|| caps[0].to_string(), |(_, value)| (*value).to_string())
            })
            .into_owned()
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::builtin()
    }
}
