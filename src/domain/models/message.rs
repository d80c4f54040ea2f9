//! Chat message models shared by every completion backend.

use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: ChatRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// How a backend treats a trailing partial assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefillMode {
    /// Backend cannot continue an assistant prefix
    Unsupported,

    /// Backend returns only the continuation after the prefix
    Continuation,

    /// Backend echoes the prefix at the start of its output
    Echo,
}

impl PrefillMode {
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Build the request messages for a role prompt.
///
/// An empty system message is followed by the user prompt, plus the
/// assistant prefix when the backend can continue it.
pub fn role_messages(prompt: &str, prefix: &str, prefill: PrefillMode) -> Vec<Message> {
    let mut messages = vec![Message::system(""), Message::user(prompt)];
    if prefill.is_supported() {
        messages.push(Message::assistant(prefix));
    }
    messages
}

/// Normalize a completion produced with an assistant prefix.
///
/// Backends disagree on whether the prefix is echoed back, so the text is
/// inspected rather than trusted: the prefix is prepended only when the
/// completion does not already start with it.
pub fn normalize_prefill(prefix: &str, completion: &str) -> String {
    if completion.trim_start().starts_with(prefix) {
        completion.to_string()
    } else {
        format!("{prefix}{completion}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_messages_with_prefill() {
        let messages = role_messages("solve it", "<plan>", PrefillMode::Continuation);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], Message::system(""));
        assert_eq!(messages[1], Message::user("solve it"));
        assert_eq!(messages[2], Message::assistant("<plan>"));
    }

    #[test]
    fn test_role_messages_without_prefill() {
        let messages = role_messages("solve it", "<plan>", PrefillMode::Unsupported);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_normalize_continuation() {
        assert_eq!(normalize_prefill("<plan>", "x</plan>"), "<plan>x</plan>");
    }

    #[test]
    fn test_normalize_echo() {
        assert_eq!(
            normalize_prefill("<plan>", "<plan>x</plan>"),
            "<plan>x</plan>"
        );
        assert_eq!(
            normalize_prefill("<plan>", "\n<plan>x</plan>"),
            "\n<plan>x</plan>"
        );
    }
}
