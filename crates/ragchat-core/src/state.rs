//! UI-agnostic transcript types
//!
//! These are shared by every front end and don't depend on any specific UI
//! framework.

use serde::{Deserialize, Serialize};

/// Who authored a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Ai,
}

impl Role {
    /// CSS class the server uses for this role's block
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Human => "human",
            Role::Ai => "ai",
        }
    }

    /// Role for a turn block's CSS class
    pub fn from_class(s: &str) -> Option<Self> {
        match s {
            "human" => Some(Role::Human),
            "ai" => Some(Role::Ai),
            _ => None,
        }
    }
}

/// A single transcript turn. `text` may contain HTML markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub role: Role,
    pub elapsed_seconds: Option<f64>,
}

impl Message {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::Human,
            elapsed_seconds: None,
        }
    }

    pub fn ai(text: impl Into<String>, elapsed_seconds: f64) -> Self {
        Self {
            text: text.into(),
            role: Role::Ai,
            elapsed_seconds: Some(elapsed_seconds),
        }
    }

    /// Elapsed time as shown under an answer, e.g. `12.3 seconds`
    pub fn elapsed_label(&self) -> Option<String> {
        match self.role {
            Role::Ai => {
                // Ties round away from zero, so 0.25 shows as 0.3
                let elapsed = self.elapsed_seconds.unwrap_or(0.0);
                Some(format!("{:.1} seconds", (elapsed * 10.0).round() / 10.0))
            }
            Role::Human => None,
        }
    }
}

/// Ordered, append-only list of rendered turns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_label_rounds_to_one_decimal() {
        assert_eq!(Message::ai("x", 12.345).elapsed_label().as_deref(), Some("12.3 seconds"));
        assert_eq!(Message::ai("x", 0.0).elapsed_label().as_deref(), Some("0.0 seconds"));
        assert_eq!(Message::ai("x", 0.25).elapsed_label().as_deref(), Some("0.3 seconds"));
        assert_eq!(Message::ai("x", 1.25).elapsed_label().as_deref(), Some("1.3 seconds"));
        assert_eq!(Message::human("x").elapsed_label(), None);
    }

    #[test]
    fn test_role_class_names() {
        assert_eq!(Role::from_class(Role::Human.as_str()), Some(Role::Human));
        assert_eq!(Role::from_class("ai"), Some(Role::Ai));
        assert_eq!(Role::from_class("dots"), None);
    }

    #[test]
    fn test_transcript_appends_in_order() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());
        transcript.push(Message::human("q"));
        transcript.push(Message::ai("a", 1.0));
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].role, Role::Human);
        assert_eq!(transcript.last().map(|m| m.role), Some(Role::Ai));
    }
}
