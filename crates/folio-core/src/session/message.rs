//! Conversation message types.

use serde::{Deserialize, Serialize};

/// Author of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Message typed by the visitor.
    User,
    /// Answer from the assistant, including synthesized failure notices.
    Assistant,
}

/// A reference attached to an assistant answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub label: String,
}

/// A single entry in a conversation.
///
/// Messages are created by the session store at append time and never
/// mutated afterwards; corrections are modeled as new messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID format); never reused.
    pub id: String,
    /// The role of the message author.
    pub role: MessageRole,
    /// Display text. Non-empty for user messages.
    pub text: String,
    /// Informational tags attached to an assistant answer.
    #[serde(default)]
    pub chips: Vec<String>,
    /// References attached to an assistant answer.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Timestamp when the message was created (RFC 3339).
    pub created_at: String,
}

/// The caller-supplied part of a message, before the store assigns an id and
/// a timestamp. `chips` and `links` default to empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub role: MessageRole,
    pub text: String,
    pub chips: Vec<String>,
    pub links: Vec<Link>,
}

impl MessageDraft {
    /// Creates a user-authored draft.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
            chips: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Creates an assistant-authored draft.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
            chips: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Attaches informational tags.
    pub fn with_chips(mut self, chips: Vec<String>) -> Self {
        self.chips = chips;
        self
    }

    /// Attaches reference links.
    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        self.links = links;
        self
    }
}
