//! Conversation domain model.

use serde::{Deserialize, Serialize};

use super::message::Message;
use crate::section::PortfolioSection;

/// Title given to a conversation until it is renamed.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New chat";

/// An ordered container of messages plus a section filter.
///
/// A conversation contains:
/// - Messages in insertion order; insertion order is display order
/// - An optional portfolio section scoping queries in this conversation
/// - A user-editable title
/// - Timestamps for creation and last update
///
/// `messages` is append-only from the outside. The session store is the only
/// owner permitted to grow it, and read accessors hand out whole-value
/// snapshots, so observers never see a partially-appended state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier (UUID format).
    pub id: String,
    /// Human-readable conversation title.
    pub title: String,
    /// Messages in append order.
    pub messages: Vec<Message>,
    /// Section filter applied to queries, if any.
    pub active_section: Option<PortfolioSection>,
    /// Timestamp when the conversation was created (RFC 3339).
    pub created_at: String,
    /// Timestamp when the conversation was last updated (RFC 3339).
    pub updated_at: String,
}

impl Conversation {
    /// Creates an empty conversation with a fresh id and no section filter.
    pub(crate) fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: DEFAULT_CONVERSATION_TITLE.to_string(),
            messages: Vec::new(),
            active_section: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Returns the trailing message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
