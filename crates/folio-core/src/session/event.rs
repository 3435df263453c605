use serde::{Deserialize, Serialize};

use super::message::Message;
use crate::section::PortfolioSection;

/// State transitions published by the session store.
///
/// Events are delivered over a broadcast channel. A receiver that lags
/// behind should resynchronize from a store snapshot rather than replaying
/// what it missed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A conversation was created and made active.
    ConversationCreated { conversation_id: String },
    /// A message was appended to a conversation's tail.
    MessageAppended {
        conversation_id: String,
        message: Message,
    },
    /// A conversation's section filter was replaced.
    SectionChanged {
        conversation_id: String,
        section: Option<PortfolioSection>,
    },
    /// A conversation was renamed.
    ConversationRenamed {
        conversation_id: String,
        title: String,
    },
    /// A conversation was removed.
    ConversationDeleted { conversation_id: String },
    /// The active-conversation pointer moved.
    ActiveChanged { conversation_id: Option<String> },
}
