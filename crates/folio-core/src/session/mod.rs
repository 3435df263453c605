//! Session domain module.
//!
//! This module contains the conversation/message model, the session store,
//! store events, and the typing-state derivation.
//!
//! # Module Structure
//!
//! - `message`: Message types (`MessageRole`, `Message`, `MessageDraft`, `Link`)
//! - `model`: Conversation entity (`Conversation`)
//! - `event`: Store mutation events (`SessionEvent`)
//! - `store`: Owned session state (`SessionStore`)
//! - `typing`: Derived "assistant is responding" flag (`TypingIndicator`)

mod event;
mod message;
mod model;
mod store;
mod typing;

// Re-export public API
pub use event::SessionEvent;
pub use message::{Link, Message, MessageDraft, MessageRole};
pub use model::{Conversation, DEFAULT_CONVERSATION_TITLE};
pub use store::SessionStore;
pub use typing::{TYPING_CLEAR_TIMEOUT, TypingIndicator, awaiting_reply, watch_session};
