use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use super::event::SessionEvent;
use super::message::{Message, MessageDraft};
use super::model::Conversation;
use crate::section::PortfolioSection;

/// Capacity of the store's event channel. Observers that fall further behind
/// than this see `Lagged` and must resynchronize from a snapshot.
const EVENT_CHANNEL_CAPACITY: usize = 64;

struct StoreState {
    /// Conversations in display order (newest first).
    conversations: Vec<Conversation>,
    /// Id of the conversation currently presented, if any.
    active_id: Option<String>,
}

impl StoreState {
    fn conversation_mut(&mut self, conversation_id: &str) -> Option<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|conversation| conversation.id == conversation_id)
    }
}

/// Owns the conversation collection and the active-conversation pointer.
///
/// `SessionStore` is responsible for:
/// - Creating and deleting conversations
/// - Appending messages as atomic state transitions
/// - Tracking which conversation is presented
/// - Notifying observers of every mutation
///
/// All state lives behind a single `RwLock`, and read accessors hand out
/// cloned snapshots, so observers never see a partially-applied mutation.
/// Mutations targeting an unknown conversation id are non-fatal no-ops.
pub struct SessionStore {
    state: Arc<RwLock<StoreState>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// Creates an empty store with no conversations and no active pointer.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(StoreState {
                conversations: Vec::new(),
                active_id: None,
            })),
            events,
        }
    }

    /// Subscribes to store mutations.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        // The store does not depend on anyone listening.
        let _ = self.events.send(event);
    }

    /// Creates a new empty conversation, inserts it at the front of the
    /// display order, and makes it active.
    pub async fn create_conversation(&self) -> Conversation {
        let conversation = Conversation::new();
        let snapshot = conversation.clone();

        {
            let mut state = self.state.write().await;
            state.active_id = Some(conversation.id.clone());
            state.conversations.insert(0, conversation);
        }

        tracing::info!("[SessionStore] Created conversation {}", snapshot.id);
        self.publish(SessionEvent::ConversationCreated {
            conversation_id: snapshot.id.clone(),
        });
        snapshot
    }

    /// Appends a message to the target conversation.
    ///
    /// Generates a fresh message id and timestamp, takes `chips`/`links`
    /// from the draft, and notifies observers of the new tail element.
    ///
    /// # Returns
    ///
    /// The appended message, or `None` (with no state change) when the
    /// conversation does not exist. Callers are expected to have validated
    /// the id via the active-conversation reference.
    pub async fn append_message(
        &self,
        conversation_id: &str,
        draft: MessageDraft,
    ) -> Option<Message> {
        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            role: draft.role,
            text: draft.text,
            chips: draft.chips,
            links: draft.links,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        {
            let mut state = self.state.write().await;
            let Some(conversation) = state.conversation_mut(conversation_id) else {
                tracing::warn!(
                    "[SessionStore] Dropping append for unknown conversation {}",
                    conversation_id
                );
                return None;
            };
            conversation.messages.push(message.clone());
            conversation.updated_at = message.created_at.clone();
        }

        self.publish(SessionEvent::MessageAppended {
            conversation_id: conversation_id.to_string(),
            message: message.clone(),
        });
        Some(message)
    }

    /// Replaces the section filter of the target conversation. Unknown ids
    /// are ignored.
    pub async fn set_section_filter(
        &self,
        conversation_id: &str,
        section: Option<PortfolioSection>,
    ) {
        {
            let mut state = self.state.write().await;
            let Some(conversation) = state.conversation_mut(conversation_id) else {
                tracing::debug!(
                    "[SessionStore] Ignoring section change for unknown conversation {}",
                    conversation_id
                );
                return;
            };
            conversation.active_section = section;
            conversation.updated_at = chrono::Utc::now().to_rfc3339();
        }

        self.publish(SessionEvent::SectionChanged {
            conversation_id: conversation_id.to_string(),
            section,
        });
    }

    /// Renames the target conversation. Unknown ids are ignored.
    pub async fn rename_conversation(&self, conversation_id: &str, title: impl Into<String>) {
        let title = title.into();
        {
            let mut state = self.state.write().await;
            let Some(conversation) = state.conversation_mut(conversation_id) else {
                tracing::debug!(
                    "[SessionStore] Ignoring rename for unknown conversation {}",
                    conversation_id
                );
                return;
            };
            conversation.title = title.clone();
            conversation.updated_at = chrono::Utc::now().to_rfc3339();
        }

        self.publish(SessionEvent::ConversationRenamed {
            conversation_id: conversation_id.to_string(),
            title,
        });
    }

    /// Deletes a conversation. Idempotent: unknown ids are ignored.
    ///
    /// The store is never left empty behind a deletion: removing the last
    /// conversation installs a fresh empty stub which becomes active, and
    /// removing the active conversation otherwise promotes the first
    /// remaining conversation in display order (the most recently created
    /// survivor).
    pub async fn delete_conversation(&self, conversation_id: &str) {
        let mut created_stub = None;
        let mut reassigned_active = None;

        {
            let mut state = self.state.write().await;
            let Some(index) = state
                .conversations
                .iter()
                .position(|conversation| conversation.id == conversation_id)
            else {
                return;
            };
            state.conversations.remove(index);

            if state.conversations.is_empty() {
                let stub = Conversation::new();
                state.active_id = Some(stub.id.clone());
                reassigned_active = Some(Some(stub.id.clone()));
                created_stub = Some(stub.id.clone());
                state.conversations.push(stub);
            } else if state.active_id.as_deref() == Some(conversation_id) {
                let next = state.conversations[0].id.clone();
                state.active_id = Some(next.clone());
                reassigned_active = Some(Some(next));
            }
        }

        tracing::info!("[SessionStore] Deleted conversation {}", conversation_id);
        self.publish(SessionEvent::ConversationDeleted {
            conversation_id: conversation_id.to_string(),
        });
        if let Some(stub_id) = created_stub {
            self.publish(SessionEvent::ConversationCreated {
                conversation_id: stub_id,
            });
        }
        if let Some(active) = reassigned_active {
            self.publish(SessionEvent::ActiveChanged {
                conversation_id: active,
            });
        }
    }

    /// Makes the target conversation active. Unknown ids are ignored.
    pub async fn set_active(&self, conversation_id: &str) {
        {
            let mut state = self.state.write().await;
            if !state
                .conversations
                .iter()
                .any(|conversation| conversation.id == conversation_id)
            {
                tracing::debug!(
                    "[SessionStore] Ignoring activation of unknown conversation {}",
                    conversation_id
                );
                return;
            }
            if state.active_id.as_deref() == Some(conversation_id) {
                return;
            }
            state.active_id = Some(conversation_id.to_string());
        }

        self.publish(SessionEvent::ActiveChanged {
            conversation_id: Some(conversation_id.to_string()),
        });
    }

    /// Returns a snapshot of the target conversation.
    pub async fn conversation(&self, conversation_id: &str) -> Option<Conversation> {
        let state = self.state.read().await;
        state
            .conversations
            .iter()
            .find(|conversation| conversation.id == conversation_id)
            .cloned()
    }

    /// Returns the id of the conversation currently presented.
    pub async fn active_id(&self) -> Option<String> {
        self.state.read().await.active_id.clone()
    }

    /// Returns a snapshot of the conversation currently presented.
    pub async fn active_conversation(&self) -> Option<Conversation> {
        let state = self.state.read().await;
        let active_id = state.active_id.as_deref()?;
        state
            .conversations
            .iter()
            .find(|conversation| conversation.id == active_id)
            .cloned()
    }

    /// Returns a snapshot of all conversations in display order.
    pub async fn conversations(&self) -> Vec<Conversation> {
        self.state.read().await.conversations.clone()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::message::MessageRole;

    #[tokio::test]
    async fn append_preserves_call_order() {
        let store = SessionStore::new();
        let conversation = store.create_conversation().await;

        for text in ["first", "second", "third"] {
            store
                .append_message(&conversation.id, MessageDraft::user(text))
                .await
                .unwrap();
        }

        let snapshot = store.conversation(&conversation.id).await.unwrap();
        let texts: Vec<&str> = snapshot
            .messages
            .iter()
            .map(|message| message.text.as_str())
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn append_to_unknown_conversation_is_a_noop() {
        let store = SessionStore::new();
        let conversation = store.create_conversation().await;

        let appended = store
            .append_message("missing", MessageDraft::user("hello"))
            .await;

        assert!(appended.is_none());
        let snapshot = store.conversation(&conversation.id).await.unwrap();
        assert!(snapshot.messages.is_empty());
    }

    #[tokio::test]
    async fn append_assigns_unique_ids_and_defaults() {
        let store = SessionStore::new();
        let conversation = store.create_conversation().await;

        let first = store
            .append_message(&conversation.id, MessageDraft::user("one"))
            .await
            .unwrap();
        let second = store
            .append_message(&conversation.id, MessageDraft::assistant("two"))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.role, MessageRole::User);
        assert!(first.chips.is_empty());
        assert!(first.links.is_empty());
    }

    #[tokio::test]
    async fn create_makes_new_conversation_active() {
        let store = SessionStore::new();
        let first = store.create_conversation().await;
        assert_eq!(store.active_id().await, Some(first.id.clone()));

        let second = store.create_conversation().await;
        assert_eq!(store.active_id().await, Some(second.id.clone()));

        // Newest first in display order.
        let ids: Vec<String> = store
            .conversations()
            .await
            .into_iter()
            .map(|conversation| conversation.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn deleting_sole_conversation_leaves_exactly_one_stub() {
        let store = SessionStore::new();
        let conversation = store.create_conversation().await;
        store
            .append_message(&conversation.id, MessageDraft::user("hi"))
            .await
            .unwrap();

        store.delete_conversation(&conversation.id).await;

        let remaining = store.conversations().await;
        assert_eq!(remaining.len(), 1);
        let stub = &remaining[0];
        assert_ne!(stub.id, conversation.id);
        assert!(stub.messages.is_empty());
        assert!(stub.active_section.is_none());
        assert_eq!(store.active_id().await, Some(stub.id.clone()));
    }

    #[tokio::test]
    async fn deleting_active_conversation_promotes_first_remaining() {
        let store = SessionStore::new();
        let oldest = store.create_conversation().await;
        let middle = store.create_conversation().await;
        let newest = store.create_conversation().await;

        store.set_active(&middle.id).await;
        store.delete_conversation(&middle.id).await;

        // First remaining in display order is the newest survivor.
        assert_eq!(store.active_id().await, Some(newest.id.clone()));
        assert!(store.conversation(&oldest.id).await.is_some());
    }

    #[tokio::test]
    async fn deleting_inactive_conversation_keeps_active_pointer() {
        let store = SessionStore::new();
        let first = store.create_conversation().await;
        let second = store.create_conversation().await;

        store.delete_conversation(&first.id).await;

        assert_eq!(store.active_id().await, Some(second.id));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = SessionStore::new();
        let conversation = store.create_conversation().await;

        store.delete_conversation("missing").await;
        assert_eq!(store.conversations().await.len(), 1);
        assert_eq!(store.active_id().await, Some(conversation.id));
    }

    #[tokio::test]
    async fn set_active_ignores_unknown_ids() {
        let store = SessionStore::new();
        let conversation = store.create_conversation().await;

        store.set_active("missing").await;

        assert_eq!(store.active_id().await, Some(conversation.id));
    }

    #[tokio::test]
    async fn section_filter_can_be_set_and_cleared() {
        let store = SessionStore::new();
        let conversation = store.create_conversation().await;

        store
            .set_section_filter(&conversation.id, Some(PortfolioSection::Projects))
            .await;
        assert_eq!(
            store.conversation(&conversation.id).await.unwrap().active_section,
            Some(PortfolioSection::Projects)
        );

        store.set_section_filter(&conversation.id, None).await;
        assert_eq!(
            store.conversation(&conversation.id).await.unwrap().active_section,
            None
        );
    }

    #[tokio::test]
    async fn append_notifies_subscribers_of_new_tail() {
        let store = SessionStore::new();
        let conversation = store.create_conversation().await;
        let mut events = store.subscribe();

        store
            .append_message(&conversation.id, MessageDraft::user("ping"))
            .await
            .unwrap();

        let event = events.recv().await.unwrap();
        match event {
            SessionEvent::MessageAppended {
                conversation_id,
                message,
            } => {
                assert_eq!(conversation_id, conversation.id);
                assert_eq!(message.text, "ping");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rename_updates_title() {
        let store = SessionStore::new();
        let conversation = store.create_conversation().await;
        assert_eq!(conversation.title, crate::session::DEFAULT_CONVERSATION_TITLE);

        store
            .rename_conversation(&conversation.id, "Tech stack questions")
            .await;

        assert_eq!(
            store.conversation(&conversation.id).await.unwrap().title,
            "Tech stack questions"
        );
    }
}
