//! Typing-state derivation.
//!
//! The "assistant is responding" flag is a pure function of the active
//! conversation's trailing message, combined with a bounded auto-clear so a
//! stalled remote call cannot pin the indicator forever.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, watch};
use tokio_util::sync::CancellationToken;

use super::message::MessageRole;
use super::model::Conversation;
use super::store::SessionStore;

/// How long the pending flag may stay set without a reply arriving.
pub const TYPING_CLEAR_TIMEOUT: Duration = Duration::from_secs(5);

/// Returns true when the conversation's trailing message is user-authored,
/// i.e. a query was optimistically appended and no reply has landed yet.
pub fn awaiting_reply(conversation: &Conversation) -> bool {
    matches!(
        conversation.last_message(),
        Some(message) if message.role == MessageRole::User
    )
}

/// Publishes the derived pending flag for one conversation view.
///
/// Every [`refresh`](Self::refresh) recomputes the flag from the
/// conversation's tail and restarts the auto-clear timer, so at most one
/// timer is live per indicator at any moment.
pub struct TypingIndicator {
    flag: watch::Sender<bool>,
    timeout: Duration,
    /// Token of the currently armed auto-clear timer, if any.
    clear_timer: Mutex<Option<CancellationToken>>,
}

impl TypingIndicator {
    /// Creates an indicator with the default auto-clear timeout.
    pub fn new() -> Self {
        Self::with_timeout(TYPING_CLEAR_TIMEOUT)
    }

    /// Creates an indicator with a custom auto-clear timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            flag,
            timeout,
            clear_timer: Mutex::new(None),
        }
    }

    /// Current value of the pending flag.
    pub fn is_pending(&self) -> bool {
        *self.flag.borrow()
    }

    /// Subscribes to flag changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.flag.subscribe()
    }

    /// Re-derives the flag from the conversation's trailing message.
    ///
    /// Cancels the previously armed timer. When the flag comes out set, a
    /// new timer is armed that clears it after the timeout unless another
    /// refresh happens first.
    pub async fn refresh(self: &Arc<Self>, conversation: &Conversation) {
        self.apply(awaiting_reply(conversation)).await;
    }

    /// Clears the flag and cancels any armed timer. Used when there is no
    /// active conversation to derive from.
    pub async fn reset(&self) {
        if let Some(previous) = self.clear_timer.lock().await.take() {
            previous.cancel();
        }
        self.flag.send_replace(false);
    }

    async fn apply(self: &Arc<Self>, pending: bool) {
        let token = CancellationToken::new();
        if let Some(previous) = self.clear_timer.lock().await.replace(token.clone()) {
            previous.cancel();
        }

        self.flag.send_replace(pending);
        if !pending {
            return;
        }

        let indicator = Arc::clone(self);
        let timeout = self.timeout;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    tracing::debug!("[TypingIndicator] Auto-clearing stale pending flag");
                    indicator.flag.send_replace(false);
                }
            }
        });
    }
}

impl Default for TypingIndicator {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns a background task that keeps an indicator in sync with the
/// store's active conversation.
///
/// The flag is re-derived on every store event. Lagged receivers recover by
/// re-deriving from the current snapshot; the task exits once the store is
/// dropped and its event channel closes.
pub fn watch_session(
    store: Arc<SessionStore>,
    indicator: Arc<TypingIndicator>,
) -> tokio::task::JoinHandle<()> {
    let mut events = store.subscribe();
    // Hold the store weakly so this task does not keep its event channel
    // open after the owner drops it.
    let store = Arc::downgrade(&store);
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "[TypingIndicator] Skipped {} session events, resyncing from snapshot",
                        skipped
                    );
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }

            let Some(store) = store.upgrade() else { break };
            match store.active_conversation().await {
                Some(conversation) => indicator.refresh(&conversation).await,
                None => indicator.reset().await,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::message::MessageDraft;

    async fn conversation_with_tail(store: &SessionStore, drafts: Vec<MessageDraft>) -> Conversation {
        let conversation = store.create_conversation().await;
        for draft in drafts {
            store.append_message(&conversation.id, draft).await.unwrap();
        }
        store.conversation(&conversation.id).await.unwrap()
    }

    #[tokio::test]
    async fn awaiting_reply_follows_trailing_role() {
        let store = SessionStore::new();

        let empty = conversation_with_tail(&store, vec![]).await;
        assert!(!awaiting_reply(&empty));

        let pending =
            conversation_with_tail(&store, vec![MessageDraft::user("anyone there?")]).await;
        assert!(awaiting_reply(&pending));

        let answered = conversation_with_tail(
            &store,
            vec![MessageDraft::user("hello"), MessageDraft::assistant("hi!")],
        )
        .await;
        assert!(!awaiting_reply(&answered));
    }

    #[tokio::test(start_paused = true)]
    async fn flag_auto_clears_after_timeout() {
        let store = SessionStore::new();
        let conversation =
            conversation_with_tail(&store, vec![MessageDraft::user("still there?")]).await;

        let indicator = Arc::new(TypingIndicator::with_timeout(Duration::from_millis(100)));
        indicator.refresh(&conversation).await;
        assert!(indicator.is_pending());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!indicator.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_restarts_the_timer() {
        let store = SessionStore::new();
        let conversation =
            conversation_with_tail(&store, vec![MessageDraft::user("first")]).await;

        let indicator = Arc::new(TypingIndicator::with_timeout(Duration::from_millis(100)));
        indicator.refresh(&conversation).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(indicator.is_pending());

        // A second message arrived; the clock starts over.
        store
            .append_message(&conversation.id, MessageDraft::user("second"))
            .await
            .unwrap();
        let refreshed = store.conversation(&conversation.id).await.unwrap();
        indicator.refresh(&refreshed).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(indicator.is_pending());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!indicator.is_pending());
    }

    #[tokio::test]
    async fn refresh_clears_immediately_on_assistant_tail() {
        let store = SessionStore::new();
        let conversation =
            conversation_with_tail(&store, vec![MessageDraft::user("ping")]).await;

        let indicator = Arc::new(TypingIndicator::new());
        indicator.refresh(&conversation).await;
        assert!(indicator.is_pending());

        store
            .append_message(&conversation.id, MessageDraft::assistant("pong"))
            .await
            .unwrap();
        let answered = store.conversation(&conversation.id).await.unwrap();
        indicator.refresh(&answered).await;
        assert!(!indicator.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn watcher_tracks_store_events() {
        let store = Arc::new(SessionStore::new());
        let indicator = Arc::new(TypingIndicator::new());
        let _watcher = watch_session(Arc::clone(&store), Arc::clone(&indicator));
        let mut flag = indicator.subscribe();

        let conversation = store.create_conversation().await;
        store
            .append_message(&conversation.id, MessageDraft::user("hello?"))
            .await
            .unwrap();
        flag.wait_for(|pending| *pending).await.unwrap();

        store
            .append_message(&conversation.id, MessageDraft::assistant("hello!"))
            .await
            .unwrap();
        flag.wait_for(|pending| !*pending).await.unwrap();
    }
}
