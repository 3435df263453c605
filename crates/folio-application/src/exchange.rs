//! The optimistic send-and-reconcile exchange protocol.

use std::sync::Arc;

use folio_core::section::PortfolioSection;
use folio_core::session::{MessageDraft, SessionStore};
use folio_interaction::{AnswerProvider, AnswerRequest};

/// Sentinel chip attached to synthesized failure messages.
pub const ERROR_CHIP: &str = "Error";

/// Drives one question/answer exchange per submission.
///
/// `ExchangeCoordinator` is responsible for:
/// - Rejecting blank queries and unknown conversation ids
/// - Appending the user message before any network interaction
/// - Calling the answering service exactly once per submission
/// - Reconciling the outcome into the originally targeted conversation
///
/// Submissions against different conversations can be in flight
/// concurrently; each mutates only its own conversation's message sequence.
pub struct ExchangeCoordinator {
    /// Owned session state; every mutation goes through its operation set.
    store: Arc<SessionStore>,
    /// Boundary to the remote answering service.
    provider: Arc<dyn AnswerProvider>,
}

impl ExchangeCoordinator {
    /// Creates a coordinator over the given store and provider.
    pub fn new(store: Arc<SessionStore>, provider: Arc<dyn AnswerProvider>) -> Self {
        Self { store, provider }
    }

    /// Submits a query against a conversation.
    ///
    /// The user message is appended before the remote call, so it is visible
    /// without waiting on the service. Exactly one terminal append follows:
    /// the service's answer on success, or a synthesized error message
    /// tagged with [`ERROR_CHIP`] on failure. Blank queries and unknown
    /// conversation ids are dropped without any state change.
    ///
    /// Reconciliation is keyed to the conversation id captured here.
    /// Deleting the conversation or moving focus mid-flight does not
    /// redirect the append; a deleted target degrades to the store's no-op.
    pub async fn submit(
        &self,
        conversation_id: &str,
        query: &str,
        section_override: Option<PortfolioSection>,
    ) {
        let question = query.trim();
        if question.is_empty() {
            tracing::debug!("[ExchangeCoordinator] Dropping blank query");
            return;
        }

        let Some(conversation) = self.store.conversation(conversation_id).await else {
            tracing::debug!(
                "[ExchangeCoordinator] Dropping query for unknown conversation {}",
                conversation_id
            );
            return;
        };
        let section = section_override.or(conversation.active_section);

        // Optimistic append: the question is visible before the remote call.
        self.store
            .append_message(conversation_id, MessageDraft::user(question))
            .await;

        let request = AnswerRequest {
            question: question.to_string(),
            section,
            conversation_id: conversation_id.to_string(),
        };

        let reply = match self.provider.answer(request).await {
            Ok(response) => {
                tracing::info!(
                    "[ExchangeCoordinator] Answer received for conversation {}",
                    conversation_id
                );
                MessageDraft::assistant(response.answer)
                    .with_chips(response.chips)
                    .with_links(response.links)
            }
            Err(error) => {
                tracing::warn!(
                    "[ExchangeCoordinator] Answering service failed for conversation {}: {}",
                    conversation_id,
                    error
                );
                MessageDraft::assistant(format!(
                    "Sorry, I couldn't get an answer right now ({error}). Please try again."
                ))
                .with_chips(vec![ERROR_CHIP.to_string()])
            }
        };

        self.store.append_message(conversation_id, reply).await;
    }

    /// Submits a query against the active conversation.
    pub async fn submit_to_active(&self, query: &str, section_override: Option<PortfolioSection>) {
        let Some(conversation_id) = self.store.active_id().await else {
            tracing::debug!("[ExchangeCoordinator] No active conversation, dropping query");
            return;
        };
        self.submit(&conversation_id, query, section_override).await;
    }
}
