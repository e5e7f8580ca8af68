//! The retrieval-augmented query pipeline.

use std::sync::Arc;
use std::time::Instant;

use lexrag_core::conversation::{Conversation, ConversationId, Message, MessageMetadata};
use lexrag_core::error::Error;
use lexrag_core::generation::GenerationClient;
use lexrag_core::query::{QueryRequest, QueryResponse};
use lexrag_core::store::ConversationStore;
use lexrag_core::Result;
use lexrag_index::ArticleIndex;
use tracing::{debug, error, info};

use crate::composer::PromptComposer;

/// Longest accepted query, in characters.
pub const MAX_QUERY_CHARS: usize = 1000;

/// New conversations take their title from the first characters of the
/// opening query.
pub const TITLE_MAX_CHARS: usize = 100;

/// Confidence reported when at least one article grounded the answer.
pub const CONFIDENCE_GROUNDED: f32 = 0.85;

/// Confidence reported when the answer had no retrieved context.
pub const CONFIDENCE_UNGROUNDED: f32 = 0.5;

/// Drives a user query end to end: conversation resolution, persistence,
/// retrieval, prompt composition, generation, and citation metadata.
pub struct QueryOrchestrator {
    store: Arc<dyn ConversationStore>,
    index: Arc<ArticleIndex>,
    generation: Arc<dyn GenerationClient>,
    composer: PromptComposer,
    top_k: usize,
    max_query_chars: usize,
    confidence_grounded: f32,
    confidence_ungrounded: f32,
}

impl QueryOrchestrator {
    /// Create a new orchestrator with default retrieval depth and
    /// confidence constants.
    pub fn new(
        store: Arc<dyn ConversationStore>,
        index: Arc<ArticleIndex>,
        generation: Arc<dyn GenerationClient>,
    ) -> Self {
        Self {
            store,
            index,
            generation,
            composer: PromptComposer::new(),
            top_k: lexrag_index::DEFAULT_TOP_K,
            max_query_chars: MAX_QUERY_CHARS,
            confidence_grounded: CONFIDENCE_GROUNDED,
            confidence_ungrounded: CONFIDENCE_UNGROUNDED,
        }
    }

    /// Set how many articles are retrieved per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the longest accepted query, in characters.
    pub fn with_max_query_chars(mut self, max_query_chars: usize) -> Self {
        self.max_query_chars = max_query_chars;
        self
    }

    /// Override the grounded/ungrounded confidence constants.
    pub fn with_confidence(mut self, grounded: f32, ungrounded: f32) -> Self {
        self.confidence_grounded = grounded;
        self.confidence_ungrounded = ungrounded;
        self
    }

    /// Replace the prompt composer.
    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    /// Process one user query and return the grounded answer.
    ///
    /// The user message is persisted before retrieval and generation run,
    /// so a downstream failure never loses the user's turn. The assistant
    /// message is only written once generation succeeds.
    pub async fn process_query(
        &self,
        owner_id: &str,
        request: QueryRequest,
    ) -> Result<QueryResponse> {
        let started = Instant::now();

        // Rejected queries must leave no trace in the store.
        if request.query.trim().is_empty() {
            debug!("rejected blank query");
            return Err(Error::Validation("query must not be empty".into()));
        }
        if request.query.chars().count() > self.max_query_chars {
            debug!(
                chars = request.query.chars().count(),
                "rejected over-length query"
            );
            return Err(Error::Validation(format!(
                "query must not exceed {} characters",
                self.max_query_chars
            )));
        }

        // Resolve the conversation this turn belongs to. Archived
        // conversations still accept follow-ups by direct id.
        let conversation = match request.conversation_id {
            Some(id) => self
                .store
                .find_by_id_and_owner(id, owner_id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("conversation {id} not found")))?,
            None => {
                let title: String = request.query.chars().take(TITLE_MAX_CHARS).collect();
                self.store.create_conversation(owner_id, &title).await?
            }
        };

        let user_message = Message::user(conversation.id, &request.query);
        self.store.create_message(&user_message).await?;

        let cited = self.index.retrieve(&request.query, self.top_k);
        debug!(
            conversation_id = %conversation.id,
            hits = cited.len(),
            "Retrieved context articles"
        );

        let prompt = self.composer.compose(&request.query, &cited);
        let answer = match self.generation.generate_response(&prompt).await {
            Ok(answer) => answer,
            // The user turn is already durable; only the assistant turn is lost
            Err(e) => {
                error!(conversation_id = %conversation.id, error = %e, "Generation failed");
                return Err(e.into());
            }
        };

        let confidence = if cited.is_empty() {
            self.confidence_ungrounded
        } else {
            self.confidence_grounded
        };
        let processing_ms = started.elapsed().as_millis() as u64;

        let metadata = MessageMetadata {
            cited_articles: cited.iter().map(|s| s.article.number).collect(),
            confidence,
            processing_ms,
        };
        let assistant_message = Message::assistant(conversation.id, &answer, metadata);
        self.store.create_message(&assistant_message).await?;

        // Refresh updated_at so the listing orders by last activity.
        self.store.save_conversation(&conversation).await?;

        info!(
            conversation_id = %conversation.id,
            cited = cited.len(),
            confidence,
            processing_ms,
            "Processed query"
        );

        Ok(QueryResponse {
            conversation_id: conversation.id,
            message_id: assistant_message.id,
            answer,
            cited_articles: cited,
            confidence,
            processing_ms,
            model: self.generation.model().to_string(),
        })
    }

    /// The owner's active conversations, most recently updated first.
    pub async fn list_conversations(&self, owner_id: &str) -> Result<Vec<Conversation>> {
        Ok(self.store.list_active_by_owner(owner_id).await?)
    }

    /// A conversation's full message history, oldest first.
    ///
    /// Works for archived conversations too — only the listing hides them.
    pub async fn get_history(
        &self,
        owner_id: &str,
        conversation_id: ConversationId,
    ) -> Result<(Conversation, Vec<Message>)> {
        let conversation = self
            .store
            .find_by_id_and_owner(conversation_id, owner_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("conversation {conversation_id} not found")))?;

        let messages = self.store.list_messages(conversation.id).await?;
        Ok((conversation, messages))
    }

    /// Archive a conversation (soft delete). Calling it again on an
    /// already-archived conversation is a no-op success.
    pub async fn delete_conversation(
        &self,
        owner_id: &str,
        conversation_id: ConversationId,
    ) -> Result<()> {
        let mut conversation = self
            .store
            .find_by_id_and_owner(conversation_id, owner_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("conversation {conversation_id} not found")))?;

        conversation.archive();
        self.store.save_conversation(&conversation).await?;

        info!(conversation_id = %conversation_id, "Archived conversation");
        Ok(())
    }
}
