//! Request/response shapes for the query pipeline.

use serde::{Deserialize, Serialize};

use crate::article::ScoredArticle;
use crate::conversation::{ConversationId, MessageId};

/// An incoming legal question, optionally continuing an existing
/// conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The user's question
    pub query: String,

    /// Continue this conversation; a new one is created when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            conversation_id: None,
        }
    }

    pub fn in_conversation(query: impl Into<String>, conversation_id: ConversationId) -> Self {
        Self {
            query: query.into(),
            conversation_id: Some(conversation_id),
        }
    }
}

/// The outcome of one processed query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The conversation the exchange was recorded in
    pub conversation_id: ConversationId,

    /// ID of the persisted assistant message
    pub message_id: MessageId,

    /// The generated answer
    pub answer: String,

    /// The full ranked retrieval set the answer was grounded on
    pub cited_articles: Vec<ScoredArticle>,

    /// Heuristic confidence score
    pub confidence: f32,

    /// Wall-clock time for the whole operation, in milliseconds
    pub processing_ms: u64,

    /// Identifier of the generation model that produced the answer
    pub model: String,
}
