//! Conversation and Message domain types.
//!
//! A conversation belongs to one owner and moves through a small lifecycle:
//! it is created active, accumulates user/assistant message pairs, and is
//! archived (`active = false`) on delete. Archived conversations are never
//! physically removed — they drop out of listings but stay addressable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ConversationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant's generated answer
    Assistant,
}

impl Role {
    /// Stable string form used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A conversation header. Messages are stored separately and fetched by
/// conversation id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: ConversationId,

    /// Owner this conversation belongs to; all reads are owner-scoped
    pub owner_id: String,

    /// Title derived from the opening query
    pub title: String,

    /// False once archived (soft delete)
    pub active: bool,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// Refreshed every time the conversation is saved
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new active conversation.
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            owner_id: owner_id.into(),
            title: title.into(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Soft-delete: mark inactive. Idempotent.
    pub fn archive(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: MessageId,

    /// The conversation this message belongs to
    pub conversation_id: ConversationId,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Grounding metadata; present on assistant turns only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,

    /// Timestamp
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new user message.
    pub fn user(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role: Role::User,
            content: content.into(),
            metadata: None,
            created_at: Utc::now(),
        }
    }

    /// Create a new assistant message with grounding metadata.
    pub fn assistant(
        conversation_id: ConversationId,
        content: impl Into<String>,
        metadata: MessageMetadata,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role: Role::Assistant,
            content: content.into(),
            metadata: Some(metadata),
            created_at: Utc::now(),
        }
    }
}

/// How an assistant answer was grounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Article numbers cited, in retrieval rank order
    pub cited_articles: Vec<u32>,

    /// Heuristic confidence score for the answer
    pub confidence: f32,

    /// Wall-clock processing time of the whole query, in milliseconds
    pub processing_ms: u64,
}
