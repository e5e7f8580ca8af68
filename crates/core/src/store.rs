//! Repository traits — the abstraction over persistence.
//!
//! [`ConversationStore`] owns conversation and message rows;
//! [`ArticleRepository`] owns the statute corpus. Implementations live in
//! the store crate (SQLite for real runs, in-memory for tests). The query
//! pipeline only ever sees these traits.

use async_trait::async_trait;

use crate::article::Article;
use crate::conversation::{Conversation, ConversationId, Message};
use crate::error::StoreError;

/// Persistence for conversations and their messages.
///
/// All conversation reads are owner-scoped: an id belonging to another
/// owner behaves exactly like an unknown id.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in-memory").
    fn name(&self) -> &str;

    /// Create and persist a new active conversation.
    async fn create_conversation(
        &self,
        owner_id: &str,
        title: &str,
    ) -> std::result::Result<Conversation, StoreError>;

    /// Fetch a conversation by id for the given owner.
    ///
    /// Deliberately ignores the `active` flag: archived conversations stay
    /// reachable by direct id even though they no longer appear in
    /// [`list_active_by_owner`](Self::list_active_by_owner).
    async fn find_by_id_and_owner(
        &self,
        id: ConversationId,
        owner_id: &str,
    ) -> std::result::Result<Option<Conversation>, StoreError>;

    /// List the owner's active conversations, most recently updated first.
    async fn list_active_by_owner(
        &self,
        owner_id: &str,
    ) -> std::result::Result<Vec<Conversation>, StoreError>;

    /// Persist the conversation's mutable fields (title, active) and
    /// refresh its `updated_at` to now.
    async fn save_conversation(
        &self,
        conversation: &Conversation,
    ) -> std::result::Result<(), StoreError>;

    /// Persist a message.
    async fn create_message(&self, message: &Message) -> std::result::Result<(), StoreError>;

    /// All messages of a conversation, oldest first.
    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> std::result::Result<Vec<Message>, StoreError>;
}

/// Persistence for the statute corpus.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert or replace an article, keyed by its article number.
    async fn upsert_article(&self, article: &Article) -> std::result::Result<(), StoreError>;

    /// All articles in corpus order (article number ascending).
    async fn list_articles(&self) -> std::result::Result<Vec<Article>, StoreError>;

    /// Total number of stored articles.
    async fn count_articles(&self) -> std::result::Result<u64, StoreError>;

    /// Remove every article; used when re-running the seed pipeline.
    async fn clear_articles(&self) -> std::result::Result<(), StoreError>;
}
