//! SQLite persistence for conversations, messages, and the statute corpus.
//!
//! One database file, three tables:
//! - `conversations` — chat headers, soft-deleted via the `active` flag
//! - `messages` — user/assistant turns, cascade-deleted with their conversation
//! - `articles` — the ingested penal-code corpus, unique per article number
//!
//! Timestamps are stored as RFC 3339 TEXT and structured metadata as JSON
//! TEXT, so rows stay inspectable from the sqlite3 shell.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lexrag_core::article::{Article, ArticleMetadata};
use lexrag_core::conversation::{Conversation, ConversationId, Message, MessageId, Role};
use lexrag_core::error::StoreError;
use lexrag_core::store::{ArticleRepository, ConversationStore};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// A production SQLite store backing both the conversation log and the
/// article corpus.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store from a file path.
    ///
    /// The database and all tables/indexes are created automatically.
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database
    /// (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite store initialized at {path}");
        Ok(store)
    }

    /// Run schema migrations — creates tables and indexes.
    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                id          TEXT PRIMARY KEY,
                owner_id    TEXT NOT NULL,
                title       TEXT NOT NULL,
                active      INTEGER NOT NULL DEFAULT 1,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("conversations table: {e}")))?;

        // Covers the owner-scoped listing (active + recency sort)
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_conversations_owner
            ON conversations (owner_id, active, updated_at)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("conversations index: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id              TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL
                    REFERENCES conversations(id) ON DELETE CASCADE,
                role            TEXT NOT NULL,
                content         TEXT NOT NULL,
                metadata        TEXT,
                created_at      TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("messages table: {e}")))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_messages_conversation
            ON messages (conversation_id, created_at)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("messages index: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id          TEXT PRIMARY KEY,
                number      INTEGER NOT NULL UNIQUE,
                title       TEXT NOT NULL,
                content     TEXT NOT NULL,
                book        TEXT NOT NULL DEFAULT '',
                section     TEXT NOT NULL DEFAULT '',
                chapter     TEXT NOT NULL DEFAULT '',
                keywords    TEXT NOT NULL DEFAULT '',
                metadata    TEXT NOT NULL DEFAULT '{}',
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("articles table: {e}")))?;

        Ok(())
    }

    fn row_to_conversation(row: &SqliteRow) -> Result<Conversation, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("read id: {e}")))?;
        let owner_id: String = row
            .try_get("owner_id")
            .map_err(|e| StoreError::QueryFailed(format!("read owner_id: {e}")))?;
        let title: String = row
            .try_get("title")
            .map_err(|e| StoreError::QueryFailed(format!("read title: {e}")))?;
        let active: bool = row
            .try_get("active")
            .map_err(|e| StoreError::QueryFailed(format!("read active: {e}")))?;
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("read created_at: {e}")))?;
        let updated_at: String = row
            .try_get("updated_at")
            .map_err(|e| StoreError::QueryFailed(format!("read updated_at: {e}")))?;

        let id = Uuid::parse_str(&id)
            .map_err(|e| StoreError::QueryFailed(format!("malformed conversation id: {e}")))?;

        Ok(Conversation {
            id: ConversationId(id),
            owner_id,
            title,
            active,
            created_at: parse_timestamp(&created_at),
            updated_at: parse_timestamp(&updated_at),
        })
    }

    fn row_to_message(row: &SqliteRow) -> Result<Message, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("read id: {e}")))?;
        let conversation_id: String = row
            .try_get("conversation_id")
            .map_err(|e| StoreError::QueryFailed(format!("read conversation_id: {e}")))?;
        let role: String = row
            .try_get("role")
            .map_err(|e| StoreError::QueryFailed(format!("read role: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| StoreError::QueryFailed(format!("read content: {e}")))?;
        let metadata_json: Option<String> = row
            .try_get("metadata")
            .map_err(|e| StoreError::QueryFailed(format!("read metadata: {e}")))?;
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("read created_at: {e}")))?;

        let id = Uuid::parse_str(&id)
            .map_err(|e| StoreError::QueryFailed(format!("malformed message id: {e}")))?;
        let conversation_id = Uuid::parse_str(&conversation_id)
            .map_err(|e| StoreError::QueryFailed(format!("malformed conversation id: {e}")))?;
        let role = match role.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            other => {
                return Err(StoreError::QueryFailed(format!(
                    "unknown message role '{other}'"
                )));
            }
        };

        Ok(Message {
            id: MessageId(id),
            conversation_id: ConversationId(conversation_id),
            role,
            content,
            metadata: metadata_json.as_deref().and_then(|m| serde_json::from_str(m).ok()),
            created_at: parse_timestamp(&created_at),
        })
    }

    fn row_to_article(row: &SqliteRow) -> Result<Article, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("read id: {e}")))?;
        let number: i64 = row
            .try_get("number")
            .map_err(|e| StoreError::QueryFailed(format!("read number: {e}")))?;
        let title: String = row
            .try_get("title")
            .map_err(|e| StoreError::QueryFailed(format!("read title: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| StoreError::QueryFailed(format!("read content: {e}")))?;
        let book: String = row
            .try_get("book")
            .map_err(|e| StoreError::QueryFailed(format!("read book: {e}")))?;
        let section: String = row
            .try_get("section")
            .map_err(|e| StoreError::QueryFailed(format!("read section: {e}")))?;
        let chapter: String = row
            .try_get("chapter")
            .map_err(|e| StoreError::QueryFailed(format!("read chapter: {e}")))?;
        let keywords: String = row
            .try_get("keywords")
            .map_err(|e| StoreError::QueryFailed(format!("read keywords: {e}")))?;
        let metadata_json: String = row
            .try_get("metadata")
            .map_err(|e| StoreError::QueryFailed(format!("read metadata: {e}")))?;
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("read created_at: {e}")))?;

        let id = Uuid::parse_str(&id)
            .map_err(|e| StoreError::QueryFailed(format!("malformed article id: {e}")))?;
        let metadata: ArticleMetadata = serde_json::from_str(&metadata_json).unwrap_or_default();

        Ok(Article {
            id,
            number: number as u32,
            title,
            content,
            book,
            section,
            chapter,
            keywords,
            metadata,
            created_at: parse_timestamp(&created_at),
        })
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn create_conversation(
        &self,
        owner_id: &str,
        title: &str,
    ) -> Result<Conversation, StoreError> {
        let conversation = Conversation::new(owner_id, title);

        sqlx::query(
            r#"
            INSERT INTO conversations (id, owner_id, title, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(conversation.id.to_string())
        .bind(&conversation.owner_id)
        .bind(&conversation.title)
        .bind(conversation.active)
        .bind(conversation.created_at.to_rfc3339())
        .bind(conversation.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("insert conversation: {e}")))?;

        debug!(conversation_id = %conversation.id, owner_id, "created conversation");
        Ok(conversation)
    }

    async fn find_by_id_and_owner(
        &self,
        id: ConversationId,
        owner_id: &str,
    ) -> Result<Option<Conversation>, StoreError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ? AND owner_id = ?")
            .bind(id.to_string())
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("find conversation: {e}")))?;

        row.as_ref().map(Self::row_to_conversation).transpose()
    }

    async fn list_active_by_owner(&self, owner_id: &str) -> Result<Vec<Conversation>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM conversations
            WHERE owner_id = ? AND active = 1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("list conversations: {e}")))?;

        rows.iter().map(Self::row_to_conversation).collect()
    }

    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), StoreError> {
        // Upsert keyed on id; `updated_at` is always refreshed so the
        // recency ordering in list_active_by_owner tracks last activity.
        sqlx::query(
            r#"
            INSERT INTO conversations (id, owner_id, title, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                active = excluded.active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(conversation.id.to_string())
        .bind(&conversation.owner_id)
        .bind(&conversation.title)
        .bind(conversation.active)
        .bind(conversation.created_at.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("save conversation: {e}")))?;

        Ok(())
    }

    async fn create_message(&self, message: &Message) -> Result<(), StoreError> {
        let metadata_json = match &message.metadata {
            Some(metadata) => Some(
                serde_json::to_string(metadata)
                    .map_err(|e| StoreError::Storage(format!("Metadata serialization: {e}")))?,
            ),
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.id.to_string())
        .bind(message.conversation_id.to_string())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(metadata_json)
        .bind(message.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("insert message: {e}")))?;

        debug!(message_id = %message.id, role = message.role.as_str(), "stored message");
        Ok(())
    }

    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM messages
            WHERE conversation_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("list messages: {e}")))?;

        rows.iter().map(Self::row_to_message).collect()
    }
}

#[async_trait]
impl ArticleRepository for SqliteStore {
    async fn upsert_article(&self, article: &Article) -> Result<(), StoreError> {
        let metadata_json = serde_json::to_string(&article.metadata)
            .map_err(|e| StoreError::Storage(format!("Metadata serialization: {e}")))?;

        // Re-seeding replaces the text but keeps the original row id and
        // created_at, so external references to an article survive.
        sqlx::query(
            r#"
            INSERT INTO articles
                (id, number, title, content, book, section, chapter, keywords, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(number) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                book = excluded.book,
                section = excluded.section,
                chapter = excluded.chapter,
                keywords = excluded.keywords,
                metadata = excluded.metadata
            "#,
        )
        .bind(article.id.to_string())
        .bind(article.number as i64)
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.book)
        .bind(&article.section)
        .bind(&article.chapter)
        .bind(&article.keywords)
        .bind(metadata_json)
        .bind(article.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("upsert article: {e}")))?;

        Ok(())
    }

    async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        let rows = sqlx::query("SELECT * FROM articles ORDER BY number ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("list articles: {e}")))?;

        rows.iter().map(Self::row_to_article).collect()
    }

    async fn count_articles(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("count articles: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("read count: {e}")))?;
        Ok(cnt as u64)
    }

    async fn clear_articles(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM articles")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("clear articles: {e}")))?;

        info!("cleared article corpus");
        Ok(())
    }
}

/// Parse a stored RFC 3339 timestamp, falling back to now on corruption.
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
