//! Persistence backends for lexrag.
//!
//! Two implementations of the core repository traits:
//! - [`SqliteStore`] — the production backend, one SQLite file for
//!   conversations, messages, and the article corpus
//! - [`InMemoryStore`] — Vec-backed, for tests and throwaway sessions
//!
//! Both implement [`ConversationStore`](lexrag_core::store::ConversationStore)
//! and [`ArticleRepository`](lexrag_core::store::ArticleRepository), so
//! callers stay backend-agnostic.

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use sqlite::SqliteStore;
