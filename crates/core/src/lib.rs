//! # lexrag Core
//!
//! Domain types, traits, and error definitions for the lexrag legal Q&A
//! engine. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod article;
pub mod conversation;
pub mod error;
pub mod generation;
pub mod query;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use article::{Article, ArticleMetadata, ScoredArticle, SearchFilters};
pub use conversation::{Conversation, ConversationId, Message, MessageId, MessageMetadata, Role};
pub use error::{Error, GenerationError, Result, StoreError};
pub use generation::GenerationClient;
pub use query::{QueryRequest, QueryResponse};
pub use store::{ArticleRepository, ConversationStore};
