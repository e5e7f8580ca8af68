//! GenerationClient trait — the abstraction over the text-generation
//! backend.
//!
//! The query pipeline hands a fully composed prompt to
//! [`generate_response`](GenerationClient::generate_response) and gets the
//! answer text back; it never sees transport or API details.
//! [`generate_embedding`](GenerationClient::generate_embedding) is a
//! reserved contract for a future semantic retrieval mode — nothing in the
//! lexical pipeline calls it, and backends without embedding support keep
//! the default implementation.

use async_trait::async_trait;

use crate::error::GenerationError;

#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Identifier of the model answers are generated with
    /// (e.g. "gemini-2.5-flash"). Echoed in query responses.
    fn model(&self) -> &str;

    /// Generate an answer for a fully composed prompt.
    async fn generate_response(
        &self,
        prompt: &str,
    ) -> std::result::Result<String, GenerationError>;

    /// Embed a text for semantic search. Reserved; unused by retrieval.
    async fn generate_embedding(
        &self,
        _text: &str,
    ) -> std::result::Result<Vec<f32>, GenerationError> {
        Err(GenerationError::NotConfigured(format!(
            "model '{}' does not support embeddings",
            self.model()
        )))
    }
}
