//! Subcommand implementations.

pub mod ask;
pub mod conversations;
pub mod delete;
pub mod history;
pub mod reindex;
pub mod seed;
pub mod status;

use std::sync::Arc;

use lexrag_chat::QueryOrchestrator;
use lexrag_config::AppConfig;
use lexrag_generation::GeminiClient;
use lexrag_index::ArticleIndex;
use lexrag_store::SqliteStore;

/// Wire up the query pipeline the way the long-running service would:
/// SQLite store, article index built from the stored corpus, Gemini client.
///
/// The API key is only checked when generation actually runs, so commands
/// that never generate work without one.
pub(crate) async fn build_pipeline(
    config: &AppConfig,
) -> Result<(QueryOrchestrator, Arc<ArticleIndex>), Box<dyn std::error::Error>> {
    ensure_db_dir(&config.database_path)?;
    let store = Arc::new(SqliteStore::new(&config.database_path).await?);

    let index = Arc::new(ArticleIndex::new());
    let count = index.reindex(store.as_ref()).await?;
    tracing::debug!(articles = count, "corpus loaded into index");

    let client = GeminiClient::new(config.api_key.clone().unwrap_or_default())
        .with_base_url(&config.generation_base_url)
        .with_model(&config.model)
        .with_embedding_model(&config.embedding_model);

    let orchestrator = QueryOrchestrator::new(store, Arc::clone(&index), Arc::new(client))
        .with_top_k(config.top_k)
        .with_max_query_chars(config.max_query_chars);

    Ok((orchestrator, index))
}

/// Make sure the directory holding the database exists. SQLite creates a
/// missing file but not missing parent directories.
pub(crate) fn ensure_db_dir(database_path: &str) -> std::io::Result<()> {
    if database_path.starts_with("sqlite:") {
        // URI form, e.g. "sqlite::memory:"
        return Ok(());
    }
    if let Some(dir) = std::path::Path::new(database_path).parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}
