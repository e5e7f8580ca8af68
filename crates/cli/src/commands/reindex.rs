//! `lexrag reindex` — Rebuild the article index from the stored corpus.

use lexrag_config::AppConfig;
use lexrag_index::ArticleIndex;
use lexrag_store::SqliteStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    super::ensure_db_dir(&config.database_path)?;
    let store = SqliteStore::new(&config.database_path).await?;

    let index = ArticleIndex::new();
    let started = std::time::Instant::now();
    let count = index.reindex(&store).await?;
    let elapsed_ms = started.elapsed().as_millis();

    println!("🔎 Article index rebuilt");
    println!("   Articles:   {count}");
    println!("   Build time: {elapsed_ms} ms");
    if count == 0 {
        println!("   ⚠️  The corpus is empty — run `lexrag seed --file <statute.txt>`");
    }

    Ok(())
}
