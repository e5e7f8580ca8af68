//! `lexrag seed` — Import a statute corpus from a plain-text file.

use lexrag_config::AppConfig;
use lexrag_core::ArticleRepository;
use lexrag_corpus::parse_statute;
use lexrag_store::SqliteStore;

pub async fn run(file: &str, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let text =
        std::fs::read_to_string(file).map_err(|e| format!("Failed to read {file}: {e}"))?;

    let articles = parse_statute(&text);
    if articles.is_empty() {
        return Err(format!("No articles found in {file} — is this a statute text?").into());
    }

    let with_penalty = articles
        .iter()
        .filter(|a| a.metadata.min_penalty.is_some())
        .count();
    let with_keywords = articles.iter().filter(|a| !a.keywords.is_empty()).count();

    println!("📖 Parsed {} articles from {file}", articles.len());
    println!("   With penalty range: {with_penalty}");
    println!("   With keywords:      {with_keywords}");

    super::ensure_db_dir(&config.database_path)?;
    let store = SqliteStore::new(&config.database_path).await?;

    if force {
        store.clear_articles().await?;
        println!("   Cleared the previous corpus");
    }

    // Upsert keyed on article number, so re-seeding an amended text
    // replaces articles in place
    for article in &articles {
        store.upsert_article(article).await?;
    }

    let total = store.count_articles().await?;
    println!("✅ Corpus seeded: {total} articles in {}", config.database_path);
    println!("   Ask away: lexrag ask \"What is the penalty for theft?\"");

    Ok(())
}
