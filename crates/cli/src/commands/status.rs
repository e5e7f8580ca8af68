//! `lexrag status` — Show configuration and corpus status.

use lexrag_config::AppConfig;
use lexrag_core::ArticleRepository;
use lexrag_store::SqliteStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("⚖️  lexrag Status");
    println!("================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Database:     {}", config.database_path);
    println!("  Model:        {}", config.model);
    println!("  Embeddings:   {}", config.embedding_model);
    println!("  Endpoint:     {}", config.generation_base_url);
    println!("  Top-k:        {}", config.top_k);
    println!("  Query limit:  {} chars", config.max_query_chars);
    println!("  Owner:        {}", config.default_owner);
    println!(
        "  API key:      {}",
        if config.has_api_key() { "configured" } else { "not set" }
    );

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — defaults in effect");
        println!("  To customize, create {} with:", config_path.display());
        for line in AppConfig::default_toml().lines() {
            println!("    {line}");
        }
    }

    // Report on the corpus without creating the database as a side effect
    if std::path::Path::new(&config.database_path).exists() {
        let store = SqliteStore::new(&config.database_path).await?;
        let total = store.count_articles().await?;
        if total == 0 {
            println!("  📚 Corpus:    empty — run `lexrag seed --file <statute.txt>`");
        } else {
            println!("  📚 Corpus:    {total} articles");
        }
    } else {
        println!("  📚 Corpus:    database not created yet");
    }

    Ok(())
}
