//! `lexrag conversations` — List active conversations.

use lexrag_config::AppConfig;

pub async fn run(owner: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let owner = owner.unwrap_or_else(|| config.default_owner.clone());

    let (orchestrator, _index) = super::build_pipeline(&config).await?;
    let conversations = orchestrator.list_conversations(&owner).await?;

    if conversations.is_empty() {
        println!("No conversations yet. Start one with: lexrag ask \"<question>\"");
        return Ok(());
    }

    println!("💬 Conversations ({owner})");
    println!("=========================");
    for conv in &conversations {
        println!(
            "  {}  {}  {}",
            conv.id,
            conv.updated_at.format("%Y-%m-%d %H:%M"),
            conv.title
        );
    }
    println!();
    println!(
        "  {} total — `lexrag history <id>` shows the full exchange",
        conversations.len()
    );

    Ok(())
}
