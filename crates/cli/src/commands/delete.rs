//! `lexrag delete` — Archive a conversation.

use lexrag_config::AppConfig;
use lexrag_core::conversation::ConversationId;

pub async fn run(
    conversation: &str,
    owner: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let owner = owner.unwrap_or_else(|| config.default_owner.clone());
    let id: ConversationId = conversation
        .parse()
        .map_err(|e| format!("Invalid conversation id {conversation:?}: {e}"))?;

    let (orchestrator, _index) = super::build_pipeline(&config).await?;
    orchestrator.delete_conversation(&owner, id).await?;

    println!("🗑️  Archived conversation {id}");
    println!("   It no longer shows in listings; `lexrag history {id}` still works.");

    Ok(())
}
