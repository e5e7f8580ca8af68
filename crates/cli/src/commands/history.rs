//! `lexrag history` — Show a conversation's full history.

use lexrag_config::AppConfig;
use lexrag_core::conversation::{ConversationId, Role};

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
    let (conv, messages) = orchestrator.get_history(&owner, id).await?;

    println!("💬 {}", conv.title);
    print!("   Started {}", conv.created_at.format("%Y-%m-%d %H:%M"));
    if conv.active {
        println!();
    } else {
        println!("  (archived)");
    }
    println!();

    for message in &messages {
        let speaker = match message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        println!("  [{}] {speaker}:", message.created_at.format("%H:%M"));
        for line in message.content.lines() {
            println!("    {line}");
        }
        if let Some(meta) = &message.metadata {
            if meta.cited_articles.is_empty() {
                println!("    (ungrounded; confidence {:.0}%)", meta.confidence * 100.0);
            } else {
                println!(
                    "    cited {}; confidence {:.0}%",
                    format_cited(&meta.cited_articles),
                    meta.confidence * 100.0
                );
            }
        }
        println!();
    }

    Ok(())
}

fn format_cited(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| format!("Art. {n}"))
        .collect::<Vec<_>>()
        .join(", ")
}
