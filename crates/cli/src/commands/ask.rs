//! `lexrag ask` — Ask a question grounded in the stored corpus.

use lexrag_config::AppConfig;
use lexrag_core::conversation::ConversationId;
use lexrag_core::query::QueryRequest;
use lexrag_core::ScoredArticle;

pub async fn run(
    query: &str,
    conversation: Option<String>,
    owner: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    if config.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GEMINI_API_KEY='...'   (recommended)");
        eprintln!("    LEXRAG_API_KEY='...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let owner = owner.unwrap_or_else(|| config.default_owner.clone());

    let (orchestrator, index) = super::build_pipeline(&config).await?;
    if index.is_empty() {
        eprintln!("  ⚠️  The corpus is empty — answers will not be grounded.");
        eprintln!("     Run `lexrag seed --file <statute.txt>` first.");
    }

    let request = match conversation {
        Some(raw) => {
            let id: ConversationId = raw
                .parse()
                .map_err(|e| format!("Invalid conversation id {raw:?}: {e}"))?;
            QueryRequest::in_conversation(query, id)
        }
        None => QueryRequest::new(query),
    };

    eprint!("  Thinking...");
    let response = orchestrator.process_query(&owner, request).await;
    eprint!("\r              \r");
    let response = response?;

    println!();
    println!("{}", response.answer);
    println!();
    if !response.cited_articles.is_empty() {
        println!("  Sources:      {}", format_citations(&response.cited_articles));
    }
    println!("  Confidence:   {:.0}%", response.confidence * 100.0);
    println!("  Model:        {} ({} ms)", response.model, response.processing_ms);
    println!("  Conversation: {}", response.conversation_id);
    println!();
    println!(
        "  Follow up: lexrag ask \"...\" --conversation {}",
        response.conversation_id
    );

    Ok(())
}

/// Ranked citation list, e.g. "Art. 239, Art. 244".
fn format_citations(cited: &[ScoredArticle]) -> String {
    cited
        .iter()
        .map(|scored| format!("Art. {}", scored.article.number))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::format_citations;
    use lexrag_core::{Article, ScoredArticle};

    #[test]
    fn citations_keep_rank_order() {
        let cited = vec![
            ScoredArticle {
                article: Article::new(239, "Theft", "Whoever seizes a movable thing."),
                score: 31,
            },
            ScoredArticle {
                article: Article::new(103, "Homicide", "Whoever kills another person."),
                score: 4,
            },
        ];
        assert_eq!(format_citations(&cited), "Art. 239, Art. 103");
    }

    #[test]
    fn no_citations_renders_empty() {
        assert_eq!(format_citations(&[]), "");
    }
}
