//! Prompt composition for grounded answer generation.

use lexrag_core::article::ScoredArticle;

/// Default instruction block prepended to every prompt.
const DEFAULT_INSTRUCTIONS: &str = "\
You are a legal assistant specializing in the penal code. Your role is to \
provide clear, precise, and accessible explanations of criminal law.

INSTRUCTIONS:
1. Answer ONLY based on the penal code articles provided below
2. Explain in clear, simple language, avoiding unnecessary legal jargon
3. Always cite the specific articles that support your answer
4. If the information is not in the provided articles, state that you do not have that information
5. Maintain a professional but approachable tone
6. If asked about legal consequences, mention the established penalties";

/// Builds the generation prompt from the user's question and the retrieved
/// statute articles.
///
/// The layout is fixed: instructions, a legal-context section with one
/// block per article, the user question, and an answer cue. When retrieval
/// comes back empty the context section is simply empty — the instructions
/// already tell the model to say when information is missing, so no
/// special casing is needed.
pub struct PromptComposer {
    instructions: String,
}

impl PromptComposer {
    pub fn new() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.into(),
        }
    }

    /// Replace the default instruction block.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Compose the full prompt for one query.
    pub fn compose(&self, query: &str, articles: &[ScoredArticle]) -> String {
        let context = articles
            .iter()
            .map(|scored| {
                format!(
                    "Article {} - {}\n{}\n---",
                    scored.article.number, scored.article.title, scored.article.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "{}\n\nRELEVANT LEGAL CONTEXT:\n{}\n\nUSER QUESTION:\n{}\n\nANSWER:",
            self.instructions, context, query
        )
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexrag_core::article::Article;

    fn scored(number: u32, title: &str, content: &str) -> ScoredArticle {
        ScoredArticle {
            article: Article::new(number, title, content),
            score: 10,
        }
    }

    #[test]
    fn prompt_has_all_sections() {
        let composer = PromptComposer::new();
        let articles = vec![scored(634, "Theft", "Whoever appropriates...")];

        let prompt = composer.compose("What is theft?", &articles);

        assert!(prompt.starts_with("You are a legal assistant"));
        assert!(prompt.contains("RELEVANT LEGAL CONTEXT:"));
        assert!(prompt.contains("USER QUESTION:\nWhat is theft?"));
        assert!(prompt.ends_with("ANSWER:"));
    }

    #[test]
    fn article_blocks_carry_number_title_and_body() {
        let composer = PromptComposer::new();
        let articles = vec![
            scored(103, "Homicide", "Whoever kills another..."),
            scored(104, "Aggravated homicide", "The penalty is increased..."),
        ];

        let prompt = composer.compose("q", &articles);

        assert!(prompt.contains("Article 103 - Homicide\nWhoever kills another...\n---"));
        assert!(prompt.contains("Article 104 - Aggravated homicide"));
        // Blocks are separated by a blank line.
        assert!(prompt.contains("---\n\nArticle 104"));
    }

    #[test]
    fn empty_retrieval_leaves_context_empty() {
        let composer = PromptComposer::new();
        let prompt = composer.compose("Is jaywalking a crime?", &[]);

        assert!(prompt.contains("RELEVANT LEGAL CONTEXT:\n\nUSER QUESTION:"));
        assert!(prompt.contains("Is jaywalking a crime?"));
    }

    #[test]
    fn custom_instructions_replace_default() {
        let composer = PromptComposer::new().with_instructions("Answer in one sentence.");
        let prompt = composer.compose("q", &[]);

        assert!(prompt.starts_with("Answer in one sentence.\n\n"));
        assert!(!prompt.contains("legal assistant"));
    }
}
