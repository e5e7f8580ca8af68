//! Lexical relevance scoring.
//!
//! Pure functions implementing the substring-match heuristic: per-word
//! occurrence counts plus bonuses for the full query phrase and for title
//! hits. Scores are additive unsigned integers; an article that matches
//! nothing scores 0 and is excluded from results.

/// Weight added per occurrence of a query word in the article text.
pub const WORD_HIT_WEIGHT: u32 = 2;

/// Bonus when the full query phrase appears anywhere in the article text.
pub const PHRASE_BONUS: u32 = 10;

/// Bonus when the article title contains the full query phrase.
pub const TITLE_BONUS: u32 = 15;

/// Query words this short or shorter are dropped before scoring.
pub const MIN_TOKEN_LEN: usize = 3;

/// A query broken down for scoring: the full lowercased phrase plus the
/// individual words long enough to be discriminating.
#[derive(Debug, Clone)]
pub struct QueryTerms {
    /// The whole query, lowercased
    pub phrase: String,
    /// Whitespace-split words longer than [`MIN_TOKEN_LEN`] characters
    pub tokens: Vec<String>,
}

impl QueryTerms {
    pub fn parse(query: &str) -> Self {
        let phrase = query.to_lowercase();
        let tokens = phrase
            .split_whitespace()
            .filter(|word| word.chars().count() > MIN_TOKEN_LEN)
            .map(str::to_string)
            .collect();
        Self { phrase, tokens }
    }
}

/// Score one article against parsed query terms.
///
/// `haystack` is the lowercased concatenation of title, content, and
/// keywords; `title_lower` the lowercased title alone. Both are precomputed
/// when the snapshot is built so scoring never allocates.
pub fn score(haystack: &str, title_lower: &str, terms: &QueryTerms) -> u32 {
    let mut score = 0;

    // Per-word occurrence count (non-overlapping)
    for token in &terms.tokens {
        score += haystack.matches(token.as_str()).count() as u32 * WORD_HIT_WEIGHT;
    }

    // Full phrase anywhere in the text
    if haystack.contains(&terms.phrase) {
        score += PHRASE_BONUS;
    }

    // Full phrase in the title
    if title_lower.contains(&terms.phrase) {
        score += TITLE_BONUS;
    }

    score
}
