//! Statute article domain types.
//!
//! An [`Article`] is one numbered provision of the penal code, carrying the
//! structural headings it was parsed under (book / title section / chapter)
//! plus derived search metadata. Retrieval produces [`ScoredArticle`]s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single article of the statute corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique row ID
    pub id: Uuid,

    /// Article number, unique within the corpus (e.g. 103)
    pub number: u32,

    /// Short heading (e.g. "Homicide")
    pub title: String,

    /// Normalized body text
    pub content: String,

    /// Book heading the article sits under (e.g. "BOOK SECOND - SPECIAL PART")
    #[serde(default)]
    pub book: String,

    /// Title/section heading (e.g. "TITLE I - CRIMES AGAINST LIFE")
    #[serde(default)]
    pub section: String,

    /// Chapter heading
    #[serde(default)]
    pub chapter: String,

    /// Comma-joined lowercase keywords derived at ingest time
    #[serde(default)]
    pub keywords: String,

    /// Extracted penalty / classification metadata
    #[serde(default)]
    pub metadata: ArticleMetadata,

    /// When this row was created
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Create a bare article; structural headings and metadata are filled
    /// in by the corpus parser.
    pub fn new(number: u32, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            title: title.into(),
            content: content.into(),
            book: String::new(),
            section: String::new(),
            chapter: String::new(),
            keywords: String::new(),
            metadata: ArticleMetadata::default(),
            created_at: Utc::now(),
        }
    }
}

/// Metadata extracted from an article's text at ingest time.
///
/// All fields are best-effort captures; absence means the pattern was not
/// present in the text, not that the article has no penalty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    /// Lower bound of the imprisonment range (e.g. "16 years")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_penalty: Option<String>,

    /// Upper bound of the imprisonment range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_penalty: Option<String>,

    /// Fine clause, captured verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fine: Option<String>,

    /// Offense category matched against a fixed list (e.g. "homicide")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crime_category: Option<String>,
}

/// An article paired with its lexical relevance score for one query.
///
/// Ordering within a result set is score-descending with ties kept in
/// corpus order (the ranking sort is stable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub article: Article,
    pub score: u32,
}

/// Equality filters for hybrid retrieval.
///
/// `None` fields do not constrain; set fields must match the article's
/// heading or extracted category exactly.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub section: Option<String>,
    pub chapter: Option<String>,
    pub crime_category: Option<String>,
}

impl SearchFilters {
    /// Whether the given article passes every set filter.
    pub fn matches(&self, article: &Article) -> bool {
        if let Some(section) = &self.section {
            if &article.section != section {
                return false;
            }
        }
        if let Some(chapter) = &self.chapter {
            if &article.chapter != chapter {
                return false;
            }
        }
        if let Some(category) = &self.crime_category {
            if article.metadata.crime_category.as_ref() != Some(category) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_article() -> Article {
        let mut article = Article::new(103, "Homicide", "Whoever kills another...");
        article.section = "TITLE I".into();
        article.chapter = "CHAPTER II".into();
        article.metadata.crime_category = Some("homicide".into());
        article
    }

    #[test]
    fn article_serialization_roundtrip() {
        let article = sample_article();
        let json = serde_json::to_string(&article).unwrap();
        let back: Article = serde_json::from_str(&json).unwrap();
        assert_eq!(back.number, 103);
        assert_eq!(back.title, "Homicide");
        assert_eq!(back.metadata.crime_category.as_deref(), Some("homicide"));
    }

    #[test]
    fn empty_metadata_serializes_compactly() {
        let article = Article::new(1, "Scope", "This code governs...");
        let json = serde_json::to_string(&article).unwrap();
        assert!(!json.contains("min_penalty"));
        assert!(!json.contains("crime_category"));
    }

    #[test]
    fn filters_match_on_all_set_fields() {
        let article = sample_article();

        let unconstrained = SearchFilters::default();
        assert!(unconstrained.matches(&article));

        let matching = SearchFilters {
            section: Some("TITLE I".into()),
            chapter: None,
            crime_category: Some("homicide".into()),
        };
        assert!(matching.matches(&article));

        let wrong_chapter = SearchFilters {
            chapter: Some("CHAPTER IX".into()),
            ..Default::default()
        };
        assert!(!wrong_chapter.matches(&article));
    }

    #[test]
    fn filter_on_missing_category_rejects() {
        let article = Article::new(4, "Legality", "No one may be tried...");
        let filters = SearchFilters {
            crime_category: Some("theft".into()),
            ..Default::default()
        };
        assert!(!filters.matches(&article));
    }
}
