//! # lexrag Index
//!
//! In-memory lexical retrieval over the statute corpus.
//!
//! The live index is an immutable [`Snapshot`] behind an
//! `RwLock<Arc<Snapshot>>`. Readers clone the `Arc` out under the read
//! guard and score lock-free, so retrieval never blocks on a concurrent
//! [`ArticleIndex::reindex`] and always observes a complete snapshot —
//! either the one from before the swap or the one after, never a partial
//! rebuild. Retrieval is synchronous; only reindexing (which loads from
//! the repository) is async.

pub mod scoring;

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use lexrag_core::{Article, ArticleRepository, Result, ScoredArticle, SearchFilters};

use crate::scoring::QueryTerms;

/// Default number of articles returned by retrieval.
pub const DEFAULT_TOP_K: usize = 5;

/// Candidate pool fetched before filters are applied in
/// [`ArticleIndex::retrieve_filtered`].
pub const FILTER_POOL_SIZE: usize = 10;

/// One article prepared for scoring.
#[derive(Debug)]
struct IndexedArticle {
    article: Article,
    /// Lowercased "{title} {content} {keywords}"
    haystack: String,
    title_lower: String,
}

/// An immutable build of the whole corpus.
#[derive(Debug, Default)]
pub struct Snapshot {
    entries: Vec<IndexedArticle>,
    built_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    fn build(articles: Vec<Article>) -> Self {
        let entries = articles
            .into_iter()
            .map(|article| {
                let haystack = format!(
                    "{} {} {}",
                    article.title, article.content, article.keywords
                )
                .to_lowercase();
                let title_lower = article.title.to_lowercase();
                IndexedArticle {
                    article,
                    haystack,
                    title_lower,
                }
            })
            .collect();
        Self {
            entries,
            built_at: Some(Utc::now()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The lexical article index.
pub struct ArticleIndex {
    snapshot: RwLock<Arc<Snapshot>>,
}

impl ArticleIndex {
    /// Create an empty index. Until the first [`reindex`](Self::reindex)
    /// (or [`from_articles`](Self::from_articles)) the index is in degraded
    /// mode: retrieval succeeds and returns no articles.
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    /// Build an index directly from a set of articles.
    pub fn from_articles(articles: Vec<Article>) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Snapshot::build(articles))),
        }
    }

    /// Rank articles against the query and return the top `top_k`.
    ///
    /// Score per article: [`scoring::WORD_HIT_WEIGHT`] per word occurrence,
    /// [`scoring::PHRASE_BONUS`] when the full query appears in the text,
    /// [`scoring::TITLE_BONUS`] when it appears in the title. Zero-score
    /// articles are excluded; ties keep corpus order.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<ScoredArticle> {
        let snapshot = self.current();
        let terms = QueryTerms::parse(query);

        let mut hits: Vec<ScoredArticle> = snapshot
            .entries
            .iter()
            .filter_map(|entry| {
                let score = scoring::score(&entry.haystack, &entry.title_lower, &terms);
                (score > 0).then(|| ScoredArticle {
                    article: entry.article.clone(),
                    score,
                })
            })
            .collect();

        // Stable sort: equal scores stay in corpus order
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(top_k);

        debug!(results = hits.len(), "ranked articles for query");
        hits
    }

    /// Hybrid retrieval: rank a pool of [`FILTER_POOL_SIZE`] candidates,
    /// keep the ones matching the equality filters, cap at
    /// [`DEFAULT_TOP_K`].
    pub fn retrieve_filtered(&self, query: &str, filters: &SearchFilters) -> Vec<ScoredArticle> {
        let mut results = self.retrieve(query, FILTER_POOL_SIZE);
        results.retain(|scored| filters.matches(&scored.article));
        results.truncate(DEFAULT_TOP_K);
        results
    }

    /// Reload the corpus from the repository and swap in a fresh snapshot.
    ///
    /// The swap is all-or-nothing: if loading fails, the previous snapshot
    /// keeps serving and the error is returned. Returns the number of
    /// indexed articles.
    pub async fn reindex(&self, repo: &dyn ArticleRepository) -> Result<usize> {
        let articles = repo.list_articles().await?;
        let snapshot = Snapshot::build(articles);
        let count = snapshot.len();

        *self.write_guard() = Arc::new(snapshot);

        info!(articles = count, "article index rebuilt");
        Ok(count)
    }

    /// Number of articles in the live snapshot.
    pub fn len(&self) -> usize {
        self.current().len()
    }

    /// Whether the index is in degraded (empty) mode.
    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    /// When the live snapshot was built; `None` before the first build.
    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.current().built_at
    }

    fn current(&self) -> Arc<Snapshot> {
        Arc::clone(
            &self
                .snapshot
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Arc<Snapshot>> {
        self.snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ArticleIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lexrag_core::StoreError;

    fn article(number: u32, title: &str, content: &str) -> Article {
        Article::new(number, title, content)
    }

    fn corpus() -> Vec<Article> {
        vec![
            article(103, "Homicide", "Whoever kills another person incurs imprisonment."),
            article(
                239,
                "Theft",
                "Whoever seizes a movable thing belonging to another, theft upon theft.",
            ),
            article(244, "Extortion", "Whoever forces another to act by threats."),
        ]
    }

    struct FixedRepo(Vec<Article>);

    #[async_trait]
    impl ArticleRepository for FixedRepo {
        async fn upsert_article(&self, _article: &Article) -> std::result::Result<(), StoreError> {
            Ok(())
        }

        async fn list_articles(&self) -> std::result::Result<Vec<Article>, StoreError> {
            Ok(self.0.clone())
        }

        async fn count_articles(&self) -> std::result::Result<u64, StoreError> {
            Ok(self.0.len() as u64)
        }

        async fn clear_articles(&self) -> std::result::Result<(), StoreError> {
            Ok(())
        }
    }

    struct BrokenRepo;

    #[async_trait]
    impl ArticleRepository for BrokenRepo {
        async fn upsert_article(&self, _article: &Article) -> std::result::Result<(), StoreError> {
            Err(StoreError::Storage("disk gone".into()))
        }

        async fn list_articles(&self) -> std::result::Result<Vec<Article>, StoreError> {
            Err(StoreError::Storage("disk gone".into()))
        }

        async fn count_articles(&self) -> std::result::Result<u64, StoreError> {
            Err(StoreError::Storage("disk gone".into()))
        }

        async fn clear_articles(&self) -> std::result::Result<(), StoreError> {
            Err(StoreError::Storage("disk gone".into()))
        }
    }

    #[test]
    fn empty_index_retrieves_nothing() {
        let index = ArticleIndex::new();
        assert!(index.is_empty());
        assert!(index.retrieve("theft", DEFAULT_TOP_K).is_empty());
        assert!(index.built_at().is_none());
    }

    #[test]
    fn title_match_outranks_body_mention() {
        let index = ArticleIndex::from_articles(corpus());
        let results = index.retrieve("theft", DEFAULT_TOP_K);

        assert!(!results.is_empty());
        assert_eq!(results[0].article.number, 239);
        // Article 239: "theft" 3× in haystack (title + content twice)
        // → 6, + phrase bonus 10 + title bonus 15
        assert_eq!(results[0].score, 31);
    }

    #[test]
    fn zero_score_articles_are_excluded() {
        let index = ArticleIndex::from_articles(corpus());
        let results = index.retrieve("kidnapping ransom", DEFAULT_TOP_K);
        assert!(results.is_empty());
    }

    #[test]
    fn top_k_truncates_results() {
        let articles: Vec<Article> = (1..=8)
            .map(|n| article(n, "Fraud", "Obtaining property by fraud or deceit."))
            .collect();
        let index = ArticleIndex::from_articles(articles);

        let results = index.retrieve("fraud", 3);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn equal_scores_keep_corpus_order() {
        let articles = vec![
            article(10, "Coercion", "Forcing another by violence."),
            article(20, "Duress", "Forcing another by violence."),
        ];
        let index = ArticleIndex::from_articles(articles);

        let results = index.retrieve("violence", DEFAULT_TOP_K);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, results[1].score);
        assert_eq!(results[0].article.number, 10);
        assert_eq!(results[1].article.number, 20);
    }

    #[test]
    fn filtered_retrieval_applies_equality_filters() {
        let mut against_life = article(103, "Homicide", "Whoever kills another person.");
        against_life.section = "TITLE I".into();
        let mut against_property = article(239, "Theft of persons", "Seizing from a person.");
        against_property.section = "TITLE VII".into();

        let index = ArticleIndex::from_articles(vec![against_life, against_property]);

        let filters = SearchFilters {
            section: Some("TITLE I".into()),
            ..Default::default()
        };
        let results = index.retrieve_filtered("person", &filters);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].article.number, 103);
    }

    #[test]
    fn filtered_retrieval_caps_at_top_k() {
        let articles: Vec<Article> = (1..=9)
            .map(|n| article(n, "Bribery", "Accepting a bribe in office."))
            .collect();
        let index = ArticleIndex::from_articles(articles);

        let results = index.retrieve_filtered("bribe", &SearchFilters::default());
        assert_eq!(results.len(), DEFAULT_TOP_K);
    }

    #[tokio::test]
    async fn reindex_swaps_in_fresh_snapshot() {
        let index = ArticleIndex::new();
        assert!(index.is_empty());

        let count = index.reindex(&FixedRepo(corpus())).await.unwrap();
        assert_eq!(count, 3);
        assert_eq!(index.len(), 3);
        assert!(index.built_at().is_some());
        assert!(!index.retrieve("homicide", DEFAULT_TOP_K).is_empty());
    }

    #[tokio::test]
    async fn failed_reindex_keeps_old_snapshot() {
        let index = ArticleIndex::from_articles(corpus());
        assert_eq!(index.len(), 3);

        let err = index.reindex(&BrokenRepo).await.unwrap_err();
        assert!(err.to_string().contains("disk gone"));

        // Previous snapshot still serves
        assert_eq!(index.len(), 3);
        assert!(!index.retrieve("theft", DEFAULT_TOP_K).is_empty());
    }

    #[tokio::test]
    async fn reindex_to_empty_corpus_enters_degraded_mode() {
        let index = ArticleIndex::from_articles(corpus());

        let count = index.reindex(&FixedRepo(Vec::new())).await.unwrap();
        assert_eq!(count, 0);
        assert!(index.is_empty());
        assert!(index.retrieve("theft", DEFAULT_TOP_K).is_empty());
    }
}
