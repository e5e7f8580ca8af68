//! Statute text parser.
//!
//! Turns a plain-text rendition of the penal code into [`Article`]s. The
//! expected document shape:
//!
//! ```text
//! BOOK SECOND
//! SPECIAL PART
//!
//! TITLE I
//! CRIMES AGAINST LIFE
//!
//! CHAPTER II
//! Of homicide
//!
//! Article 103. Homicide.
//! Whoever kills another person shall incur imprisonment of
//! thirteen (13) to twenty-five (25) years.
//! ```
//!
//! `BOOK` / `TITLE` / `CHAPTER` lines set the structural context articles
//! are filed under, each absorbing the following line as a subtitle when
//! it is not itself a heading or an article start. Article bodies
//! accumulate until the next heading or article. Penalty ranges, fine
//! clauses, an offense category, and search keywords are derived from
//! each article's text.

use std::collections::HashMap;

use regex_lite::Regex;

use lexrag_core::Article;

/// Keywords kept per article.
const MAX_KEYWORDS: usize = 10;

/// Minimum word length considered for keywords.
const MIN_KEYWORD_LEN: usize = 4;

/// Offense categories probed for, in priority order; the first one found
/// in the title or body wins.
const CRIME_CATEGORIES: [&str; 10] = [
    "homicide",
    "theft",
    "fraud",
    "kidnapping",
    "extortion",
    "rape",
    "torture",
    "terrorism",
    "embezzlement",
    "bribery",
];

/// Function words excluded from keywords.
const STOP_WORDS: [&str; 14] = [
    "that", "with", "this", "from", "upon", "such", "which", "their", "them", "will", "into",
    "under", "than", "when",
];

/// Line-oriented parser for statute text.
pub struct StatuteParser {
    book_re: Regex,
    section_re: Regex,
    chapter_re: Regex,
    article_re: Regex,
    penalty_re: Regex,
    fine_re: Regex,
    word_re: Regex,
}

impl StatuteParser {
    pub fn new() -> Self {
        Self {
            book_re: Regex::new(r"(?i)^BOOK\s+(FIRST|SECOND)").expect("valid book pattern"),
            section_re: Regex::new(r"(?i)^TITLE\s+[IVXLCDM]+").expect("valid title pattern"),
            chapter_re: Regex::new(r"(?i)^CHAPTER\s+").expect("valid chapter pattern"),
            article_re: Regex::new(r"(?i)^Article\s+(\d+)\.\s+(.+)").expect("valid article pattern"),
            penalty_re: Regex::new(
                r"(?i)imprisonment of\s+[^(]*\((\d+)\)[^(]*to[^(]*\((\d+)\)\s*years",
            )
            .expect("valid penalty pattern"),
            fine_re: Regex::new(r"(?i)a fine of\s+(.+?)\s+wages").expect("valid fine pattern"),
            word_re: Regex::new(&format!(r"\b[a-z]{{{MIN_KEYWORD_LEN},}}\b"))
                .expect("valid word pattern"),
        }
    }

    /// Parse a whole statute document into articles, in document order.
    ///
    /// Articles whose body never materializes (an article heading directly
    /// followed by another heading) are dropped.
    pub fn parse(&self, text: &str) -> Vec<Article> {
        let normalized = text.replace("\r\n", "\n");
        let lines: Vec<&str> = normalized
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let mut articles = Vec::new();
        let mut book = String::new();
        let mut section = String::new();
        let mut chapter = String::new();

        let mut pending: Option<(u32, String)> = None;
        let mut body: Vec<&str> = Vec::new();
        let mut pending_context = (String::new(), String::new(), String::new());

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];

            if self.book_re.is_match(line) {
                book = line.to_string();
                // Absorb the subtitle line, e.g. "SPECIAL PART"
                if i + 1 < lines.len() && !self.is_structural(lines[i + 1]) {
                    book.push_str(" - ");
                    book.push_str(lines[i + 1]);
                    i += 1;
                }
                i += 1;
                continue;
            }

            if self.section_re.is_match(line) {
                section = line.to_string();
                // Absorb the subtitle line, e.g. "CRIMES AGAINST LIFE"
                if i + 1 < lines.len() && !self.is_structural(lines[i + 1]) {
                    section.push_str(" - ");
                    section.push_str(lines[i + 1]);
                    i += 1;
                }
                i += 1;
                continue;
            }

            if self.chapter_re.is_match(line) {
                chapter = line.to_string();
                if i + 1 < lines.len() && !self.is_structural(lines[i + 1]) {
                    chapter.push_str(" - ");
                    chapter.push_str(lines[i + 1]);
                    i += 1;
                }
                i += 1;
                continue;
            }

            if let Some(caps) = self.article_re.captures(line) {
                // Close out the previous article
                if let Some((number, title)) = pending.take() {
                    if !body.is_empty() {
                        articles.push(self.finish_article(
                            number,
                            title,
                            &body,
                            &pending_context,
                        ));
                    }
                }

                let number: u32 = caps[1].parse().unwrap_or(0);
                let title = caps[2].trim_end_matches('.').trim().to_string();
                pending = Some((number, title));
                pending_context = (book.clone(), section.clone(), chapter.clone());
                body.clear();
                i += 1;
                continue;
            }

            if pending.is_some() {
                body.push(line);
            }
            i += 1;
        }

        if let Some((number, title)) = pending {
            if !body.is_empty() {
                articles.push(self.finish_article(number, title, &body, &pending_context));
            }
        }

        articles
    }

    fn is_structural(&self, line: &str) -> bool {
        self.book_re.is_match(line)
            || self.section_re.is_match(line)
            || self.chapter_re.is_match(line)
            || self.article_re.is_match(line)
    }

    fn finish_article(
        &self,
        number: u32,
        title: String,
        body: &[&str],
        context: &(String, String, String),
    ) -> Article {
        let content = clean_text(&body.join(" "));

        let mut article = Article::new(number, title, content);
        article.book = context.0.clone();
        article.section = context.1.clone();
        article.chapter = context.2.clone();
        article.metadata = self.extract_metadata(&article.title, &article.content);
        article.keywords = self.generate_keywords(&article.title, &article.content);
        article
    }

    fn extract_metadata(&self, title: &str, content: &str) -> lexrag_core::ArticleMetadata {
        let mut metadata = lexrag_core::ArticleMetadata::default();

        if let Some(caps) = self.penalty_re.captures(content) {
            metadata.min_penalty = Some(format!("{} years", &caps[1]));
            metadata.max_penalty = Some(format!("{} years", &caps[2]));
        }

        if let Some(caps) = self.fine_re.captures(content) {
            metadata.fine = Some(caps[1].to_string());
        }

        let title_lower = title.to_lowercase();
        let content_lower = content.to_lowercase();
        for category in CRIME_CATEGORIES {
            if title_lower.contains(category) || content_lower.contains(category) {
                metadata.crime_category = Some(category.to_string());
                break;
            }
        }

        metadata
    }

    /// Top-frequency words of the article, stop-word filtered, first-seen
    /// order breaking ties, comma-joined.
    fn generate_keywords(&self, title: &str, content: &str) -> String {
        let text = format!("{title} {content}").to_lowercase();

        let mut first_seen: Vec<String> = Vec::new();
        let mut counts: HashMap<String, u32> = HashMap::new();

        for m in self.word_re.find_iter(&text) {
            let word = m.as_str();
            if STOP_WORDS.contains(&word) {
                continue;
            }
            if !counts.contains_key(word) {
                first_seen.push(word.to_string());
            }
            *counts.entry(word.to_string()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(String, u32)> = first_seen
            .into_iter()
            .map(|word| {
                let count = counts[&word];
                (word, count)
            })
            .collect();
        // Stable sort: equal counts keep first-seen order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(MAX_KEYWORDS);

        ranked
            .into_iter()
            .map(|(word, _)| word)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for StatuteParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a statute document with a default parser.
pub fn parse_statute(text: &str) -> Vec<Article> {
    StatuteParser::new().parse(text)
}

/// Normalize body whitespace: collapse runs, drop spaces that ended up
/// before periods and commas when lines were joined.
fn clean_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(" .", ".")
        .replace(" ,", ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
PENAL CODE

BOOK FIRST
GENERAL PART

TITLE I
OF THE GUIDING PRINCIPLES

CHAPTER ONE
Guiding norms

Article 1. Human dignity.
Criminal law shall be grounded in respect for human dignity.

BOOK SECOND
SPECIAL PART

TITLE I
CRIMES AGAINST LIFE

CHAPTER II
Of homicide

Article 103. Homicide.
Whoever kills another person shall incur imprisonment of
thirteen (13) to twenty-five (25) years.

Article 104. Aggravated homicide.
The penalty shall be forty (40) to fifty (50) years of imprisonment
and a fine of ten (10) to one hundred (100) wages when the conduct
is committed against an ascendant.
";

    #[test]
    fn parses_articles_with_structure() {
        let articles = parse_statute(FIXTURE);
        assert_eq!(articles.len(), 3);

        let first = &articles[0];
        assert_eq!(first.number, 1);
        assert_eq!(first.title, "Human dignity");
        assert_eq!(first.book, "BOOK FIRST - GENERAL PART");
        assert_eq!(first.section, "TITLE I - OF THE GUIDING PRINCIPLES");
        assert_eq!(first.chapter, "CHAPTER ONE - Guiding norms");
        assert_eq!(
            first.content,
            "Criminal law shall be grounded in respect for human dignity."
        );
    }

    #[test]
    fn structural_context_follows_the_document() {
        let articles = parse_statute(FIXTURE);
        let homicide = &articles[1];
        assert_eq!(homicide.number, 103);
        assert_eq!(homicide.book, "BOOK SECOND - SPECIAL PART");
        assert_eq!(homicide.section, "TITLE I - CRIMES AGAINST LIFE");
        assert_eq!(homicide.chapter, "CHAPTER II - Of homicide");
    }

    #[test]
    fn book_rollover_keeps_the_previous_body_clean() {
        let text = "\
Article 1. Human dignity.
Criminal law shall be grounded in respect for human dignity.

BOOK SECOND
SPECIAL PART

Article 103. Homicide.
Whoever kills another person.
";
        let articles = parse_statute(text);
        assert_eq!(articles.len(), 2);
        assert_eq!(
            articles[0].content,
            "Criminal law shall be grounded in respect for human dignity."
        );
        assert_eq!(articles[1].book, "BOOK SECOND - SPECIAL PART");
    }

    #[test]
    fn multi_line_bodies_are_joined_and_normalized() {
        let articles = parse_statute(FIXTURE);
        assert_eq!(
            articles[1].content,
            "Whoever kills another person shall incur imprisonment of thirteen (13) to twenty-five (25) years."
        );
    }

    #[test]
    fn penalty_range_is_extracted() {
        let articles = parse_statute(FIXTURE);
        let meta = &articles[1].metadata;
        assert_eq!(meta.min_penalty.as_deref(), Some("13 years"));
        assert_eq!(meta.max_penalty.as_deref(), Some("25 years"));

        // 104 phrases its penalty differently; the range pattern must not fire
        let aggravated = &articles[2].metadata;
        assert!(aggravated.min_penalty.is_none());
    }

    #[test]
    fn fine_clause_is_captured() {
        let articles = parse_statute(FIXTURE);
        assert_eq!(
            articles[2].metadata.fine.as_deref(),
            Some("ten (10) to one hundred (100)")
        );
        assert!(articles[0].metadata.fine.is_none());
    }

    #[test]
    fn crime_category_matches_fixed_list() {
        let articles = parse_statute(FIXTURE);
        assert_eq!(
            articles[1].metadata.crime_category.as_deref(),
            Some("homicide")
        );
        assert_eq!(
            articles[2].metadata.crime_category.as_deref(),
            Some("homicide")
        );
        assert!(articles[0].metadata.crime_category.is_none());
    }

    #[test]
    fn keywords_are_frequency_ranked_and_capped() {
        let articles = parse_statute(FIXTURE);
        let keywords: Vec<&str> = articles[1].keywords.split(',').collect();

        assert_eq!(keywords.len(), MAX_KEYWORDS);
        // All words occur once, so first-seen order wins; the title leads
        assert_eq!(keywords[0], "homicide");
        assert!(keywords.contains(&"imprisonment"));
        // Short words never make it in
        assert!(!keywords.contains(&"of"));
    }

    #[test]
    fn stop_words_are_excluded() {
        let parser = StatuteParser::new();
        let keywords = parser.generate_keywords(
            "Theft",
            "Whoever takes property that belongs to another with intent.",
        );
        assert!(!keywords.split(',').any(|k| k == "that"));
        assert!(!keywords.split(',').any(|k| k == "with"));
        assert!(keywords.split(',').any(|k| k == "theft"));
    }

    #[test]
    fn repeated_words_outrank_singletons() {
        let parser = StatuteParser::new();
        let keywords = parser.generate_keywords(
            "Extortion",
            "Whoever commits extortion by threats, extortion by force, or other means.",
        );
        assert_eq!(keywords.split(',').next(), Some("extortion"));
    }

    #[test]
    fn headless_body_lines_are_ignored() {
        let articles = parse_statute("Some preamble text.\n\nArticle 9. Scope.\nApplies to all.");
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].content, "Applies to all.");
    }

    #[test]
    fn article_without_body_is_dropped() {
        let text = "Article 7. Placeholder.\nArticle 8. Real.\nActual body text here.";
        let articles = parse_statute(text);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].number, 8);
    }

    #[test]
    fn empty_input_yields_no_articles() {
        assert!(parse_statute("").is_empty());
        assert!(parse_statute("TITLE I\nCHAPTER ONE\n").is_empty());
    }

    #[test]
    fn clean_text_normalizes_joined_lines() {
        assert_eq!(
            clean_text("Whoever  kills\tanother , person ."),
            "Whoever kills another, person."
        );
    }
}
