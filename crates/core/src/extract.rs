//! Boilerplate removal: turns raw HTML into a title and clean body text.
//!
//! The primary strategy strips page chrome and ad-like containers, picks the
//! best scoring content container and concatenates its block-level text in
//! document order. When that yields too little text, a permissive fallback
//! collects every visible text node of the body. A page where both fall
//! short is reported as [`ExtractionOutcome::NoContent`], which is a valid
//! result rather than an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::candidates::{ScoreConfig, top_candidate};
use crate::parse::{Document, Element, normalize_whitespace};
use crate::preprocess::{PreprocessConfig, preprocess_html};

/// Block elements whose text forms the article body
const BLOCK_TAGS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "pre",
    "blockquote",
    "td",
    "th",
    "dt",
    "dd",
    "figcaption",
];

const BLOCK_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li, pre, blockquote, td, th, dt, dd, figcaption";

/// Configuration for content extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Minimum body length in characters before the fallback strategy kicks in
    pub min_content_chars: usize,
    /// Minimum container score for the primary strategy to narrow below `<body>`
    pub min_candidate_score: f64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { min_content_chars: 250, min_candidate_score: 20.0 }
    }
}

/// Which strategy produced the body text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionOutcome {
    Primary,
    Fallback,
    NoContent,
}

/// Title and clean text of a document
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    pub title: Option<String>,
    pub text: String,
    pub outcome: ExtractionOutcome,
}

/// Stateless boilerplate extractor, built once and shared.
#[derive(Debug, Clone, Default)]
pub struct BoilerplateExtractor {
    config: ExtractConfig,
    score_config: ScoreConfig,
}

impl BoilerplateExtractor {
    pub fn new(config: ExtractConfig) -> Self {
        let score_config = ScoreConfig { min_score_threshold: config.min_candidate_score, ..Default::default() };
        Self { config, score_config }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extracts title and body text from raw HTML.
    ///
    /// With `force_deep`, both strategies always run and the longer text wins.
    pub fn extract(&self, html: &str, force_deep: bool) -> ExtractedContent {
        let raw = Document::parse(html);
        let title = extract_title(&raw);
        let min = self.config.min_content_chars;

        let primary = self.extract_primary(html);
        let primary_len = primary.chars().count();

        if primary_len >= min && !force_deep {
            return ExtractedContent { title, text: primary, outcome: ExtractionOutcome::Primary };
        }

        let fallback = self.extract_fallback(html);
        let fallback_len = fallback.chars().count();
        debug!(primary_len, fallback_len, force_deep, "primary extraction short, trying fallback");

        let (text, outcome) = if primary_len >= min && primary_len >= fallback_len {
            (primary, ExtractionOutcome::Primary)
        } else if fallback_len >= min {
            (fallback, ExtractionOutcome::Fallback)
        } else {
            (String::new(), ExtractionOutcome::NoContent)
        };

        ExtractedContent { title, text, outcome }
    }

    /// Primary strategy: chrome-free block text of the best content container.
    pub fn extract_primary(&self, html: &str) -> String {
        let cleaned = preprocess_html(html, &PreprocessConfig::default());
        let doc = Document::parse(&cleaned);

        let root = match top_candidate(&doc, &self.score_config) {
            Some(candidate) => {
                debug!(score = candidate.score, tag = %candidate.element.tag_name(), "selected content container");
                Some(candidate.element)
            }
            None => doc.body(),
        };

        match root {
            Some(root) => block_text(&root),
            None => String::new(),
        }
    }

    /// Secondary strategy: every visible text node of the lightly cleaned body.
    pub fn extract_fallback(&self, html: &str) -> String {
        let cleaned = preprocess_html(html, &PreprocessConfig::light());
        let doc = Document::parse(&cleaned);
        match doc.body() {
            Some(body) => body.visible_text(),
            None => doc.visible_text(),
        }
    }
}

/// Concatenates outermost block elements under `root`, one paragraph each.
fn block_text(root: &Element<'_>) -> String {
    let blocks = root.select(BLOCK_SELECTOR).unwrap_or_default();

    let paragraphs: Vec<String> = blocks
        .iter()
        .filter(|block| !block.has_ancestor_in(BLOCK_TAGS, Some(root)))
        .map(|block| block.visible_text())
        .filter(|text| !text.is_empty())
        .collect();

    if paragraphs.is_empty() {
        return root.visible_text();
    }

    paragraphs.join("\n\n")
}

/// Title with priority: `og:title`, `twitter:title`, `<title>`, first `<h1>`.
pub fn extract_title(doc: &Document) -> Option<String> {
    doc.meta_content("og:title")
        .or_else(|| doc.meta_content("twitter:title"))
        .or_else(|| doc.title())
        .or_else(|| {
            doc.select("h1")
                .ok()?
                .into_iter()
                .map(|h| normalize_whitespace(&h.text()))
                .find(|t| !t.is_empty())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(n: usize) -> String {
        format!(
            "<p>Paragraph {n} explains how ownership moves values between bindings, and why the compiler rejects use after move.</p>"
        )
    }

    fn article_html() -> String {
        let body: String = (1..=4).map(paragraph).collect();
        format!(
            r##"<html><head><title>Ownership in Practice</title><script>track()</script></head>
            <body>
                <nav><a href="#">Home</a> <a href="#">Blog</a></nav>
                <div class="ad-banner">Buy our course today</div>
                <article class="post">{body}<ul><li><p>Moves</p></li><li>Borrows</li></ul></article>
                <footer>Copyright 2024</footer>
            </body></html>"##
        )
    }

    #[test]
    fn test_primary_extraction_drops_boilerplate() {
        let extractor = BoilerplateExtractor::default();
        let result = extractor.extract(&article_html(), false);

        assert_eq!(result.outcome, ExtractionOutcome::Primary);
        assert_eq!(result.title, Some("Ownership in Practice".to_string()));
        assert!(result.text.starts_with("Paragraph 1 explains"));
        assert!(result.text.contains("\n\nParagraph 2"));
        assert!(!result.text.contains("Home"));
        assert!(!result.text.contains("Buy our course"));
        assert!(!result.text.contains("Copyright"));
        assert!(!result.text.contains("track()"));
    }

    #[test]
    fn test_nested_blocks_not_duplicated() {
        let extractor = BoilerplateExtractor::default();
        let result = extractor.extract(&article_html(), false);
        assert_eq!(result.text.matches("Moves").count(), 1);
        assert!(result.text.contains("Borrows"));
    }

    #[test]
    fn test_fallback_used_for_unstructured_page() {
        let sentence = "Reader discussion keeps going for a while so the fallback has enough to work with. ";
        let html = format!(
            r#"<html><body><nav>Section links</nav><div class="comments"><span>{}</span></div><p>Short intro.</p></body></html>"#,
            sentence.repeat(4)
        );
        let extractor = BoilerplateExtractor::default();
        let primary = extractor.extract_primary(&html);
        assert_eq!(primary, "Short intro.");

        let result = extractor.extract(&html, false);
        assert_eq!(result.outcome, ExtractionOutcome::Fallback);
        assert!(result.text.contains("Section links"));
        assert!(result.text.contains("fallback has enough"));
    }

    #[test]
    fn test_layout_classes_on_body_keep_primary_content() {
        let body: String = (1..=6).map(paragraph).collect();
        let html = format!(
            r##"<html><head><title>T</title></head>
            <body class="page has-sidebar menu-open">
                <nav><a href="#">Login</a> <a href="#">Register</a></nav>
                <main class="site-main">{body}</main>
                <footer>Copyright 2024</footer>
            </body></html>"##
        );
        let extractor = BoilerplateExtractor::default();
        assert!(extractor.extract_primary(&html).chars().count() >= extractor.config().min_content_chars);

        let result = extractor.extract(&html, false);
        assert_eq!(result.outcome, ExtractionOutcome::Primary);
        assert!(result.text.starts_with("Paragraph 1 explains"));
        assert!(!result.text.contains("Login"));
        assert!(!result.text.contains("Copyright"));
    }

    #[test]
    fn test_sparse_page_yields_no_content() {
        let html = "<html><head><title>Tiny</title></head><body><p>Hello</p></body></html>";
        let result = BoilerplateExtractor::default().extract(html, false);
        assert_eq!(result.outcome, ExtractionOutcome::NoContent);
        assert!(result.text.is_empty());
        assert_eq!(result.title, Some("Tiny".to_string()));
    }

    #[test]
    fn test_force_deep_prefers_longer_text() {
        let html = article_html();
        let extractor = BoilerplateExtractor::default();
        let normal = extractor.extract(&html, false);
        let deep = extractor.extract(&html, true);
        assert!(deep.text.chars().count() >= normal.text.chars().count());
        assert_ne!(deep.outcome, ExtractionOutcome::NoContent);
    }

    #[test]
    fn test_min_content_chars_is_configurable() {
        let html = "<html><body><p>Short but acceptable body.</p></body></html>";
        let extractor = BoilerplateExtractor::new(ExtractConfig { min_content_chars: 10, ..Default::default() });
        let result = extractor.extract(html, false);
        assert_eq!(result.outcome, ExtractionOutcome::Primary);
        assert_eq!(result.text, "Short but acceptable body.");
    }

    #[test]
    fn test_title_priority() {
        let doc = Document::parse(
            r#"<html><head><meta property="og:title" content="OG"><title>Tag</title></head><body><h1>H</h1></body></html>"#,
        );
        assert_eq!(extract_title(&doc), Some("OG".to_string()));

        let doc = Document::parse("<html><body><h1> Heading  only </h1></body></html>");
        assert_eq!(extract_title(&doc), Some("Heading only".to_string()));

        let doc = Document::parse("<html><body><p>none</p></body></html>");
        assert_eq!(extract_title(&doc), None);
    }

    #[test]
    fn test_malformed_title() {
        let doc = Document::parse("<html><head><title>Unclosed title");
        assert_eq!(extract_title(&doc), Some("Unclosed title".to_string()));
    }
}
