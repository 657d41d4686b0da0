//! Readability-style scoring of content containers.
//!
//! The boilerplate extractor uses these scores to decide which container
//! holds the article body. Paragraph-like elements award points to their
//! parent and grandparent; containers are then damped by their link density.

use crate::parse::{Document, Element};

/// Configuration for container scoring
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Minimum score for a container to be preferred over `<body>`
    pub min_score_threshold: f64,
    /// Weight for positive class/ID patterns
    pub positive_weight: f64,
    /// Weight for negative class/ID patterns
    pub negative_weight: f64,
    /// Maximum content density score from character count
    pub max_char_density_score: f64,
    /// Characters per point for content density scoring
    pub chars_per_point: usize,
    /// Paragraphs shorter than this are ignored
    pub min_paragraph_chars: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            min_score_threshold: 20.0,
            positive_weight: 25.0,
            negative_weight: -25.0,
            max_char_density_score: 3.0,
            chars_per_point: 100,
            min_paragraph_chars: 25,
        }
    }
}

/// Tags that may hold the main content
pub(crate) const CONTAINER_SELECTOR: &str = "article, main, section, div, td";

/// Tags whose text awards points to their containers
const PARAGRAPH_SELECTOR: &str = "p, pre, blockquote, td";

/// Positive patterns that suggest an element contains main content
const POSITIVE_PATTERNS: &[&str] = &[
    "article", "body", "content", "entry", "hentry", "h-entry", "main", "page", "post", "text", "blog", "story",
];

/// Negative patterns that suggest an element does NOT contain main content
const NEGATIVE_PATTERNS: &[&str] = &[
    "banner",
    "breadcrumb",
    "combx",
    "comment",
    "community",
    "disqus",
    "extra",
    "foot",
    "header",
    "menu",
    "related",
    "remark",
    "rss",
    "shoutbox",
    "sidebar",
    "sponsor",
    "ad-break",
    "agegate",
    "pagination",
    "pager",
    "popup",
];

/// Base score for an element based on its tag name
pub fn base_tag_score(element: &Element<'_>) -> f64 {
    match element.tag_name().as_str() {
        "article" => 10.0,
        "main" | "section" => 8.0,
        "div" => 5.0,
        "td" | "blockquote" => 3.0,
        "form" => -3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" => -5.0,
        _ => 0.0,
    }
}

fn matches_any(value: &str, patterns: &[&str]) -> bool {
    let lower = value.to_ascii_lowercase();
    patterns.iter().any(|p| lower.contains(p))
}

/// Class/ID weight adjustment for an element
///
/// The id is checked before the class list; within each, a positive match wins.
pub fn class_id_weight(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    if let Some(id) = element.attr("id") {
        if matches_any(id, POSITIVE_PATTERNS) {
            return config.positive_weight;
        }
        if matches_any(id, NEGATIVE_PATTERNS) {
            return config.negative_weight;
        }
    }

    if let Some(class) = element.attr("class") {
        for class_name in class.split_whitespace() {
            if matches_any(class_name, POSITIVE_PATTERNS) {
                return config.positive_weight;
            }
            if matches_any(class_name, NEGATIVE_PATTERNS) {
                return config.negative_weight;
            }
        }
    }

    0.0
}

/// Points a paragraph awards: one for existing, one per comma, plus length.
pub fn paragraph_score(text: &str, config: &ScoreConfig) -> f64 {
    let chars = text.chars().count();
    let char_score = ((chars / config.chars_per_point) as f64).min(config.max_char_density_score);
    let comma_score = text.matches(',').count() as f64;
    1.0 + char_score + comma_score
}

/// Ratio of link text characters to total text characters, 0.0 to 1.0.
pub fn link_density(element: &Element<'_>) -> f64 {
    let text_length = element.text().chars().count();
    if text_length == 0 {
        return 0.0;
    }

    let link_text_length = element
        .select("a")
        .unwrap_or_default()
        .iter()
        .map(|link| link.text().chars().count())
        .sum::<usize>();

    (link_text_length as f64 / text_length as f64).min(1.0)
}

/// A scored container
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub element: Element<'a>,
    pub score: f64,
}

/// Scores every container in `doc` and returns the best one above the threshold.
pub fn top_candidate<'a>(doc: &'a Document, config: &ScoreConfig) -> Option<Candidate<'a>> {
    let mut candidates: Vec<Candidate<'a>> = Vec::new();

    let paragraphs = doc.select(PARAGRAPH_SELECTOR).unwrap_or_default();
    for paragraph in paragraphs {
        let text = paragraph.text();
        if text.trim().chars().count() < config.min_paragraph_chars {
            continue;
        }
        let points = paragraph_score(&text, config);

        let Some(parent) = paragraph.parent() else { continue };
        award(&mut candidates, parent.clone(), points, config);
        if let Some(grandparent) = parent.parent() {
            award(&mut candidates, grandparent, points / 2.0, config);
        }
    }

    candidates
        .into_iter()
        .map(|mut c| {
            c.score *= 1.0 - link_density(&c.element);
            c
        })
        .filter(|c| c.score >= config.min_score_threshold)
        .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
}

fn award<'a>(candidates: &mut Vec<Candidate<'a>>, element: Element<'a>, points: f64, config: &ScoreConfig) {
    if !matches!(element.tag_name().as_str(), "article" | "main" | "section" | "div" | "td" | "body") {
        return;
    }
    if let Some(existing) = candidates.iter_mut().find(|c| c.element.same_node(&element)) {
        existing.score += points;
        return;
    }
    let initial = base_tag_score(&element) + class_id_weight(&element, config);
    candidates.push(Candidate { element, score: initial + points });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(doc: &'a Document, selector: &str) -> Element<'a> {
        doc.select(selector).unwrap().into_iter().next().unwrap()
    }

    #[test]
    fn test_base_tag_score() {
        let doc = Document::parse("<article>a</article><section>b</section><div>c</div><nav>d</nav><form>e</form>");
        assert_eq!(base_tag_score(&first(&doc, "article")), 10.0);
        assert_eq!(base_tag_score(&first(&doc, "section")), 8.0);
        assert_eq!(base_tag_score(&first(&doc, "div")), 5.0);
        assert_eq!(base_tag_score(&first(&doc, "nav")), -5.0);
        assert_eq!(base_tag_score(&first(&doc, "form")), -3.0);
    }

    #[test]
    fn test_class_weight_positive() {
        let doc = Document::parse(r#"<div class="article-content">Content</div>"#);
        assert_eq!(class_id_weight(&first(&doc, "div"), &ScoreConfig::default()), 25.0);
    }

    #[test]
    fn test_class_weight_negative() {
        let doc = Document::parse(r#"<div class="sidebar">Content</div>"#);
        assert_eq!(class_id_weight(&first(&doc, "div"), &ScoreConfig::default()), -25.0);
    }

    #[test]
    fn test_class_weight_positive_id_wins() {
        let doc = Document::parse(r#"<div id="main-article" class="sidebar">Content</div>"#);
        assert_eq!(class_id_weight(&first(&doc, "div"), &ScoreConfig::default()), 25.0);
    }

    #[test]
    fn test_class_weight_no_match() {
        let doc = Document::parse(r#"<div class="container" id="wrapper">Content</div>"#);
        assert_eq!(class_id_weight(&first(&doc, "div"), &ScoreConfig::default()), 0.0);
    }

    #[test]
    fn test_paragraph_score() {
        let config = ScoreConfig::default();
        assert_eq!(paragraph_score("short", &config), 1.0);
        assert_eq!(paragraph_score("a, b, c", &config), 3.0);
        assert_eq!(paragraph_score(&"a".repeat(500), &config), 4.0);
    }

    #[test]
    fn test_link_density() {
        let doc = Document::parse(r##"<div><a href="#">Link text</a></div><section>Some text <a href="#">link</a> more</section><p>plain</p>"##);
        assert_eq!(link_density(&first(&doc, "div")), 1.0);
        let mixed = link_density(&first(&doc, "section"));
        assert!(mixed > 0.0 && mixed < 1.0);
        assert_eq!(link_density(&first(&doc, "p")), 0.0);
    }

    #[test]
    fn test_top_candidate_prefers_article_body() {
        let html = r##"
            <body>
                <div class="menu"><a href="#">Home</a> <a href="#">About</a></div>
                <div class="post-body">
                    <p>The borrow checker enforces aliasing rules at compile time, which removes a class of bugs.</p>
                    <p>Lifetimes describe how long references stay valid, and the compiler infers most of them.</p>
                    <p>When inference fails, explicit annotations tie input and output lifetimes together, safely.</p>
                </div>
            </body>
        "##;
        let doc = Document::parse(html);
        let top = top_candidate(&doc, &ScoreConfig::default()).unwrap();
        assert_eq!(top.element.attr("class"), Some("post-body"));
    }

    #[test]
    fn test_top_candidate_none_for_sparse_page() {
        let doc = Document::parse("<body><div><p>Too short.</p></div></body>");
        assert!(top_candidate(&doc, &ScoreConfig::default()).is_none());
    }
}
