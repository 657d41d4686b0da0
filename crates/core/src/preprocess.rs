//! Streaming HTML cleanup ahead of content extraction.
//!
//! Removes what a reader never sees (scripts, embeds, hidden nodes,
//! comments) and, for the primary strategy, page chrome and boilerplate
//! containers recognized by their class or id. Document-level containers
//! (`html`, `body`, `main`, `article`) are never removed, whatever classes
//! they carry.

use lol_html::{HtmlRewriter, Settings, comments, element};

/// Configuration for HTML preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove script, style, noscript and template tags
    pub remove_invisible: bool,
    /// Whether to remove iframe, svg, canvas and other embedded media
    pub remove_embeds: bool,
    /// Whether to remove page chrome: nav, header-level menus, footer, aside, form
    pub remove_chrome: bool,
    /// Whether to remove elements whose class or id looks like an ad, widget or sidebar
    pub remove_ad_like: bool,
    /// Whether to keep ad-like elements that also carry a positive content marker
    pub keep_positive: bool,
    /// Whether to remove hidden elements
    pub remove_hidden: bool,
    /// Whether to remove HTML comments
    pub remove_comments: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            remove_invisible: true,
            remove_embeds: true,
            remove_chrome: true,
            remove_ad_like: true,
            keep_positive: true,
            remove_hidden: true,
            remove_comments: true,
        }
    }
}

impl PreprocessConfig {
    /// Only drops content a reader can never see. Used by the fallback extraction strategy.
    pub fn light() -> Self {
        Self {
            remove_invisible: true,
            remove_embeds: true,
            remove_chrome: false,
            remove_ad_like: false,
            keep_positive: true,
            remove_hidden: false,
            remove_comments: true,
        }
    }
}

const INVISIBLE_SELECTOR: &str = "script, style, noscript, template";
const EMBED_SELECTOR: &str = "iframe, svg, canvas, object, embed";
const CHROME_SELECTOR: &str = "nav, footer, aside, form, dialog";

/// Class/id tokens that mark boilerplate containers
const AD_LIKE_TOKENS: &[&str] = &[
    "ad",
    "ads",
    "adsbygoogle",
    "advert",
    "advertisement",
    "banner",
    "breadcrumb",
    "breadcrumbs",
    "comment",
    "comments",
    "cookie",
    "cookies",
    "menu",
    "modal",
    "newsletter",
    "popup",
    "promo",
    "related",
    "share",
    "sharing",
    "sidebar",
    "social",
    "sponsor",
    "sponsored",
    "subscribe",
];

/// Class/id tokens that mark main content
const POSITIVE_TOKENS: &[&str] = &["article", "body", "content", "entry", "main", "post", "story", "text"];

/// Containers that hold the document itself and are never removed
const PROTECTED_TAGS: &[&str] = &["html", "head", "body", "main", "article"];

/// How a boilerplate class or id is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Boilerplate {
    /// Not boilerplate.
    None,
    /// The element is a boilerplate block (`sidebar`, `ad-slot`, `related-posts`): drop it with its content.
    Drop,
    /// The marker only modifies a wrapper (`has-sidebar`, `page-with-ads`): unwrap and keep the content.
    Unwrap,
}

/// Preprocess HTML by removing boilerplate elements.
///
/// Rewriting failures are not fatal: the input is returned unchanged.
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let mut handlers = Vec::new();

    if config.remove_invisible {
        handlers.push(element!(INVISIBLE_SELECTOR, |el| {
            el.remove();
            Ok(())
        }));
    }

    if config.remove_embeds {
        handlers.push(element!(EMBED_SELECTOR, |el| {
            el.remove();
            Ok(())
        }));
    }

    if config.remove_chrome {
        handlers.push(element!(CHROME_SELECTOR, |el| {
            el.remove();
            Ok(())
        }));
    }

    if config.remove_ad_like || config.remove_hidden {
        let remove_ad_like = config.remove_ad_like;
        let remove_hidden = config.remove_hidden;
        let keep_positive = config.keep_positive;
        handlers.push(element!("*", move |el| {
            if el.removed() || PROTECTED_TAGS.contains(&el.tag_name().as_str()) {
                return Ok(());
            }

            if remove_hidden {
                let style = el.get_attribute("style").unwrap_or_default();
                let aria_hidden = el.get_attribute("aria-hidden").is_some_and(|v| v.eq_ignore_ascii_case("true"));
                if el.has_attribute("hidden") || aria_hidden || is_hidden_style(&style) {
                    el.remove();
                    return Ok(());
                }
            }

            if remove_ad_like {
                let id = el.get_attribute("id").unwrap_or_default();
                let class = el.get_attribute("class").unwrap_or_default();
                match classify_boilerplate(&id, &class, keep_positive) {
                    Boilerplate::Drop => el.remove(),
                    Boilerplate::Unwrap => el.remove_and_keep_content(),
                    Boilerplate::None => {}
                }
            }

            Ok(())
        }));
    }

    if config.remove_comments {
        handlers.push(comments!("*", |c| {
            c.remove();
            Ok(())
        }));
    }

    if handlers.is_empty() {
        return html.to_string();
    }

    let mut output = Vec::with_capacity(html.len());
    let mut rewriter = HtmlRewriter::new(
        Settings { element_content_handlers: handlers, ..Default::default() },
        |c: &[u8]| output.extend_from_slice(c),
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }

    if rewriter.end().is_err() {
        return html.to_string();
    }

    String::from_utf8_lossy(&output).into_owned()
}

fn tokens(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

/// Classifies an element by its id and class names.
///
/// A name whose leading segment is an ad-like token (`sidebar`, `ad-slot`,
/// `newsletter-signup`) marks a boilerplate block. An ad-like token in a later
/// segment (`has-sidebar`, `page-with-ads`) only describes the layout of a
/// wrapper, which is unwrapped so its content survives. Any positive content
/// token overrides both when `keep_positive` is set.
pub(crate) fn classify_boilerplate(id: &str, class: &str, keep_positive: bool) -> Boilerplate {
    if keep_positive && tokens(id).chain(tokens(class)).any(|t| POSITIVE_TOKENS.contains(&t.as_str())) {
        return Boilerplate::None;
    }

    let mut verdict = Boilerplate::None;
    for name in std::iter::once(id).chain(class.split_whitespace()) {
        let mut segments = tokens(name);
        if segments.next().is_some_and(|first| AD_LIKE_TOKENS.contains(&first.as_str())) {
            return Boilerplate::Drop;
        }
        if segments.any(|t| AD_LIKE_TOKENS.contains(&t.as_str())) {
            verdict = Boilerplate::Unwrap;
        }
    }
    verdict
}

fn is_hidden_style(style: &str) -> bool {
    let compact: String = style
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.contains("display:none") || compact.contains("visibility:hidden")
}
