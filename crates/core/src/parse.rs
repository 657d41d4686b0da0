//! HTML parsing and DOM queries.
//!
//! Thin wrappers around `scraper` used by both the extractor and the
//! structural scorer. Parsing never fails: html5ever recovers from any
//! malformed input, so every string yields a [`Document`].
//!
//! # Example
//!
//! ```rust
//! use sgnl_core::parse::Document;
//!
//! let doc = Document::parse("<html><head><title>Test</title></head><body><p>Hello</p></body></html>");
//! assert_eq!(doc.title(), Some("Test".to_string()));
//! assert_eq!(doc.select("p").unwrap().len(), 1);
//! ```

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

pub use crate::error::SelectorError;

/// Tags whose text is never visible to a reader.
pub(crate) const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

fn compile(selector: &str) -> Result<Selector, SelectorError> {
    Selector::parse(selector).map_err(|e| SelectorError(format!("{selector}: {e}")))
}

/// A parsed HTML document.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>, SelectorError> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Returns the trimmed content of the `<title>` element, if non-empty.
    pub fn title(&self) -> Option<String> {
        let selector = compile("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    }

    /// Returns the `content` of a `<meta>` tag matched by `property` or `name`.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        for attr in ["property", "name"] {
            let selector = compile(&format!(r#"meta[{attr}="{key}"]"#)).ok()?;
            if let Some(content) = self
                .html
                .select(&selector)
                .filter_map(|el| el.value().attr("content"))
                .map(normalize_whitespace)
                .find(|c| !c.is_empty())
            {
                return Some(content);
            }
        }
        None
    }

    /// Returns the `<body>` element, if the document has one.
    pub fn body(&'_ self) -> Option<Element<'_>> {
        let selector = compile("body").ok()?;
        self.html.select(&selector).next().map(|el| Element { element: el })
    }

    /// Visible text of the whole document: text nodes outside script, style,
    /// noscript, template and head, trimmed and joined by single spaces.
    pub fn visible_text(&self) -> String {
        Element { element: self.html.root_element() }.visible_text()
    }
}

/// A wrapper around scraper's `ElementRef`.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Text nodes outside invisible subtrees, trimmed and joined by single spaces.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sgnl_core::parse::Document;
    ///
    /// let doc = Document::parse("<div>Shown <script>hidden()</script>  text</div>");
    /// let div = &doc.select("div").unwrap()[0];
    /// assert_eq!(div.visible_text(), "Shown text");
    /// ```
    pub fn visible_text(&self) -> String {
        let mut parts = Vec::new();
        for node in self.element.descendants() {
            if let Node::Text(text) = node.value() {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|el| INVISIBLE_TAGS.contains(&el.name()))
                });
                if hidden {
                    continue;
                }
                let trimmed = normalize_whitespace(text);
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            }
        }
        parts.join(" ")
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>, SelectorError> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Parent element, if the parent node is an element.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(|element| Element { element })
    }

    /// Returns `true` if both wrappers point at the same DOM node.
    pub fn same_node(&self, other: &Element<'_>) -> bool {
        self.element.id() == other.element.id()
    }

    /// Returns `true` if any ancestor (excluding `self`) has one of `tags`,
    /// stopping the walk at `boundary` when given.
    ///
    /// # Arguments
    ///
    /// * `tags` - Lowercase tag names to look for
    /// * `boundary` - Ancestor at which the walk stops without matching
    ///
    /// # Example
    ///
    /// ```rust
    /// use sgnl_core::parse::Document;
    ///
    /// let doc = Document::parse("<article><pre><code>x</code></pre></article>");
    /// let code = &doc.select("code").unwrap()[0];
    /// let pre = &doc.select("pre").unwrap()[0];
    /// assert!(code.has_ancestor_in(&["article"], None));
    /// assert!(!code.has_ancestor_in(&["article"], Some(pre)));
    /// ```
    pub fn has_ancestor_in(&self, tags: &[&str], boundary: Option<&Element<'a>>) -> bool {
        for ancestor in self.element.ancestors() {
            if boundary.is_some_and(|b| b.element.id() == ancestor.id()) {
                return false;
            }
            if let Some(el) = ancestor.value().as_element()
                && tags.contains(&el.name())
            {
                return true;
            }
        }
        false
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
