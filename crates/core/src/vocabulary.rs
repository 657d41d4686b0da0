//! Keyword vocabularies and their compiled matchers.
//!
//! A [`Vocabulary`] is plain configuration: named categories of keywords plus
//! the [`MatchPolicy`] used to look them up. It is compiled once into a
//! [`KeywordMatcher`] at startup and shared read-only afterwards.
//!
//! Matching is always case-insensitive. Curly apostrophes in the haystack are
//! folded to `'` so that "won’t" matches a "won't" keyword.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::{Result, SignalError};

/// How keywords are located in a haystack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Keyword may appear anywhere, including inside a longer word or URL.
    #[default]
    Substring,
    /// Keyword must start and end on a word boundary.
    WordBoundary,
}

/// Named keyword categories with a matching policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(default)]
    pub policy: MatchPolicy,
    pub categories: BTreeMap<String, Vec<String>>,
}

impl Vocabulary {
    pub fn new(policy: MatchPolicy, categories: &[(&str, &[&str])]) -> Self {
        let categories = categories
            .iter()
            .map(|(name, words)| (name.to_string(), words.iter().map(|w| w.to_string()).collect()))
            .collect();
        Self { policy, categories }
    }

    /// Affiliate and sponsorship markers searched in link targets and anchor text.
    pub fn affiliate() -> Self {
        Self::new(
            MatchPolicy::Substring,
            &[
                (
                    "network",
                    &[
                        "amzn.to",
                        "shareasale.com",
                        "awin1.com",
                        "clickbank.net",
                        "linksynergy.com",
                        "go.skimresources.com",
                        "rstyle.me",
                        "anrdoezrs.net",
                        "dpbolvw.net",
                        "jdoqocy.com",
                        "tkqlhce.com",
                        "avantlink.com",
                        "pntra.com",
                        "prf.hn",
                    ],
                ),
                (
                    "tracking_param",
                    &["?tag=", "&tag=", "?aff_id=", "&aff_id=", "?affid=", "&affid=", "?ref=", "&ref=", "utm_medium=affiliate"],
                ),
                (
                    "disclosure",
                    &[
                        "affiliate link",
                        "sponsored content",
                        "paid partnership",
                        "as an amazon associate",
                        "we may earn a commission",
                    ],
                ),
            ],
        )
    }

    /// Clickbait and sensational terms searched in the visible text.
    pub fn hype() -> Self {
        Self::new(
            MatchPolicy::WordBoundary,
            &[
                (
                    "clickbait",
                    &[
                        "you won't believe",
                        "this one trick",
                        "what happened next",
                        "doctors hate",
                        "click here to buy",
                        "limited time offer",
                        "act now",
                    ],
                ),
                (
                    "sensational",
                    &[
                        "shocking",
                        "mind-blowing",
                        "jaw-dropping",
                        "game-changer",
                        "game changer",
                        "unbelievable",
                        "insane",
                        "revolutionary",
                        "miracle",
                    ],
                ),
            ],
        )
    }

    /// Terms that mark a request as code-related.
    pub fn code_terms() -> Self {
        Self::new(
            MatchPolicy::WordBoundary,
            &[(
                "code",
                &[
                    "code",
                    "snippet",
                    "example",
                    "implementation",
                    "function",
                    "api",
                    "library",
                    "algorithm",
                    "syntax",
                    "compile",
                    "rust",
                    "python",
                    "javascript",
                    "sql",
                ],
            )],
        )
    }

    fn keywords(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories
            .iter()
            .flat_map(|(category, words)| words.iter().map(move |w| (category.as_str(), w.as_str())))
    }
}

/// A match found by a [`KeywordMatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordHit {
    pub category: String,
    pub keyword: String,
}

/// Compiled, immutable form of a [`Vocabulary`].
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    regex: Regex,
    keywords: Vec<(String, String)>,
}

impl KeywordMatcher {
    /// Compiles a vocabulary. `name` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::InvalidVocabulary`] if the vocabulary is empty
    /// or the resulting pattern cannot be compiled.
    pub fn compile(name: &str, vocabulary: &Vocabulary) -> Result<Self> {
        let mut keywords: Vec<(String, String)> = vocabulary
            .keywords()
            .filter(|(_, w)| !w.trim().is_empty())
            .map(|(c, w)| (c.to_string(), fold_text(w.trim())))
            .collect();

        if keywords.is_empty() {
            return Err(SignalError::InvalidVocabulary { name: name.to_string(), reason: "no keywords".to_string() });
        }

        // Longest first so overlapping alternatives report the most specific keyword.
        keywords.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.1.cmp(&b.1)));
        keywords.dedup_by(|a, b| a.1 == b.1);

        let alternation = keywords
            .iter()
            .map(|(_, w)| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = match vocabulary.policy {
            MatchPolicy::Substring => format!("({alternation})"),
            MatchPolicy::WordBoundary => format!(r"(?:^|\b|\W)({alternation})(?:$|\b|\W)"),
        };

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| SignalError::InvalidVocabulary { name: name.to_string(), reason: e.to_string() })?;

        Ok(Self { regex, keywords })
    }

    /// Returns the first keyword found in `haystack`.
    pub fn find(&self, haystack: &str) -> Option<KeywordHit> {
        let folded = fold_text(haystack);
        let caps = self.regex.captures(&folded)?;
        let found = caps.get(1)?.as_str().to_lowercase();
        self.keywords
            .iter()
            .find(|(_, w)| *w == found)
            .map(|(category, keyword)| KeywordHit { category: category.clone(), keyword: keyword.clone() })
    }

    /// Returns `true` if any keyword occurs in `haystack`.
    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(&fold_text(haystack))
    }

    /// Counts non-overlapping keyword occurrences in `haystack`.
    pub fn count(&self, haystack: &str) -> usize {
        self.regex.find_iter(&fold_text(haystack)).count()
    }
}

fn fold_text(text: &str) -> String {
    text.replace(['\u{2019}', '\u{2018}'], "'").to_lowercase()
}
