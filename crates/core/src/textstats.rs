//! Descriptive statistics of extracted body text.
//!
//! These numbers are reported next to the scores so that consumers can
//! apply their own length or citation cut-offs. None of them moves the
//! heuristic score, the combined score or the deep-analysis gate.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::{Result, SignalError};

/// Inline citations, paper hosts and figure/table callouts.
const REFERENCE_PATTERN: &str = r"\[\d+\]|arxiv\.|doi\.org|et al\.|fig(?:ure|\.)\s?\d|table \d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStats {
    /// Characters of clean body text.
    pub char_count: usize,
    /// Whitespace-separated tokens.
    pub word_count: usize,
    /// Matches of citation-like markers.
    pub reference_count: usize,
    /// Distinct lower-cased tokens per token, in `[0, 1]`.
    pub vocabulary_diversity: f64,
}

#[derive(Debug, Clone)]
pub struct TextProfiler {
    references: Regex,
}

impl TextProfiler {
    pub fn new() -> Result<Self> {
        let references = RegexBuilder::new(REFERENCE_PATTERN)
            .case_insensitive(true)
            .build()
            .map_err(|e| SignalError::InvalidConfig(e.to_string()))?;
        Ok(Self { references })
    }

    /// # Example
    ///
    /// ```rust
    /// use sgnl_core::textstats::TextProfiler;
    ///
    /// let stats = TextProfiler::new().unwrap().measure("As shown in [3] and Figure 2, the cache wins.");
    /// assert_eq!(stats.word_count, 10);
    /// assert_eq!(stats.reference_count, 2);
    /// ```
    pub fn measure(&self, text: &str) -> TextStats {
        let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        let distinct = words.iter().collect::<HashSet<_>>().len();
        let vocabulary_diversity = if words.is_empty() {
            0.0
        } else {
            (distinct as f64 / words.len() as f64 * 10_000.0).round() / 10_000.0
        };

        TextStats {
            char_count: text.chars().count(),
            word_count: words.len(),
            reference_count: self.references.find_iter(text).count(),
            vocabulary_diversity,
        }
    }
}
