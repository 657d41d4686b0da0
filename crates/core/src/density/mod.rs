//! Lexical density of clean body text.
//!
//! Three sub-scores are combined with fixed weights:
//!
//! | metric                    | weight | meaning                                        |
//! |---------------------------|--------|------------------------------------------------|
//! | `idea_density`            | 0.5    | proposition-bearing words per word             |
//! | `dependency_idea_density` | 0.3    | distinct dependency relations per word         |
//! | `readability`             | 0.2    | Flesch reading ease mapped to difficulty `[0,1]` |
//!
//! Texts shorter than the minimum word count are not measured; they are
//! reported as [`DensityOutcome::Skipped`], which always gates deep analysis.
//!
//! # Example
//!
//! ```rust
//! use sgnl_core::density::{DensityMetrics, LexicalDensityScorer};
//!
//! let metrics = DensityMetrics::new(0.3, 0.3, 0.3, 0.45);
//! assert!(metrics.below_threshold);
//!
//! let scorer = LexicalDensityScorer::new(0.45, 25).unwrap();
//! assert!(scorer.score("Too short.").below_threshold());
//! ```

pub mod lexicon;
pub mod readability;

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Result, SignalConfig, SignalError};
use lexicon::{WordClass, counts_as_proposition, tag_sentence};
use readability::{ReadabilityScores, TextCounts, flesch_reading_ease, reading_difficulty};

pub const IDEA_WEIGHT: f64 = 0.5;
pub const DEPENDENCY_WEIGHT: f64 = 0.3;
pub const READABILITY_WEIGHT: f64 = 0.2;

const WORD_PATTERN: &str = r"[A-Za-z]+(?:['\x{2019}][A-Za-z]+)*|[0-9]+(?:[.,][0-9]+)*";
const SENTENCE_PATTERN: &str = r"[.!?]+(?:\s+|$)|\n\s*\n";

/// Density sub-scores and the gate decision. All values lie in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityMetrics {
    pub idea_density: f64,
    pub dependency_idea_density: f64,
    pub readability: f64,
    pub combined: f64,
    pub below_threshold: bool,
    /// Grade-level indices of the measured text. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readability_scores: Option<ReadabilityScores>,
}

impl DensityMetrics {
    /// Clamps the sub-scores, combines them and applies `threshold`.
    pub fn new(idea_density: f64, dependency_idea_density: f64, readability: f64, threshold: f64) -> Self {
        let idea_density = round4(unit(idea_density));
        let dependency_idea_density = round4(unit(dependency_idea_density));
        let readability = round4(unit(readability));
        let combined = round4(unit(
            IDEA_WEIGHT * idea_density + DEPENDENCY_WEIGHT * dependency_idea_density + READABILITY_WEIGHT * readability,
        ));
        Self {
            idea_density,
            dependency_idea_density,
            readability,
            combined,
            below_threshold: combined < threshold,
            readability_scores: None,
        }
    }

    pub fn with_readability_scores(mut self, scores: Option<ReadabilityScores>) -> Self {
        self.readability_scores = scores;
        self
    }
}

/// Result of density scoring.
#[derive(Debug, Clone, PartialEq)]
pub enum DensityOutcome {
    Computed(DensityMetrics),
    /// Text was empty or below the minimum word count.
    Skipped { words: usize },
}

impl DensityOutcome {
    /// Skipped text always counts as below threshold.
    pub fn below_threshold(&self) -> bool {
        match self {
            DensityOutcome::Computed(metrics) => metrics.below_threshold,
            DensityOutcome::Skipped { .. } => true,
        }
    }

    pub fn metrics(&self) -> Option<&DensityMetrics> {
        match self {
            DensityOutcome::Computed(metrics) => Some(metrics),
            DensityOutcome::Skipped { .. } => None,
        }
    }

    pub fn into_metrics(self) -> Option<DensityMetrics> {
        match self {
            DensityOutcome::Computed(metrics) => Some(metrics),
            DensityOutcome::Skipped { .. } => None,
        }
    }
}

/// Stateless density scorer with its tokenizers compiled once.
#[derive(Debug, Clone)]
pub struct LexicalDensityScorer {
    threshold: f64,
    min_words: usize,
    words: Regex,
    sentences: Regex,
}

impl LexicalDensityScorer {
    /// # Errors
    ///
    /// Returns [`SignalError::InvalidConfig`] if `threshold` is outside `[0, 1]`.
    pub fn new(threshold: f64, min_words: usize) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SignalError::InvalidConfig(format!("density threshold {threshold} is outside [0, 1]")));
        }
        let words = Regex::new(WORD_PATTERN).map_err(|e| SignalError::InvalidConfig(e.to_string()))?;
        let sentences = Regex::new(SENTENCE_PATTERN).map_err(|e| SignalError::InvalidConfig(e.to_string()))?;
        Ok(Self { threshold, min_words: min_words.max(1), words, sentences })
    }

    pub fn from_config(config: &SignalConfig) -> Result<Self> {
        Self::new(config.density_threshold, config.min_words)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Measures `text`. Never fails; unusual input yields low or skipped scores.
    pub fn score(&self, text: &str) -> DensityOutcome {
        let sentences = self.sentences(text);
        let words: usize = sentences.iter().map(Vec::len).sum();
        if words < self.min_words {
            return DensityOutcome::Skipped { words };
        }

        let mut propositions = 0usize;
        let mut dependencies = HashSet::new();
        for sentence in &sentences {
            let tagged = tag_sentence(sentence);
            propositions += tagged.iter().filter(|&&(word, class)| counts_as_proposition(word, class)).count();
            dependencies.extend(dependency_relations(&tagged));
        }

        let counts = TextCounts::from_sentences(&sentences);
        let total = words as f64;
        let reading_ease = flesch_reading_ease(words, counts.sentences, counts.syllables);

        let metrics = DensityMetrics::new(
            propositions as f64 / total,
            dependencies.len() as f64 / total,
            reading_difficulty(reading_ease),
            self.threshold,
        );
        DensityOutcome::Computed(metrics.with_readability_scores(ReadabilityScores::from_counts(&counts)))
    }

    /// Lower-cased words grouped by sentence, dropping empty sentences.
    fn sentences(&self, text: &str) -> Vec<Vec<String>> {
        self.sentences
            .split(text)
            .map(|sentence| {
                self.words
                    .find_iter(sentence)
                    .map(|m| m.as_str().replace('\u{2019}', "'").to_lowercase())
                    .collect::<Vec<_>>()
            })
            .filter(|words| !words.is_empty())
            .collect()
    }
}

/// Distinct `(relation, dependent)` pairs of one sentence. The caller merges
/// the sets, so a relation repeated anywhere in the text counts once.
///
/// Relations are attached from word classes and local order only: a verb
/// takes a subject when a nominal precedes it in the clause and an object
/// when one follows; prepositions govern the next nominal; subordinators and
/// relative pronouns open a new clause.
fn dependency_relations<'a>(tagged: &[(&'a str, WordClass)]) -> HashSet<(&'static str, &'a str)> {
    let mut relations = HashSet::new();
    let mut nominal_in_clause = false;

    for (i, &(word, class)) in tagged.iter().enumerate() {
        let next = tagged.get(i + 1).copied();
        match class {
            WordClass::Noun | WordClass::Pronoun => nominal_in_clause = true,
            WordClass::Verb => {
                relations.insert((if nominal_in_clause { "nsubj" } else { "root" }, word));
                if let Some((object, WordClass::Noun | WordClass::Pronoun)) = next {
                    relations.insert(("dobj", object));
                }
            }
            WordClass::Adjective => {
                let attributive = matches!(next, Some((_, WordClass::Noun | WordClass::Adjective)));
                relations.insert((if attributive { "amod" } else { "acomp" }, word));
            }
            WordClass::Adverb => {
                relations.insert(("advmod", word));
            }
            WordClass::Negation => {
                relations.insert(("neg", word));
            }
            WordClass::Number => {
                relations.insert(("nummod", word));
            }
            WordClass::Preposition => {
                relations.insert(("prep", word));
                if let Some((object, WordClass::Noun | WordClass::Pronoun | WordClass::Number)) = next {
                    relations.insert(("pobj", object));
                }
            }
            WordClass::CoordinatingConjunction => {
                if let Some((conjunct, c)) = next
                    && c != WordClass::Determiner
                {
                    relations.insert(("conj", conjunct));
                }
            }
            WordClass::SubordinatingConjunction => {
                relations.insert(("mark", word));
                nominal_in_clause = false;
            }
            WordClass::RelativePronoun => {
                relations.insert(("relcl", word));
                nominal_in_clause = true;
            }
            WordClass::Auxiliary => {
                if !matches!(next, Some((_, WordClass::Verb | WordClass::Negation | WordClass::Adverb))) {
                    relations.insert(("cop", word));
                }
            }
            WordClass::Determiner => {}
        }
    }

    relations
}

fn unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
