//! The signal report and the views handed to its consumers.
//!
//! A [`SignalReport`] always has the same shape. When fetching fails the
//! scoring fields are absent, `fetch_status` is `failed`, `combined_score`
//! is `0.0` and deep analysis is skipped.

use serde::{Deserialize, Serialize};

use crate::density::DensityMetrics;
use crate::extract::ExtractionOutcome;
use crate::heuristics::{Adjustment, HeuristicScore};
use crate::pipeline::Stage;
use crate::reputation::{DomainTrust, HostCategory};
use crate::textstats::TextStats;
use crate::{FetchError, FetchErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Success,
    Failed,
}

/// What was retrieved and extracted for one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub url: String,
    pub title: Option<String>,
    /// Clean body text, possibly empty.
    pub text: String,
    pub fetch_status: FetchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FetchErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Extraction strategy used; absent when nothing was fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ExtractionOutcome>,
    /// Length, citation and vocabulary figures of `text`; absent when nothing was fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<TextStats>,
}

/// Aggregate result of scoring one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub extraction: ExtractionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heuristics: Option<HeuristicScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<DensityMetrics>,
    pub domain: DomainTrust,
    pub combined_score: f64,
    pub skip_deep_analysis: bool,
    pub stage: Stage,
}

impl SignalReport {
    /// Report for a URL that could not be fetched.
    pub fn failed(url: &str, error: &FetchError, domain: DomainTrust) -> Self {
        Self {
            extraction: ExtractionResult {
                url: url.to_string(),
                title: None,
                text: String::new(),
                fetch_status: FetchStatus::Failed,
                error: Some(error.kind()),
                error_message: Some(error.to_string()),
                outcome: None,
                stats: None,
            },
            heuristics: None,
            density: None,
            domain,
            combined_score: 0.0,
            skip_deep_analysis: true,
            stage: Stage::Errored,
        }
    }

    pub fn is_success(&self) -> bool {
        self.extraction.fetch_status == FetchStatus::Success
    }

    /// Fields read by the semantic-analysis step, with the body cut to `max_chars`.
    pub fn semantic_input(&self, max_chars: usize) -> SemanticInput {
        let (text, truncated) = truncate_chars(&self.extraction.text, max_chars);
        SemanticInput {
            url: self.extraction.url.clone(),
            title: self.extraction.title.clone(),
            text,
            truncated,
            combined_score: self.combined_score,
            skip_deep_analysis: self.skip_deep_analysis,
        }
    }

    /// Fields read by the presentation layer.
    pub fn presentation(&self) -> PresentationView {
        PresentationView {
            url: self.extraction.url.clone(),
            title: self.extraction.title.clone(),
            combined_score: self.combined_score,
            heuristic_score: self.heuristics.as_ref().map(|h| h.final_score),
            adjustments: self.heuristics.as_ref().map(|h| h.adjustments.clone()).unwrap_or_default(),
            density_combined: self.density.as_ref().map(|d| d.combined),
            stats: self.extraction.stats,
            host_category: self.domain.host_category,
            skip_deep_analysis: self.skip_deep_analysis,
            error: self.extraction.error,
        }
    }
}

/// Input for the semantic-analysis collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticInput {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
    pub truncated: bool,
    pub combined_score: f64,
    pub skip_deep_analysis: bool,
}

/// Itemized view for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationView {
    pub url: String,
    pub title: Option<String>,
    pub combined_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heuristic_score: Option<i32>,
    pub adjustments: Vec<Adjustment>,
    pub density_combined: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<TextStats>,
    pub host_category: HostCategory,
    pub skip_deep_analysis: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FetchErrorKind>,
}

/// `final × (1 + multiplier)`, clamped to `[0, 100]` and rounded to two decimals.
pub fn combine_score(final_score: i32, multiplier: f64) -> f64 {
    let combined = (f64::from(final_score) * (1.0 + multiplier)).clamp(0.0, 100.0);
    (combined * 100.0).round() / 100.0
}

fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => (text[..byte].to_string(), true),
        None => (text.to_string(), false),
    }
}
