//! Content extraction and multi-signal quality scoring for web documents.
//!
//! The pipeline fetches a page, separates its body text from boilerplate,
//! scores the raw markup with structural heuristics, measures the lexical
//! density of the clean text and adjusts the result by host reputation. The
//! outcome is one [`SignalReport`] per URL, including a decision on whether
//! the document is worth an expensive semantic analysis pass.
//!
//! # Example
//!
//! ```rust,no_run
//! use sgnl_core::{ScoreContext, SignalConfig, SignalPipeline};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = SignalPipeline::new(&SignalConfig::default())?;
//! let report = pipeline.score_url("https://example.com/article", &ScoreContext::default()).await;
//! println!("{} (skip deep analysis: {})", report.combined_score, report.skip_deep_analysis);
//! # Ok(())
//! # }
//! ```

pub mod candidates;
pub mod config;
pub mod density;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod heuristics;
pub mod parse;
pub mod pipeline;
pub mod preprocess;
pub mod report;
pub mod reputation;
pub mod textstats;
pub mod vocabulary;

pub use config::{BatchConfig, SignalConfig, SignalConfigBuilder};
pub use density::readability::ReadabilityScores;
pub use density::{DensityMetrics, DensityOutcome, LexicalDensityScorer};
pub use error::{FetchError, FetchErrorKind, Result, SelectorError, SignalError};
pub use extract::{BoilerplateExtractor, ExtractConfig, ExtractedContent, ExtractionOutcome};
pub use fetch::{FetchConfig, FetchedPage, Fetcher};
pub use heuristics::{Adjustment, HeuristicScore, Signal, SignalStatus, StructuralHeuristicScorer};
pub use parse::Document;
pub use pipeline::{ScoreContext, SignalPipeline, Stage};
pub use report::{ExtractionResult, FetchStatus, PresentationView, SemanticInput, SignalReport, combine_score};
pub use reputation::{DomainReputationResolver, DomainRule, DomainTable, DomainTrust, HostCategory};
pub use textstats::{TextProfiler, TextStats};
pub use vocabulary::{KeywordHit, KeywordMatcher, MatchPolicy, Vocabulary};
