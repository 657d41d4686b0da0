//! Scoring orchestration.
//!
//! A [`SignalPipeline`] is built once from a [`SignalConfig`] and shared by
//! reference. Each document moves through
//! `Fetching → Extracting → Scoring → Done`; a fetch failure ends in
//! `Errored` with a report that carries the error instead of scores.
//!
//! Batches run with bounded concurrency and a per-URL time budget. One URL's
//! failure never affects the others, and reports come back in input order.
//!
//! # Example
//!
//! ```rust
//! use sgnl_core::{ScoreContext, SignalConfig, SignalPipeline};
//!
//! let pipeline = SignalPipeline::new(&SignalConfig::default()).unwrap();
//! let report = pipeline.score_html(
//!     "<html><head><title>Notes</title></head><body><p>Short.</p></body></html>",
//!     Some("https://example.com/notes"),
//!     &ScoreContext::default(),
//! );
//! assert!(report.is_success());
//! assert!(report.skip_deep_analysis);
//! ```

use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{BatchConfig, SignalConfig};
use crate::density::LexicalDensityScorer;
use crate::extract::BoilerplateExtractor;
use crate::fetch::{FetchedPage, Fetcher};
use crate::heuristics::StructuralHeuristicScorer;
use crate::reputation::DomainReputationResolver;
use crate::report::{ExtractionResult, FetchStatus, SignalReport, combine_score};
use crate::textstats::TextProfiler;
use crate::{FetchError, Result};

/// Position of a document in the scoring state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetching,
    Extracting,
    Scoring,
    Done,
    Errored,
}

impl Stage {
    /// Whether `self → next` is an allowed transition.
    pub fn can_advance_to(self, next: Stage) -> bool {
        matches!(
            (self, next),
            (Stage::Fetching, Stage::Extracting)
                | (Stage::Extracting, Stage::Scoring)
                | (Stage::Scoring, Stage::Done)
                | (Stage::Fetching, Stage::Errored)
                | (Stage::Extracting, Stage::Errored)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Errored)
    }
}

/// Per-request context supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreContext {
    /// Originating search query, if any.
    pub query: Option<String>,
    /// Run both extraction strategies and keep the longer text.
    pub force_deep: bool,
}

impl ScoreContext {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self { query: Some(query.into()), force_deep: false }
    }
}

/// Tracks and logs stage transitions of one document.
struct StageTracker<'a> {
    url: &'a str,
    stage: Stage,
}

impl<'a> StageTracker<'a> {
    fn start(url: &'a str, stage: Stage) -> Self {
        debug!(url, stage = ?stage, "pipeline started");
        Self { url, stage }
    }

    fn advance(&mut self, next: Stage) -> Stage {
        if !self.stage.can_advance_to(next) {
            warn!(url = self.url, from = ?self.stage, to = ?next, "unexpected stage transition");
        }
        debug!(url = self.url, from = ?self.stage, to = ?next, "stage transition");
        self.stage = next;
        next
    }
}

/// The document scoring pipeline. Immutable after construction.
#[derive(Debug, Clone)]
pub struct SignalPipeline {
    fetcher: Fetcher,
    extractor: BoilerplateExtractor,
    heuristics: StructuralHeuristicScorer,
    density: LexicalDensityScorer,
    profiler: TextProfiler,
    domains: DomainReputationResolver,
    batch: BatchConfig,
    max_semantic_chars: usize,
}

impl SignalPipeline {
    /// Validates `config` and compiles every scorer.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::SignalError`] for invalid configuration, an
    /// uncompilable vocabulary or an HTTP client that cannot be built.
    pub fn new(config: &SignalConfig) -> Result<Self> {
        config.validate()?;
        let pipeline = Self {
            fetcher: Fetcher::new(config.fetch.clone())?,
            extractor: BoilerplateExtractor::new(config.extract.clone()),
            heuristics: StructuralHeuristicScorer::from_config(config)?,
            density: LexicalDensityScorer::from_config(config)?,
            profiler: TextProfiler::new()?,
            domains: DomainReputationResolver::new(&config.domains),
            batch: config.batch.clone(),
            max_semantic_chars: config.max_semantic_chars,
        };
        debug!(
            fetch_timeout = pipeline.fetcher.config().timeout,
            max_bytes = pipeline.fetcher.config().max_bytes,
            min_content_chars = pipeline.extractor.config().min_content_chars,
            density_threshold = pipeline.density.threshold(),
            concurrency = pipeline.batch.concurrency,
            per_url_timeout = pipeline.batch.per_url_timeout,
            "pipeline ready"
        );
        Ok(pipeline)
    }

    pub fn max_semantic_chars(&self) -> usize {
        self.max_semantic_chars
    }

    /// Fetches and scores one URL. Fetch failures are reported, not returned.
    pub async fn score_url(&self, url: &str, context: &ScoreContext) -> SignalReport {
        let mut tracker = StageTracker::start(url, Stage::Fetching);

        match self.fetcher.fetch(url).await {
            Ok(FetchedPage { url: final_url, html, .. }) => {
                tracker.advance(Stage::Extracting);
                if final_url != url {
                    debug!(url, final_url = %final_url, "followed redirects");
                }
                self.score_document(&html, Some(url), context, &mut tracker)
            }
            Err(e) => {
                tracker.advance(Stage::Errored);
                warn!(url, error = %e, kind = e.kind().as_str(), "fetch failed");
                SignalReport::failed(url, &e, self.domains.resolve_url(url))
            }
        }
    }

    /// Scores HTML that was obtained elsewhere.
    ///
    /// # Arguments
    ///
    /// * `html` - Raw markup; heuristics read it as is, extraction cleans it first
    /// * `url` - Source address, used only for the domain lookup
    /// * `context` - Search query and extraction overrides for this document
    pub fn score_html(&self, html: &str, url: Option<&str>, context: &ScoreContext) -> SignalReport {
        let label = url.unwrap_or("<inline>");
        let mut tracker = StageTracker::start(label, Stage::Extracting);
        self.score_document(html, url, context, &mut tracker)
    }

    fn score_document(
        &self, html: &str, url: Option<&str>, context: &ScoreContext, tracker: &mut StageTracker<'_>,
    ) -> SignalReport {
        let extracted = self.extractor.extract(html, context.force_deep);
        debug!(url = tracker.url, outcome = ?extracted.outcome, chars = extracted.text.chars().count(), "extracted");

        tracker.advance(Stage::Scoring);
        let heuristics = self.heuristics.score(html, context.query.as_deref());
        let density = self.density.score(&extracted.text);
        let stats = self.profiler.measure(&extracted.text);
        let domain = match url {
            Some(url) => self.domains.resolve_url(url),
            None => self.domains.resolve_host(""),
        };

        let combined_score = combine_score(heuristics.final_score, domain.multiplier);
        let skip_deep_analysis = density.below_threshold();
        let stage = tracker.advance(Stage::Done);

        info!(
            url = tracker.url,
            heuristic = heuristics.final_score,
            multiplier = domain.multiplier,
            combined_score,
            density = ?density.metrics().map(|d| d.combined),
            words = stats.word_count,
            references = stats.reference_count,
            skip_deep_analysis,
            "scored document"
        );

        SignalReport {
            extraction: ExtractionResult {
                url: url.unwrap_or_default().to_string(),
                title: extracted.title,
                text: extracted.text,
                fetch_status: FetchStatus::Success,
                error: None,
                error_message: None,
                outcome: Some(extracted.outcome),
                stats: Some(stats),
            },
            heuristics: Some(heuristics),
            density: density.into_metrics(),
            domain,
            combined_score,
            skip_deep_analysis,
            stage,
        }
    }

    /// Scores many URLs with bounded concurrency. Reports are in input order.
    pub async fn score_batch<S: AsRef<str>>(&self, urls: &[S], context: &ScoreContext) -> Vec<SignalReport> {
        self.score_batch_until(urls, context, std::future::pending()).await
    }

    /// Like [`Self::score_batch`], but stops when `shutdown` resolves.
    ///
    /// Reports finished before shutdown are kept as they are; URLs still in
    /// flight or not yet started are reported as cancelled.
    pub async fn score_batch_until<S, F>(&self, urls: &[S], context: &ScoreContext, shutdown: F) -> Vec<SignalReport>
    where
        S: AsRef<str>,
        F: Future<Output = ()>,
    {
        let limit = Duration::from_secs(self.batch.per_url_timeout);
        let mut slots: Vec<Option<SignalReport>> = (0..urls.len()).map(|_| None).collect();

        {
            let mut pending = stream::iter(urls.iter().enumerate())
                .map(|(index, url)| async move {
                    let url = url.as_ref();
                    let report = match tokio::time::timeout(limit, self.score_url(url, context)).await {
                        Ok(report) => report,
                        Err(_) => {
                            warn!(url, timeout = limit.as_secs(), "per-URL time budget exceeded");
                            let error = FetchError::Timeout { timeout: limit.as_secs() };
                            SignalReport::failed(url, &error, self.domains.resolve_url(url))
                        }
                    };
                    (index, report)
                })
                .buffer_unordered(self.batch.concurrency.max(1));

            let mut shutdown = std::pin::pin!(shutdown);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        info!(completed = slots.iter().flatten().count(), total = urls.len(), "batch cancelled");
                        break;
                    }
                    next = pending.next() => match next {
                        Some((index, report)) => slots[index] = Some(report),
                        None => break,
                    },
                }
            }
        }

        let reports: Vec<SignalReport> = slots
            .into_iter()
            .zip(urls)
            .map(|(slot, url)| {
                slot.unwrap_or_else(|| {
                    let url = url.as_ref();
                    SignalReport::failed(url, &FetchError::Cancelled, self.domains.resolve_url(url))
                })
            })
            .collect();

        info!(
            total = reports.len(),
            succeeded = reports.iter().filter(|r| r.is_success()).count(),
            "batch finished"
        );
        reports
    }
}
