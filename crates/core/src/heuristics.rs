//! Structural heuristics computed from the raw markup.
//!
//! Starts from a base of 50 and records one [`Adjustment`] per signal that
//! fires, in a fixed order: code density, code/query match, data density,
//! markup bloat, affiliate markers, hype vocabulary. Only the final sum is
//! clamped to `[0, 100]`.
//!
//! Curves:
//!
//! - code: `round(20 · min(1, n/5) · (0.5 + 0.5 · min(1, share/0.3)))` where
//!   `n` counts `<pre>` blocks and multi-line `<code>` outside `<pre>`, and
//!   `share` is `n` over all block elements.
//! - data: `round(15 · min(1, w/3))` with `w` = tables with two or more rows
//!   + definition lists + half a point per list of three or more items.
//! - bloat: piecewise linear over markup bytes per visible text byte, see
//!   [`slop_delta`].

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::parse::Document;
use crate::vocabulary::{KeywordMatcher, Vocabulary};
use crate::{Result, SignalConfig};

/// Starting score before any adjustment.
pub const BASE_SCORE: i32 = 50;

pub const MAX_CODE_BONUS: f64 = 20.0;
pub const CODE_QUERY_BONUS: i32 = 5;
pub const MAX_DATA_BONUS: f64 = 15.0;
pub const MAX_SLOP_BONUS: f64 = 10.0;
pub const MAX_SLOP_PENALTY: f64 = -30.0;
pub const AFFILIATE_PENALTY: i32 = -30;
pub const HYPE_PENALTY: i32 = -20;

const CODE_SATURATION: f64 = 5.0;
const CODE_SHARE_SATURATION: f64 = 0.3;
const DATA_SATURATION: f64 = 3.0;

const BLOCK_SELECTOR: &str = "p, pre, blockquote, li, table, ul, ol, dl, figure, h1, h2, h3, h4, h5, h6";

/// The signal an adjustment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    CodeDensity,
    CodeQueryMatch,
    DataDensity,
    Slop,
    Affiliate,
    Hype,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::CodeDensity => "code_density",
            Signal::CodeQueryMatch => "code_query_match",
            Signal::DataDensity => "data_density",
            Signal::Slop => "slop",
            Signal::Affiliate => "affiliate",
            Signal::Hype => "hype",
        }
    }
}

/// One itemized change to the heuristic score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub signal: Signal,
    pub delta: i32,
    pub reason: String,
}

impl Adjustment {
    pub fn new(signal: Signal, delta: i32, reason: impl Into<String>) -> Self {
        Self { signal, delta, reason: reason.into() }
    }
}

/// What happened when a sub-signal was evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalStatus {
    Applied(Adjustment),
    Neutral,
    Degraded(String),
}

/// Itemized structural score.
///
/// `final_score == clamp(base + Σ delta, 0, 100)` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicScore {
    pub base: i32,
    pub adjustments: Vec<Adjustment>,
    #[serde(rename = "final")]
    pub final_score: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

impl HeuristicScore {
    /// Builds a score from adjustments, computing the clamped final value.
    pub fn from_adjustments(adjustments: Vec<Adjustment>) -> Self {
        let total: i32 = adjustments.iter().map(|a| a.delta).sum();
        let final_score = (BASE_SCORE + total).clamp(0, 100);
        Self { base: BASE_SCORE, adjustments, final_score, degraded: Vec::new() }
    }

    /// Folds signal outcomes into a score, skipping neutral ones.
    pub fn from_statuses(statuses: Vec<SignalStatus>) -> Self {
        let mut adjustments = Vec::new();
        let mut degraded = Vec::new();
        for status in statuses {
            match status {
                SignalStatus::Applied(adjustment) if adjustment.delta != 0 => adjustments.push(adjustment),
                SignalStatus::Applied(_) | SignalStatus::Neutral => {}
                SignalStatus::Degraded(reason) => degraded.push(reason),
            }
        }
        let mut score = Self::from_adjustments(adjustments);
        score.degraded = degraded;
        score
    }

    /// Finds the adjustment recorded for `signal`.
    pub fn adjustment(&self, signal: Signal) -> Option<&Adjustment> {
        self.adjustments.iter().find(|a| a.signal == signal)
    }
}

/// Stateless scorer over raw HTML. Matchers are compiled once at construction.
#[derive(Debug, Clone)]
pub struct StructuralHeuristicScorer {
    affiliate: KeywordMatcher,
    hype: KeywordMatcher,
    code_terms: KeywordMatcher,
}

impl StructuralHeuristicScorer {
    /// # Errors
    ///
    /// Returns [`crate::SignalError::InvalidVocabulary`] if a vocabulary cannot be compiled.
    pub fn new(affiliate: &Vocabulary, hype: &Vocabulary, code_terms: &Vocabulary) -> Result<Self> {
        Ok(Self {
            affiliate: KeywordMatcher::compile("affiliate", affiliate)?,
            hype: KeywordMatcher::compile("hype", hype)?,
            code_terms: KeywordMatcher::compile("code_terms", code_terms)?,
        })
    }

    pub fn from_config(config: &SignalConfig) -> Result<Self> {
        Self::new(&config.affiliate, &config.hype, &config.code_terms)
    }

    /// Scores raw HTML. `query` is the originating search query, if any.
    pub fn score(&self, html: &str, query: Option<&str>) -> HeuristicScore {
        let doc = Document::parse(html);
        let visible = doc.visible_text();

        let (code_status, code_blocks) = code_density(&doc);
        let statuses = vec![
            code_status,
            self.code_query_match(query, code_blocks, &visible),
            data_density(&doc),
            slop(html, &visible),
            self.affiliates(&doc),
            self.hype(&doc, &visible),
        ];

        let score = HeuristicScore::from_statuses(statuses);
        for reason in &score.degraded {
            warn!(%reason, "heuristic signal degraded to neutral");
        }
        score
    }

    fn code_query_match(&self, query: Option<&str>, code_blocks: usize, visible: &str) -> SignalStatus {
        let Some(query) = query else { return SignalStatus::Neutral };
        if code_blocks == 0 || !self.code_terms.is_match(query) {
            return SignalStatus::Neutral;
        }

        let haystack = visible.to_lowercase();
        let tokens: Vec<String> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() >= 3)
            .map(|t| t.to_lowercase())
            .collect();

        if tokens.is_empty() || !tokens.iter().all(|t| haystack.contains(t.as_str())) {
            return SignalStatus::Neutral;
        }

        SignalStatus::Applied(Adjustment::new(
            Signal::CodeQueryMatch,
            CODE_QUERY_BONUS,
            format!("Code examples match every term of query '{query}'"),
        ))
    }

    fn affiliates(&self, doc: &Document) -> SignalStatus {
        let links = match doc.select("a") {
            Ok(links) => links,
            Err(e) => return SignalStatus::Degraded(format!("affiliate scan skipped: {e}")),
        };

        let mut marked = 0usize;
        let mut first: Option<String> = None;
        for link in &links {
            let href = link.attr("href").unwrap_or_default();
            let sponsored_rel = link
                .attr("rel")
                .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("sponsored")));

            let hit = self
                .affiliate
                .find(href)
                .or_else(|| self.affiliate.find(&link.text()))
                .map(|h| h.keyword)
                .or_else(|| sponsored_rel.then(|| "rel=sponsored".to_string()));

            if let Some(marker) = hit {
                marked += 1;
                first.get_or_insert(marker);
            }
        }

        match first {
            Some(marker) => SignalStatus::Applied(Adjustment::new(
                Signal::Affiliate,
                AFFILIATE_PENALTY,
                format!("Affiliate markers in {marked} link(s), first: '{marker}'"),
            )),
            None => SignalStatus::Neutral,
        }
    }

    fn hype(&self, doc: &Document, visible: &str) -> SignalStatus {
        let haystack = match doc.title() {
            Some(title) => format!("{title} {visible}"),
            None => visible.to_string(),
        };

        match self.hype.find(&haystack) {
            Some(hit) => {
                let count = self.hype.count(&haystack);
                SignalStatus::Applied(Adjustment::new(
                    Signal::Hype,
                    HYPE_PENALTY,
                    format!("Hype/clickbait language: '{}' ({count} match(es))", hit.keyword),
                ))
            }
            None => SignalStatus::Neutral,
        }
    }
}

/// Code block bonus and the number of code blocks found.
fn code_density(doc: &Document) -> (SignalStatus, usize) {
    let (pres, codes, blocks) = match (doc.select("pre"), doc.select("code"), doc.select(BLOCK_SELECTOR)) {
        (Ok(p), Ok(c), Ok(b)) => (p, c, b),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            return (SignalStatus::Degraded(format!("code density skipped: {e}")), 0);
        }
    };

    let standalone = codes
        .iter()
        .filter(|c| !c.has_ancestor_in(&["pre"], None) && c.text().trim().contains('\n'))
        .count();
    let count = pres.len() + standalone;
    if count == 0 {
        return (SignalStatus::Neutral, 0);
    }

    let share = count as f64 / (blocks.len() + standalone).max(1) as f64;
    let delta = code_bonus(count, share);

    let status = SignalStatus::Applied(Adjustment::new(
        Signal::CodeDensity,
        delta,
        format!("{count} code block(s), {:.0}% of block elements", share * 100.0),
    ));
    (status, count)
}

/// Monotonic, saturating code bonus in `[0, 20]`.
pub fn code_bonus(count: usize, share: f64) -> i32 {
    let volume = (count as f64 / CODE_SATURATION).min(1.0);
    let share = (share / CODE_SHARE_SATURATION).clamp(0.0, 1.0);
    (MAX_CODE_BONUS * volume * (0.5 + 0.5 * share)).round() as i32
}

fn data_density(doc: &Document) -> SignalStatus {
    let (tables, dls, lists) = match (doc.select("table"), doc.select("dl"), doc.select("ol, ul")) {
        (Ok(t), Ok(d), Ok(l)) => (t, d, l),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            return SignalStatus::Degraded(format!("data density skipped: {e}"));
        }
    };

    let data_tables = tables
        .iter()
        .filter(|t| t.select("tr").map(|rows| rows.len() >= 2).unwrap_or(false))
        .count();
    let structured_lists = lists
        .iter()
        .filter(|l| l.select("li").map(|items| items.len() >= 3).unwrap_or(false))
        .count();

    let delta = data_bonus(data_tables, dls.len(), structured_lists);
    if delta == 0 {
        return SignalStatus::Neutral;
    }

    SignalStatus::Applied(Adjustment::new(
        Signal::DataDensity,
        delta,
        format!(
            "{data_tables} data table(s), {} definition list(s), {structured_lists} structured list(s)",
            dls.len()
        ),
    ))
}

/// Monotonic, saturating data bonus in `[0, 15]`.
pub fn data_bonus(tables: usize, definition_lists: usize, lists: usize) -> i32 {
    let weight = tables as f64 + definition_lists as f64 + 0.5 * lists as f64;
    (MAX_DATA_BONUS * (weight / DATA_SATURATION).min(1.0)).round() as i32
}

fn slop(html: &str, visible: &str) -> SignalStatus {
    let text_bytes = visible.len();
    if text_bytes == 0 {
        return SignalStatus::Applied(Adjustment::new(
            Signal::Slop,
            MAX_SLOP_PENALTY as i32,
            "No readable text in document",
        ));
    }

    let markup_bytes = html.len().saturating_sub(text_bytes);
    let ratio = markup_bytes as f64 / text_bytes as f64;
    let delta = slop_delta(ratio).round() as i32;

    let reason = if delta > 0 {
        format!("Lean markup, markup/text ratio {ratio:.1}")
    } else {
        format!("Bloated markup, markup/text ratio {ratio:.1}")
    };

    if delta == 0 {
        SignalStatus::Neutral
    } else {
        SignalStatus::Applied(Adjustment::new(Signal::Slop, delta, reason))
    }
}

/// Continuous bloat curve over markup bytes per text byte.
///
/// `≤ 0.5` gives +10, falling linearly to 0 at 1.5; flat 0 up to 3; then
/// falling linearly to −30 at 12 and staying there.
pub fn slop_delta(ratio: f64) -> f64 {
    const LEAN: f64 = 0.5;
    const NEUTRAL_START: f64 = 1.5;
    const NEUTRAL_END: f64 = 3.0;
    const BLOATED: f64 = 12.0;

    if ratio.is_nan() {
        return 0.0;
    }
    if ratio <= LEAN {
        MAX_SLOP_BONUS
    } else if ratio <= NEUTRAL_START {
        MAX_SLOP_BONUS * (NEUTRAL_START - ratio) / (NEUTRAL_START - LEAN)
    } else if ratio <= NEUTRAL_END {
        0.0
    } else if ratio <= BLOATED {
        MAX_SLOP_PENALTY * (ratio - NEUTRAL_END) / (BLOATED - NEUTRAL_END)
    } else {
        MAX_SLOP_PENALTY
    }
}
