//! Pipeline configuration.
//!
//! [`SignalConfig`] is plain data: it deserializes from JSON with every
//! field optional, and is compiled into scorers once when the pipeline is
//! built. Nothing in it is mutated afterwards.
//!
//! # Example
//!
//! ```rust
//! use sgnl_core::SignalConfig;
//!
//! let config = SignalConfig::builder()
//!     .density_threshold(0.5)
//!     .max_semantic_chars(8_000)
//!     .concurrency(4)
//!     .build();
//! assert!(config.validate().is_ok());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::extract::ExtractConfig;
use crate::fetch::FetchConfig;
use crate::reputation::DomainTable;
use crate::vocabulary::Vocabulary;
use crate::{Result, SignalError};

/// Bounds for scoring many URLs at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of URLs in flight.
    pub concurrency: usize,
    /// Time budget in seconds for one URL, fetch and scoring included.
    pub per_url_timeout: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 8, per_url_timeout: 45 }
    }
}

/// Everything the scoring pipeline consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Combined density below this value skips deep analysis (default: 0.45).
    pub density_threshold: f64,
    /// Characters of body text forwarded to semantic analysis (default: 12000).
    pub max_semantic_chars: usize,
    /// Texts with fewer words are not measured for density (default: 25).
    pub min_words: usize,
    pub extract: ExtractConfig,
    pub fetch: FetchConfig,
    pub batch: BatchConfig,
    pub domains: DomainTable,
    pub affiliate: Vocabulary,
    pub hype: Vocabulary,
    pub code_terms: Vocabulary,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            density_threshold: 0.45,
            max_semantic_chars: 12_000,
            min_words: 25,
            extract: ExtractConfig::default(),
            fetch: FetchConfig::default(),
            batch: BatchConfig::default(),
            domains: DomainTable::default(),
            affiliate: Vocabulary::affiliate(),
            hype: Vocabulary::hype(),
            code_terms: Vocabulary::code_terms(),
        }
    }
}

impl SignalConfig {
    /// Creates a builder starting from the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sgnl_core::SignalConfig;
    ///
    /// let config = SignalConfig::builder().density_threshold(0.5).concurrency(4).build();
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn builder() -> SignalConfigBuilder {
        SignalConfigBuilder::new()
    }

    /// Loads configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::ConfigNotFound`] if `path` does not exist, and
    /// an I/O, parse or validation error otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SignalError::ConfigNotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        let config: SignalConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/sgnl/config.json`, e.g. `~/.config/sgnl/config.json` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sgnl").join("config.json"))
    }

    /// Loads the file at [`Self::default_path`] if it exists, defaults otherwise.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Checks ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.density_threshold) {
            return Err(SignalError::InvalidConfig(format!(
                "density_threshold must be within [0, 1], got {}",
                self.density_threshold
            )));
        }
        if self.batch.concurrency == 0 {
            return Err(SignalError::InvalidConfig("batch.concurrency must be at least 1".to_string()));
        }
        if self.batch.per_url_timeout == 0 || self.fetch.timeout == 0 {
            return Err(SignalError::InvalidConfig("timeouts must be at least one second".to_string()));
        }
        if self.fetch.max_bytes == 0 {
            return Err(SignalError::InvalidConfig("fetch.max_bytes must be positive".to_string()));
        }
        Ok(())
    }
}

/// Fluent builder for [`SignalConfig`].
pub struct SignalConfigBuilder {
    config: SignalConfig,
}

impl SignalConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: SignalConfig::default() }
    }

    /// Sets the density threshold below which deep analysis is skipped.
    pub fn density_threshold(mut self, value: f64) -> Self {
        self.config.density_threshold = value;
        self
    }

    /// Sets how many characters of body text the semantic view keeps.
    pub fn max_semantic_chars(mut self, value: usize) -> Self {
        self.config.max_semantic_chars = value;
        self
    }

    /// Sets the minimum word count for density scoring.
    pub fn min_words(mut self, value: usize) -> Self {
        self.config.min_words = value;
        self
    }

    /// Sets the minimum length of a primary extraction.
    pub fn min_content_chars(mut self, value: usize) -> Self {
        self.config.extract.min_content_chars = value;
        self
    }

    /// Sets the maximum number of URLs fetched at once.
    pub fn concurrency(mut self, value: usize) -> Self {
        self.config.batch.concurrency = value;
        self
    }

    /// Per-URL time budget in batch mode, in seconds.
    pub fn per_url_timeout(mut self, value: u64) -> Self {
        self.config.batch.per_url_timeout = value;
        self
    }

    /// Fetch timeout in seconds.
    pub fn fetch_timeout(mut self, value: u64) -> Self {
        self.config.fetch.timeout = value;
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.user_agent = value.into();
        self
    }

    /// Sets the response body cap in bytes.
    pub fn max_bytes(mut self, value: usize) -> Self {
        self.config.fetch.max_bytes = value;
        self
    }

    /// Replaces the host reputation table.
    ///
    /// # Arguments
    ///
    /// * `value` - Rules and per-category multipliers; unmatched hosts stay neutral
    ///
    /// # Example
    ///
    /// ```rust
    /// use sgnl_core::{DomainRule, DomainTable, HostCategory, SignalConfig};
    ///
    /// let config = SignalConfig::builder()
    ///     .domains(DomainTable {
    ///         rules: vec![DomainRule::new("docs.internal.example", HostCategory::Research)],
    ///         ..DomainTable::default()
    ///     })
    ///     .build();
    /// assert_eq!(config.domains.rules.len(), 1);
    /// ```
    pub fn domains(mut self, value: DomainTable) -> Self {
        self.config.domains = value;
        self
    }

    /// Sets the affiliate marker vocabulary.
    pub fn affiliate(mut self, value: Vocabulary) -> Self {
        self.config.affiliate = value;
        self
    }

    /// Sets the hype vocabulary.
    pub fn hype(mut self, value: Vocabulary) -> Self {
        self.config.hype = value;
        self
    }

    /// Sets the code-related query terms.
    pub fn code_terms(mut self, value: Vocabulary) -> Self {
        self.config.code_terms = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> SignalConfig {
        self.config
    }
}

impl Default for SignalConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
