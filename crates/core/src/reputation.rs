//! Static host trust table.
//!
//! Hosts are matched against configured domains either exactly or on a dot
//! boundary (`cs.stanford.edu` matches `stanford.edu` and `edu`, never
//! `anford.edu`). The longest matching domain wins. Unmatched hosts are
//! neutral.

use serde::{Deserialize, Serialize};
use url::Url;

/// Trust category of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostCategory {
    Academic,
    OpenSource,
    Research,
    #[default]
    Neutral,
    Spam,
}

impl HostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostCategory::Academic => "academic",
            HostCategory::OpenSource => "open_source",
            HostCategory::Research => "research",
            HostCategory::Neutral => "neutral",
            HostCategory::Spam => "spam",
        }
    }
}

/// Default multiplier per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryMultipliers {
    pub academic: f64,
    pub research: f64,
    pub open_source: f64,
    pub neutral: f64,
    pub spam: f64,
}

impl Default for CategoryMultipliers {
    fn default() -> Self {
        Self { academic: 0.15, research: 0.12, open_source: 0.10, neutral: 0.0, spam: -0.5 }
    }
}

impl CategoryMultipliers {
    pub fn get(&self, category: HostCategory) -> f64 {
        match category {
            HostCategory::Academic => self.academic,
            HostCategory::OpenSource => self.open_source,
            HostCategory::Research => self.research,
            HostCategory::Neutral => self.neutral,
            HostCategory::Spam => self.spam,
        }
    }
}

/// One entry of the trust table. `multiplier` overrides the category default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRule {
    pub domain: String,
    pub category: HostCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}

impl DomainRule {
    pub fn new(domain: &str, category: HostCategory) -> Self {
        Self { domain: domain.to_string(), category, multiplier: None }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }
}

/// Trust table contents as loaded from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainTable {
    pub rules: Vec<DomainRule>,
    pub multipliers: CategoryMultipliers,
}

impl Default for DomainTable {
    fn default() -> Self {
        use HostCategory::*;

        let rules = vec![
            DomainRule::new("edu", Academic),
            DomainRule::new("ac.uk", Academic),
            DomainRule::new("arxiv.org", Academic),
            DomainRule::new("nature.com", Academic),
            DomainRule::new("science.org", Academic),
            DomainRule::new("distill.pub", Academic),
            DomainRule::new("acm.org", Academic).with_multiplier(0.10),
            DomainRule::new("ieee.org", Academic).with_multiplier(0.10),
            DomainRule::new("openai.com", Research),
            DomainRule::new("deepmind.com", Research),
            DomainRule::new("research.google", Research),
            DomainRule::new("anthropic.com", Research).with_multiplier(0.10),
            DomainRule::new("lilianweng.github.io", Research),
            DomainRule::new("colah.github.io", Research),
            DomainRule::new("karpathy.github.io", Research),
            DomainRule::new("github.com", OpenSource),
            DomainRule::new("huggingface.co", OpenSource).with_multiplier(0.08),
            DomainRule::new("pytorch.org", OpenSource).with_multiplier(0.08),
            DomainRule::new("tensorflow.org", OpenSource).with_multiplier(0.08),
            DomainRule::new("martin.kleppmann.com", OpenSource),
            DomainRule::new("danluu.com", OpenSource),
            DomainRule::new("jvns.ca", OpenSource).with_multiplier(0.08),
            DomainRule::new("rachelbythebay.com", OpenSource).with_multiplier(0.08),
            DomainRule::new("brandur.org", OpenSource).with_multiplier(0.08),
        ];

        Self { rules, multipliers: CategoryMultipliers::default() }
    }
}

/// Resolved trust of one host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainTrust {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub host_category: HostCategory,
    pub multiplier: f64,
    /// Domain of the rule that matched, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
}

impl DomainTrust {
    pub fn neutral(host: Option<String>) -> Self {
        Self { host, host_category: HostCategory::Neutral, multiplier: 0.0, matched: None }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    domain: String,
    category: HostCategory,
    multiplier: f64,
}

/// Read-only resolver built once from a [`DomainTable`].
#[derive(Debug, Clone)]
pub struct DomainReputationResolver {
    rules: Vec<CompiledRule>,
    neutral: f64,
}

impl Default for DomainReputationResolver {
    fn default() -> Self {
        Self::new(&DomainTable::default())
    }
}

impl DomainReputationResolver {
    pub fn new(table: &DomainTable) -> Self {
        let mut rules: Vec<CompiledRule> = table
            .rules
            .iter()
            .map(|rule| CompiledRule {
                domain: normalize_host(rule.domain.trim_start_matches('.')),
                category: rule.category,
                multiplier: rule.multiplier.unwrap_or_else(|| table.multipliers.get(rule.category)),
            })
            .filter(|rule| !rule.domain.is_empty())
            .collect();

        // Longest first; ties keep table order.
        rules.sort_by(|a, b| b.domain.len().cmp(&a.domain.len()));

        Self { rules, neutral: table.multipliers.neutral }
    }

    /// Resolves a bare host name.
    pub fn resolve_host(&self, host: &str) -> DomainTrust {
        let host = normalize_host(host);
        if host.is_empty() {
            return DomainTrust { multiplier: self.neutral, ..DomainTrust::neutral(None) };
        }

        match self.rules.iter().find(|rule| domain_matches(&host, &rule.domain)) {
            Some(rule) => DomainTrust {
                host: Some(host),
                host_category: rule.category,
                multiplier: rule.multiplier,
                matched: Some(rule.domain.clone()),
            },
            None => DomainTrust { multiplier: self.neutral, ..DomainTrust::neutral(Some(host)) },
        }
    }

    /// Resolves the host of `url`. Unparsable URLs are neutral.
    pub fn resolve_url(&self, url: &str) -> DomainTrust {
        match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) {
            Some(host) => self.resolve_host(&host),
            None => DomainTrust { multiplier: self.neutral, ..DomainTrust::neutral(None) },
        }
    }
}

/// Lower-cases, drops a trailing dot and a leading `www.`.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain || (host.ends_with(domain) && host[..host.len() - domain.len()].ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("arxiv.org", HostCategory::Academic, 0.15)]
    #[case("www.arxiv.org", HostCategory::Academic, 0.15)]
    #[case("ARXIV.ORG", HostCategory::Academic, 0.15)]
    #[case("export.arxiv.org", HostCategory::Academic, 0.15)]
    #[case("cs.stanford.edu", HostCategory::Academic, 0.15)]
    #[case("github.com", HostCategory::OpenSource, 0.10)]
    #[case("pytorch.org", HostCategory::OpenSource, 0.08)]
    #[case("research.google", HostCategory::Research, 0.12)]
    #[case("example.com", HostCategory::Neutral, 0.0)]
    #[case("notarxiv.org", HostCategory::Neutral, 0.0)]
    fn test_resolve_host(#[case] host: &str, #[case] category: HostCategory, #[case] multiplier: f64) {
        let trust = DomainReputationResolver::default().resolve_host(host);
        assert_eq!(trust.host_category, category);
        assert!((trust.multiplier - multiplier).abs() < 1e-9);
    }

    #[test]
    fn test_longest_match_wins() {
        let table = DomainTable {
            rules: vec![
                DomainRule::new("github.io", HostCategory::Spam),
                DomainRule::new("colah.github.io", HostCategory::Research),
            ],
            multipliers: CategoryMultipliers::default(),
        };
        let resolver = DomainReputationResolver::new(&table);
        assert_eq!(resolver.resolve_host("colah.github.io").host_category, HostCategory::Research);
        assert_eq!(resolver.resolve_host("someone.github.io").host_category, HostCategory::Spam);
        assert_eq!(resolver.resolve_host("someone.github.io").multiplier, -0.5);
    }

    #[test]
    fn test_resolve_url() {
        let resolver = DomainReputationResolver::default();
        let trust = resolver.resolve_url("https://www.nature.com/articles/s41586");
        assert_eq!(trust.host.as_deref(), Some("nature.com"));
        assert_eq!(trust.matched.as_deref(), Some("nature.com"));

        let trust = resolver.resolve_url("not a url");
        assert_eq!(trust.host_category, HostCategory::Neutral);
        assert_eq!(trust.host, None);
    }

    #[test]
    fn test_table_deserializes_with_defaults() {
        let json = r#"{"rules": [{"domain": "contentfarm.example", "category": "spam"}]}"#;
        let table: DomainTable = serde_json::from_str(json).unwrap();
        let trust = DomainReputationResolver::new(&table).resolve_host("blog.contentfarm.example");
        assert_eq!(trust.host_category, HostCategory::Spam);
        assert_eq!(trust.multiplier, -0.5);
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("WWW.Example.COM."), "example.com");
        assert_eq!(normalize_host("wwwexample.com"), "wwwexample.com");
    }
}
