//! Runtime configuration for the scrape and filter passes.
//!
//! Settings are layered: site defaults, then an optional YAML file, then
//! command-line overrides. Each pass receives its own config object instead of
//! reading globals.
//!
//! ```yaml
//! scrape:
//!   exclusion_categories: [sport, geld]
//!   rate_limit_delay_secs: 5
//!   fetch_timeout_secs: 30
//!   max_articles: 5
//! filter:
//!   keyword_terms: [anschlag, terror]
//! ```

use crate::error::{ArchiveError, Result};
use crate::scrapers::SiteProfile;
use itertools::Itertools;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Keywords the filter looks for when none are configured.
pub const DEFAULT_KEYWORD_TERMS: &[&str] = &[
    "breitscheid",
    "breitscheidplatz",
    "anschlag",
    "anschläge",
    "weihnachtsmarkt",
    "weihnachtsmärkte",
    "lastwagen",
    "lkw",
    "terror",
    "terroranschlag",
];

/// Contents of a YAML config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub scrape: ScrapeSection,
    pub filter: FilterSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrapeSection {
    pub exclusion_categories: Option<Vec<String>>,
    pub rate_limit_delay_secs: Option<u64>,
    pub fetch_timeout_secs: Option<u64>,
    pub max_articles: Option<usize>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSection {
    pub keyword_terms: Option<Vec<String>>,
}

impl ConfigFile {
    /// Load a config file from disk.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ArchiveError::Config(format!("{}: {e}", path.display())))?;
        let parsed = Self::parse(&raw)?;
        debug!(?parsed, "Loaded configuration file");
        Ok(parsed)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }
}

/// Settings for scraping one site.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Categories whose links are dropped before any fetch.
    pub exclusion_categories: BTreeSet<String>,
    /// Pause between two article fetches.
    pub rate_limit_delay: Duration,
    /// Upper bound for each HTTP request.
    pub fetch_timeout: Duration,
    /// Only the first `n` filtered links are processed; `None` processes all.
    pub max_articles: Option<usize>,
    pub user_agent: String,
}

impl ScrapeConfig {
    /// Defaults for a site: its exclusion list and batch cap.
    pub fn for_site(profile: &SiteProfile) -> Self {
        Self {
            exclusion_categories: profile
                .default_exclusions
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_articles: profile.default_batch_cap,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }

    /// Apply the `scrape` section of a config file on top of these settings.
    pub fn merge_file(mut self, section: &ScrapeSection) -> Self {
        if let Some(categories) = &section.exclusion_categories {
            self.exclusion_categories = categories.iter().map(|c| c.trim().to_string()).collect();
        }
        if let Some(secs) = section.rate_limit_delay_secs {
            self.rate_limit_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = section.fetch_timeout_secs {
            self.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = section.max_articles {
            self.max_articles = Some(n);
        }
        if let Some(ua) = &section.user_agent {
            self.user_agent = ua.clone();
        }
        self
    }
}

/// Settings for the keyword filter pass.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Terms in match priority order, without duplicates.
    pub keyword_terms: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::with_terms(DEFAULT_KEYWORD_TERMS.iter().copied())
    }
}

impl FilterConfig {
    pub fn with_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keyword_terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .unique_by(|t| t.to_lowercase())
            .collect();
        Self { keyword_terms }
    }

    pub fn merge_file(self, section: &FilterSection) -> Self {
        match &section.keyword_terms {
            Some(terms) => Self::with_terms(terms),
            None => self,
        }
    }
}
