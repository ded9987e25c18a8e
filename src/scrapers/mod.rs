//! News archive scrapers.
//!
//! Each supported site is described by a [`SiteProfile`]: where its daily
//! listing lives, which CSS queries find links and article fields, which path
//! segment carries the category, and the site's defaults. Scraping a day follows
//! the same two-phase pattern for every site:
//!
//! 1. **Indexing**: fetch the listing page, collect article links, drop
//!    excluded categories and persist both lists as CSV
//! 2. **Fetching**: fetch each remaining article in turn, render it as a PDF,
//!    then pause before the next one
//!
//! # Supported Sources
//!
//! | Source | Module | Listing date | Intro block | Batch cap |
//! |--------|--------|--------------|-------------|-----------|
//! | DER SPIEGEL | [`spiegel`] | `DD.MM.YYYY` in path | yes | 5 |
//! | BILD | [`bild`] | `YYYY-MM-DD` query | no | none |

pub mod archive;
pub mod article;
pub mod bild;
pub mod links;
pub mod spiegel;

use crate::error::Result;
use chrono::NaiveDate;
use clap::ValueEnum;
use links::PathSchema;
use std::fmt;
use url::Url;

/// A supported news archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Site {
    Spiegel,
    Bild,
}

impl Site {
    pub fn profile(self) -> SiteProfile {
        match self {
            Site::Spiegel => spiegel::profile(),
            Site::Bild => bild::profile(),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Spiegel => write!(f, "spiegel"),
            Site::Bild => write!(f, "bild"),
        }
    }
}

/// Query and placeholder for an article's teaser block.
#[derive(Debug, Clone, Copy)]
pub struct IntroRule {
    pub selector: &'static str,
    pub placeholder: &'static str,
}

/// Everything the pipeline needs to know about one archive site.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub site: Site,
    /// Scheme and host the listing path is appended to.
    pub origin: String,
    pub archive_path: fn(NaiveDate) -> String,
    pub listing_link_selector: &'static str,
    pub headline_selector: &'static str,
    pub headline_placeholder: &'static str,
    pub timestamp_selector: &'static str,
    pub timestamp_placeholder: &'static str,
    pub intro: Option<IntroRule>,
    /// Paragraphs of the article body.
    pub body_selector: &'static str,
    pub path_schema: PathSchema,
    pub default_exclusions: &'static [&'static str],
    pub default_batch_cap: Option<usize>,
}

impl SiteProfile {
    /// Point the profile at another host, e.g. a mirror or a local test server.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// URL of the listing page for `date`.
    pub fn archive_url(&self, date: NaiveDate) -> Result<Url> {
        let url = format!("{}{}", self.origin.trim_end_matches('/'), (self.archive_path)(date));
        Ok(Url::parse(&url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_origin() {
        let date = NaiveDate::from_ymd_opt(2016, 12, 19).unwrap();
        let profile = Site::Spiegel.profile().with_origin("http://127.0.0.1:1234/");
        assert_eq!(
            profile.archive_url(date).unwrap().as_str(),
            "http://127.0.0.1:1234/nachrichtenarchiv/artikel-19.12.2016.html"
        );
    }

    #[test]
    fn test_site_display_matches_cli_value() {
        for site in [Site::Spiegel, Site::Bild] {
            let parsed = Site::from_str(&site.to_string(), true).unwrap();
            assert_eq!(parsed, site);
        }
    }
}
