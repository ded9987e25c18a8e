//! Article link extraction and category filtering for archive listing pages.
//!
//! A link's category is a segment of its URL path. Which segment is described
//! per site by a [`PathSchema`], so relative (`/regional/...`) and absolute
//! (`https://www.spiegel.de/politik/...`) links are handled the same way.
//! Links are resolved against the listing URL first; the category used for
//! filtering is the one that ends up in the document name.

use crate::error::{ArchiveError, Result};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use tracing::{debug, warn};
use url::Url;

/// Category reported for links whose path is too short for the schema.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Where a site keeps the category in its article paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSchema {
    /// Zero-based index among the non-empty path segments.
    pub category_segment: usize,
}

impl PathSchema {
    pub const fn new(category_segment: usize) -> Self {
        Self { category_segment }
    }

    /// The category segment of `link`, or `None` when the path is too short.
    pub fn category(&self, link: &str) -> Option<String> {
        let path = link_path(link);
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .nth(self.category_segment)
            .map(str::to_string)
    }

    /// Like [`PathSchema::category`] but falls back to [`UNKNOWN_CATEGORY`].
    pub fn category_or_unknown(&self, link: &str) -> String {
        match self.category(link) {
            Some(category) => category,
            None => {
                warn!(%link, segment = self.category_segment, "Link has no category segment");
                UNKNOWN_CATEGORY.to_string()
            }
        }
    }
}

/// Path component of a link, accepting both absolute URLs and bare paths.
fn link_path(link: &str) -> String {
    match Url::parse(link) {
        Ok(url) => url.path().to_string(),
        Err(_) => link.split(['?', '#']).next().unwrap_or_default().to_string(),
    }
}

pub(crate) fn compile_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| ArchiveError::Selector(selector.to_string()))
}

/// Every `href` matched by `selector`, in document order.
pub fn extract_links(html: &str, selector: &str) -> Result<Vec<String>> {
    let selector = compile_selector(selector)?;
    let document = Html::parse_document(html);
    let links: Vec<String> = document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect();
    debug!(count = links.len(), "Extracted archive links");
    Ok(links)
}

/// A listing link resolved against its listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    /// The `href` as it appeared on the listing page.
    pub href: String,
    pub url: Url,
    pub category: String,
}

impl ArticleLink {
    pub fn resolve(href: &str, listing_url: &Url, schema: &PathSchema) -> Result<Self> {
        let url = listing_url.join(href)?;
        let category = schema.category_or_unknown(url.as_str());
        Ok(Self {
            href: href.to_string(),
            url,
            category,
        })
    }
}

/// Drop links whose category is excluded, keeping the order of the rest.
///
/// Links that cannot be resolved against `listing_url` are dropped with a warning.
pub fn filter_links(
    links: &[String],
    listing_url: &Url,
    schema: &PathSchema,
    excluded: &BTreeSet<String>,
) -> Vec<ArticleLink> {
    links
        .iter()
        .filter_map(|href| match ArticleLink::resolve(href, listing_url, schema) {
            Ok(link) => Some(link),
            Err(e) => {
                warn!(%href, error = %e, "Dropping unresolvable link");
                None
            }
        })
        .filter(|link| !excluded.contains(&link.category))
        .collect()
}
