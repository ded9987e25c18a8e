//! Data models for archive pages, articles and pipeline results.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ArchivePage`]: The links found on one archive listing page
//! - [`Article`]: Structured text extracted from a single article page
//! - [`DocumentName`]: The deterministic filename of a rendered PDF
//! - [`ArchiveRun`] and [`FilterReport`]: Summaries returned by the two passes

use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;

/// The links found on a single archive listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePage {
    /// The publication date the listing page covers.
    pub date: NaiveDate,
    /// The URL the listing was fetched from.
    pub url: String,
    /// Every article link in document order, before category filtering.
    pub links: Vec<String>,
}

/// Structured text extracted from an article page.
///
/// Missing fields are already replaced by the site's placeholders, so an
/// `Article` can always be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// The absolute URL the article was fetched from.
    pub source: String,
    /// Headline fragments joined by single spaces.
    pub headline: String,
    /// The publication timestamp exactly as displayed on the page.
    pub timestamp: String,
    /// The teaser paragraph, for sites that have one.
    pub intro: Option<String>,
    /// Body paragraphs joined by newlines.
    pub body: String,
}

/// Filename of a rendered document: `{date}_{ordinal:02}_{category}_{slug}.pdf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentName {
    pub date: NaiveDate,
    /// Zero-based position of the link in the filtered batch.
    pub index: usize,
    pub category: String,
    pub slug: String,
}

impl DocumentName {
    /// Build the name for the `index`-th link of a batch.
    ///
    /// The slug is the first three hyphen-separated tokens of the last path
    /// segment of `url`.
    pub fn new(date: NaiveDate, index: usize, category: &str, url: &str) -> Self {
        Self {
            date,
            index,
            category: category.to_string(),
            slug: slug_from_url(url),
        }
    }

    pub fn file_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{:02}_{}_{}.pdf",
            self.date.format("%Y-%m-%d"),
            self.index + 1,
            self.category,
            self.slug
        )
    }
}

/// First three hyphen-separated tokens of the final path segment.
///
/// Query strings and fragments are ignored.
pub fn slug_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let last = path.rsplit('/').next().unwrap_or_default();
    last.split('-').take(3).collect::<Vec<_>>().join("-")
}

/// Summary of one archive page scrape.
#[derive(Debug, Default)]
pub struct ArchiveRun {
    /// Number of links found on the listing page.
    pub total_links: usize,
    /// Number of links left after category filtering.
    pub filtered_links: usize,
    /// Links actually attempted after the batch cap.
    pub attempted: usize,
    /// PDFs written, in batch order.
    pub rendered: Vec<PathBuf>,
    /// Articles that failed to fetch, parse or render.
    pub failed: usize,
}

/// A document copied by the keyword filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterMatch {
    /// The copied file inside the destination directory.
    pub destination: PathBuf,
    /// The keyword that matched first.
    pub term: String,
}

/// Summary of a keyword filter pass.
#[derive(Debug, Default)]
pub struct FilterReport {
    /// PDFs examined.
    pub scanned: usize,
    /// Files copied, in scan order.
    pub matches: Vec<FilterMatch>,
    /// Files with no extractable text (including failed extractions).
    pub empty: usize,
    /// Files with text but no matching keyword.
    pub unmatched: usize,
    /// Matching files that could not be copied.
    pub copy_failures: usize,
}
