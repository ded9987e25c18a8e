//! Keyword filter pass over a directory of rendered PDFs.
//!
//! Every `*.pdf` file in the source directory is read page by page. The first
//! keyword found as a whole word (case-insensitive) wins, and the file is
//! copied unchanged into the destination directory. Files without text or
//! without a match are left where they are.

use crate::config::FilterConfig;
use crate::error::Result;
use crate::models::{FilterMatch, FilterReport};
use lopdf::Document;
use regex::{Regex, RegexBuilder};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

const PDF_EXTENSION: &str = "pdf";

/// Compiled keyword patterns, in priority order.
#[derive(Debug)]
pub struct KeywordFilter {
    patterns: Vec<(String, Regex)>,
}

impl KeywordFilter {
    pub fn new(config: &FilterConfig) -> Result<Self> {
        let patterns = config
            .keyword_terms
            .iter()
            .map(|term| {
                let pattern = format!(r"\b{}\b", regex::escape(term));
                let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
                Ok((term.clone(), regex))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// The first term that occurs in `text` as a whole word.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(_, regex)| regex.is_match(text))
            .map(|(term, _)| term.as_str())
    }

    /// Scan `source` and copy matching PDFs into `destination`.
    #[instrument(level = "info", skip_all, fields(source = %source.display(), destination = %destination.display()))]
    pub async fn run(&self, source: &Path, destination: &Path) -> Result<FilterReport> {
        fs::create_dir_all(destination).await?;

        let mut report = FilterReport::default();
        for path in pdf_files(source).await? {
            report.scanned += 1;

            let text = extract_text_blocking(&path).await;
            if text.trim().is_empty() {
                debug!(path = %path.display(), "No extractable text");
                report.empty += 1;
                continue;
            }

            match self.first_match(&text) {
                Some(term) => {
                    let Some(file_name) = path.file_name() else {
                        continue;
                    };
                    let target = destination.join(file_name);
                    if let Err(e) = fs::copy(&path, &target).await {
                        warn!(file = %path.display(), target = %target.display(), error = %e, "Could not copy matching document");
                        report.copy_failures += 1;
                        continue;
                    }
                    info!(file = %path.display(), %term, "Keyword found; copied document");
                    report.matches.push(FilterMatch {
                        destination: target,
                        term: term.to_string(),
                    });
                }
                None => report.unmatched += 1,
            }
        }

        info!(
            scanned = report.scanned,
            copied = report.matches.len(),
            empty = report.empty,
            unmatched = report.unmatched,
            copy_failures = report.copy_failures,
            "Keyword filter finished"
        );
        Ok(report)
    }
}

/// PDF files directly inside `dir`, sorted by name.
async fn pdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_pdf = path.extension().is_some_and(|ext| ext == PDF_EXTENSION);
        if is_pdf && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// [`extract_text`] on the blocking pool. A panicking extraction counts as no text.
async fn extract_text_blocking(path: &Path) -> String {
    let owned = path.to_path_buf();
    match tokio::task::spawn_blocking(move || extract_text(&owned)).await {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "PDF text extraction aborted");
            String::new()
        }
    }
}

/// Text of every page of a PDF.
///
/// Any failure is logged and yields an empty string, so the file counts as
/// having no text.
pub fn extract_text(path: &Path) -> String {
    let doc = match Document::load(path) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read PDF");
            return String::new();
        }
    };

    let mut text = String::new();
    for page in doc.get_pages().keys() {
        match doc.extract_text(&[*page]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => {
                warn!(path = %path.display(), page, error = %e, "Could not extract page text");
                return String::new();
            }
        }
    }
    text
}
