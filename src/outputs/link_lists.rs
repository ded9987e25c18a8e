//! CSV audit files for archive link lists.
//!
//! Both files are written right after the listing page is parsed, before any
//! article is fetched, so they show what the listing contained regardless of
//! later fetch failures. Each scrape overwrites the files from the previous one.
//! Rows end in CRLF.

use crate::error::Result;
use csv::{Terminator, WriterBuilder};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const ALL_LINKS_FILE: &str = "all_links.csv";
pub const FILTERED_LINKS_FILE: &str = "filtered_links.csv";

/// Write `links` to `path` as a single-column CSV with a `link` header.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), count = links.len()))]
pub fn write_link_list(path: &Path, links: &[String]) -> Result<()> {
    let mut writer = WriterBuilder::new().terminator(Terminator::CRLF).from_path(path)?;
    writer.write_record(["link"])?;
    for link in links {
        writer.write_record([link])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `all_links.csv` and `filtered_links.csv` into `dir`.
pub fn write_audit_lists(dir: &Path, all: &[String], filtered: &[String]) -> Result<(PathBuf, PathBuf)> {
    let all_path = dir.join(ALL_LINKS_FILE);
    let filtered_path = dir.join(FILTERED_LINKS_FILE);
    write_link_list(&all_path, all)?;
    write_link_list(&filtered_path, filtered)?;
    info!(
        all = all.len(),
        filtered = filtered.len(),
        dir = %dir.display(),
        "Wrote link audit lists"
    );
    Ok((all_path, filtered_path))
}
