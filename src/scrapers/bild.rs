//! BILD news archive.
//!
//! The archive page takes the day as an `archiveDate` query parameter in ISO
//! format. Links on the page are site-relative, and article pages have no
//! teaser block, only a headline, a timestamp and the `article-body` text.

use super::SiteProfile;
use super::links::PathSchema;
use crate::scrapers::Site;
use chrono::NaiveDate;

pub const ORIGIN: &str = "https://www.bild.de";

/// Sections skipped by default.
pub const EXCLUDED_CATEGORIES: &[&str] = &["sport", "geld", "spiele", "rezepte", "lifestyle", "bild-plus"];

/// Listing path and query for a given day.
pub fn archive_path(date: NaiveDate) -> String {
    format!(
        "/themen/uebersicht/archiv/archiv-82532020.bild.html?archiveDate={}",
        date.format("%Y-%m-%d")
    )
}

pub fn profile() -> SiteProfile {
    SiteProfile {
        site: Site::Bild,
        origin: ORIGIN.to_string(),
        archive_path,
        listing_link_selector: "main section ul > li > article > a[href]",
        headline_selector: "h2 > span",
        headline_placeholder: "No Title",
        timestamp_selector: "time",
        timestamp_placeholder: "No Date and Time",
        intro: None,
        body_selector: r#"div[class="article-body"] p"#,
        path_schema: PathSchema::new(0),
        default_exclusions: EXCLUDED_CATEGORIES,
        default_batch_cap: None,
    }
}
