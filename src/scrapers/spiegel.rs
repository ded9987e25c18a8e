//! DER SPIEGEL news archive.
//!
//! The archive lists one day per page at
//! `https://www.spiegel.de/nachrichtenarchiv/artikel-DD.MM.YYYY.html`. Links on
//! the page are absolute, and article pages carry a teaser block marked with
//! `data-area="intro"` in addition to the body text.

use super::{IntroRule, SiteProfile};
use super::links::PathSchema;
use crate::scrapers::Site;
use chrono::NaiveDate;

pub const ORIGIN: &str = "https://www.spiegel.de";

/// Sections skipped by default.
pub const EXCLUDED_CATEGORIES: &[&str] = &["sport", "wirtschaft", "stil"];

/// Listing path for a given day.
pub fn archive_path(date: NaiveDate) -> String {
    format!("/nachrichtenarchiv/artikel-{}.html", date.format("%d.%m.%Y"))
}

pub fn profile() -> SiteProfile {
    SiteProfile {
        site: Site::Spiegel,
        origin: ORIGIN.to_string(),
        archive_path,
        listing_link_selector: "main section div > article > header > h2 > a[href]",
        headline_selector: "h2 > span",
        headline_placeholder: "No Headline",
        timestamp_selector: "time",
        timestamp_placeholder: "No Date and Time",
        intro: Some(IntroRule {
            selector: r#"header[data-area="intro"] p"#,
            placeholder: "No Introduction",
        }),
        body_selector: r#"div[data-area="text"] p"#,
        path_schema: PathSchema::new(0),
        default_exclusions: EXCLUDED_CATEGORIES,
        default_batch_cap: Some(5),
    }
}
