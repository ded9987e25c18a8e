//! Command-line interface definitions for press_archive.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The `scrape` subcommand turns archive pages into PDFs; `filter` copies the
//! PDFs that mention one of the configured keywords.

use crate::scrapers::Site;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the press_archive application.
///
/// # Examples
///
/// ```sh
/// # Scrape five days of the BILD archive
/// press_archive scrape --site bild --from 2016-12-19 --to 2016-12-23
///
/// # Scrape one SPIEGEL day into a custom folder
/// press_archive scrape --site spiegel --date 19.12.2016 -o test_newscript
///
/// # Copy PDFs mentioning the default keywords
/// press_archive filter -s training_set -d filtered_pdfs
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, global = true, env = "PRESS_ARCHIVE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape archive listing pages and render each article as a PDF
    Scrape(ScrapeArgs),
    /// Copy PDFs that contain one of the keywords into another directory
    Filter(FilterArgs),
}

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Archive to scrape
    #[arg(long, value_enum)]
    pub site: Site,

    /// Archive day (YYYY-MM-DD or DD.MM.YYYY); may be repeated
    #[arg(long = "date")]
    pub dates: Vec<String>,

    /// First day of an inclusive range
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Last day of an inclusive range
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// Output directory for link lists and PDFs
    #[arg(short, long, default_value = "training_set")]
    pub output_dir: PathBuf,

    /// Seconds to wait between two article fetches
    #[arg(long)]
    pub delay_secs: Option<u64>,

    /// Process only the first N filtered links of each day
    #[arg(long)]
    pub max_articles: Option<usize>,

    /// Timeout for each HTTP request in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Directory with rendered PDFs
    #[arg(short, long, default_value = "training_set")]
    pub source_dir: PathBuf,

    /// Directory matching PDFs are copied into
    #[arg(short, long, default_value = "filtered_pdfs")]
    pub dest_dir: PathBuf,

    /// Keyword to search for; may be repeated and replaces the configured list
    #[arg(long = "term")]
    pub terms: Vec<String>,
}
