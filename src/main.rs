//! # press_archive
//!
//! Turns the daily archive pages of German news sites into one PDF per
//! article, and filters the resulting PDFs by keyword.
//!
//! ## Usage
//!
//! ```sh
//! press_archive scrape --site bild --from 2016-12-19 --to 2016-12-23
//! press_archive filter -s training_set -d filtered_pdfs
//! ```
//!
//! ## Architecture
//!
//! The scrape pass runs per archive day:
//! 1. **Indexing**: Fetch the listing page and collect article links
//! 2. **Filtering**: Drop links in excluded categories and write both link lists as CSV
//! 3. **Rendering**: Fetch each article in turn, sanitize its text and write a PDF,
//!    pausing between articles
//!
//! The filter pass is run separately over the finished PDFs.

use chrono::NaiveDate;
use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod filter;
mod models;
mod outputs;
mod sanitize;
mod scrapers;
mod utils;

use cli::{Cli, Command, FilterArgs, ScrapeArgs};
use config::{ConfigFile, FilterConfig, ScrapeConfig};
use filter::KeywordFilter;
use scrapers::archive::ArchiveScraper;
use utils::{date_range, parse_archive_date};

/// Archive day scraped when no date is given.
const DEFAULT_ARCHIVE_DATE: &str = "2016-12-19";

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("press_archive starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config_file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };

    match args.command {
        Command::Scrape(scrape) => run_scrape(scrape, &config_file).await?,
        Command::Filter(filter) => run_filter(filter, &config_file).await?,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Dates named on the command line, in the order given, then the range.
fn requested_dates(args: &ScrapeArgs) -> Result<Vec<NaiveDate>, error::ArchiveError> {
    let mut dates = args
        .dates
        .iter()
        .map(|d| parse_archive_date(d))
        .collect::<Result<Vec<_>, _>>()?;

    if let (Some(from), Some(to)) = (&args.from, &args.to) {
        let (from, to) = (parse_archive_date(from)?, parse_archive_date(to)?);
        let range = date_range(from, to);
        if range.is_empty() {
            warn!(%from, %to, "Date range is empty");
        }
        dates.extend(range);
    }

    if dates.is_empty() && args.from.is_none() {
        dates.push(parse_archive_date(DEFAULT_ARCHIVE_DATE)?);
    }
    Ok(dates)
}

async fn run_scrape(args: ScrapeArgs, config_file: &ConfigFile) -> Result<(), Box<dyn Error>> {
    let profile = args.site.profile();
    let mut config = ScrapeConfig::for_site(&profile).merge_file(&config_file.scrape);
    if let Some(secs) = args.delay_secs {
        config.rate_limit_delay = std::time::Duration::from_secs(secs);
    }
    if let Some(secs) = args.timeout_secs {
        config.fetch_timeout = std::time::Duration::from_secs(secs);
    }
    if let Some(n) = args.max_articles {
        config.max_articles = Some(n);
    }

    let dates = requested_dates(&args)?;
    info!(
        site = %args.site,
        days = dates.len(),
        excluded = ?config.exclusion_categories,
        delay = ?config.rate_limit_delay,
        max_articles = ?config.max_articles,
        "Starting archive scrape"
    );

    let scraper = ArchiveScraper::new(profile, config, &args.output_dir)?;
    let runs = scraper.scrape_dates(&dates).await?;

    let rendered: usize = runs.iter().map(|(_, run)| run.rendered.len()).sum();
    let failed: usize = runs.iter().map(|(_, run)| run.failed).sum();
    info!(
        days = runs.len(),
        skipped_days = dates.len() - runs.len(),
        rendered,
        failed,
        output_dir = %scraper.output_dir().display(),
        "Archive scrape complete"
    );
    Ok(())
}

async fn run_filter(args: FilterArgs, config_file: &ConfigFile) -> Result<(), Box<dyn Error>> {
    let config = if args.terms.is_empty() {
        FilterConfig::default().merge_file(&config_file.filter)
    } else {
        FilterConfig::with_terms(&args.terms)
    };
    info!(terms = ?config.keyword_terms, "Starting keyword filter");

    let filter = KeywordFilter::new(&config)?;
    let report = filter.run(&args.source_dir, &args.dest_dir).await?;
    info!(
        scanned = report.scanned,
        copied = report.matches.len(),
        copy_failures = report.copy_failures,
        "Keyword filter complete"
    );
    Ok(())
}
