//! Archive scraping pipeline: index a listing page, then fetch and render articles.
//!
//! Articles are processed strictly one after another. Two consecutive article
//! fetches are always separated by the configured delay, including the last
//! article of one date and the first of the next. A failing article is logged
//! and counted but never stops the batch.

use super::SiteProfile;
use super::article::{fetch_html, parse_article};
use super::links::{ArticleLink, extract_links, filter_links};
use crate::config::ScrapeConfig;
use crate::error::Result;
use crate::models::{ArchivePage, ArchiveRun, DocumentName};
use crate::outputs::{link_lists, pdf};
use crate::sanitize::Sanitizer;
use crate::utils::{ensure_writable_dir, truncate_for_log};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Scrapes one archive site into a directory of PDFs.
pub struct ArchiveScraper {
    profile: SiteProfile,
    config: ScrapeConfig,
    client: Client,
    sanitizer: Sanitizer,
    output_dir: PathBuf,
}

impl ArchiveScraper {
    /// Build a scraper with an HTTP client bounded by the configured timeout.
    pub fn new(profile: SiteProfile, config: ScrapeConfig, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            profile,
            config,
            client,
            sanitizer: Sanitizer::default(),
            output_dir: output_dir.into(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fetch the listing page for `date` and collect its article links.
    #[instrument(level = "info", skip(self), fields(site = %self.profile.site))]
    pub async fn index_archive(&self, date: NaiveDate) -> Result<ArchivePage> {
        let url = self.profile.archive_url(date)?;
        let html = fetch_html(&self.client, url.as_str()).await?;
        let links = extract_links(&html, self.profile.listing_link_selector)?;
        if links.is_empty() {
            warn!(
                %url,
                preview = %truncate_for_log(&html, 200),
                "Listing page contained no article links"
            );
        }
        Ok(ArchivePage {
            date,
            url: url.to_string(),
            links,
        })
    }

    /// Scrape every date in order.
    ///
    /// A date whose listing cannot be fetched or parsed is skipped. An output
    /// directory that cannot be created or written aborts the whole run.
    pub async fn scrape_dates(&self, dates: &[NaiveDate]) -> Result<Vec<(NaiveDate, ArchiveRun)>> {
        ensure_writable_dir(&self.output_dir).await?;

        let mut runs = Vec::with_capacity(dates.len());
        let mut article_seen = false;
        for date in dates {
            match self.run_date(*date, article_seen).await {
                Ok(run) => {
                    article_seen |= run.attempted > 0;
                    runs.push((*date, run));
                }
                Err(e) => error!(%date, error = %e, "Archive page failed; continuing with next date"),
            }
        }
        Ok(runs)
    }

    /// Index, filter, persist link lists and render the batch for one date.
    pub async fn scrape_date(&self, date: NaiveDate) -> Result<ArchiveRun> {
        self.run_date(date, false).await
    }

    /// Like [`ArchiveScraper::scrape_date`]; `after_article` means an article
    /// was already fetched earlier in the run, so the first one here waits too.
    #[instrument(level = "info", skip(self), fields(site = %self.profile.site))]
    async fn run_date(&self, date: NaiveDate, after_article: bool) -> Result<ArchiveRun> {
        let page = self.index_archive(date).await?;
        let listing_url = Url::parse(&page.url)?;
        let filtered = filter_links(
            &page.links,
            &listing_url,
            &self.profile.path_schema,
            &self.config.exclusion_categories,
        );
        info!(all = page.links.len(), filtered = filtered.len(), "Filtered archive links");

        let filtered_hrefs: Vec<String> = filtered.iter().map(|link| link.href.clone()).collect();
        link_lists::write_audit_lists(&self.output_dir, &page.links, &filtered_hrefs)?;

        let batch = match self.config.max_articles {
            Some(cap) => &filtered[..cap.min(filtered.len())],
            None => &filtered[..],
        };
        let attempted = batch.len();

        let outcomes: Vec<Option<PathBuf>> = stream::iter(batch.iter().enumerate())
            .then(|(index, link)| async move {
                if index > 0 || after_article {
                    self.pause().await;
                }
                match self.process_article(date, index, link).await {
                    Ok(path) => {
                        info!(index, path = %path.display(), "Downloaded and saved article");
                        Some(path)
                    }
                    Err(e) => {
                        error!(index, url = %link.url, error = %e, "Article failed; skipping");
                        None
                    }
                }
            })
            .collect()
            .await;

        let rendered: Vec<PathBuf> = outcomes.into_iter().flatten().collect();
        let run = ArchiveRun {
            total_links: page.links.len(),
            filtered_links: filtered.len(),
            attempted,
            failed: attempted - rendered.len(),
            rendered,
        };
        info!(
            attempted = run.attempted,
            rendered = run.rendered.len(),
            failed = run.failed,
            "Finished archive page"
        );
        Ok(run)
    }

    /// Wait out the rate limit before the next article fetch.
    async fn pause(&self) {
        let delay = self.config.rate_limit_delay;
        if !delay.is_zero() {
            debug!(?delay, "Rate limit pause");
            tokio::time::sleep(delay).await;
        }
    }

    /// Fetch, parse and render the `index`-th link of a batch.
    #[instrument(level = "info", skip_all, fields(url = %link.url, index = index))]
    async fn process_article(&self, date: NaiveDate, index: usize, link: &ArticleLink) -> Result<PathBuf> {
        let name = DocumentName::new(date, index, &link.category, link.url.as_str());
        let path = self.output_dir.join(name.file_name());

        let html = fetch_html(&self.client, link.url.as_str()).await?;
        let article = parse_article(&html, link.url.as_str(), &self.profile)?;
        pdf::render_article(&article, &self.sanitizer, &path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::link_lists::{ALL_LINKS_FILE, FILTERED_LINKS_FILE};
    use crate::scrapers::Site;
    use mockito::Matcher;
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    type FetchLog = Arc<Mutex<Vec<(String, Instant)>>>;

    const LISTING: &str = r#"<html><body><main><section><ul>
        <li><article><a href="/sport/a-1">Sport</a></article></li>
        <li><article><a href="/regional/b-2">B</a></article></li>
        <li><article><a href="/regional/c-3">C</a></article></li>
    </ul></section></main></body></html>"#;

    const ARTICLE: &str = r#"<html><body>
        <h2><span>Anschlag in Berlin</span></h2>
        <time>19.12.2016 - 22:01 Uhr</time>
        <div class="article-body"><p>Ein Lastwagen fuhr in den Weihnachtsmarkt.</p></div>
    </body></html>"#;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 12, 19).unwrap()
    }

    fn test_config(excluded: &[&str]) -> ScrapeConfig {
        ScrapeConfig {
            exclusion_categories: excluded.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            rate_limit_delay: Duration::ZERO,
            fetch_timeout: Duration::from_secs(5),
            max_articles: None,
            user_agent: "press_archive-test".to_string(),
        }
    }

    async fn mock_listing_on(server: &mut mockito::ServerGuard, archive_date: &str, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/themen/uebersicht/archiv/archiv-82532020.bild.html")
            .match_query(Matcher::UrlEncoded("archiveDate".into(), archive_date.into()))
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(body)
            .create_async()
            .await
    }

    async fn mock_listing(server: &mut mockito::ServerGuard) -> mockito::Mock {
        mock_listing_on(server, "2016-12-19", LISTING).await
    }

    fn listing_of(links: &[&str]) -> String {
        let items: String = links
            .iter()
            .map(|href| format!(r#"<li><article><a href="{href}">x</a></article></li>"#))
            .collect();
        format!("<html><body><main><section><ul>{items}</ul></section></main></body></html>")
    }

    /// Serve `ARTICLE` at `path`, recording when each request arrives.
    async fn mock_logged_article(server: &mut mockito::ServerGuard, path: &str, log: &FetchLog) -> mockito::Mock {
        let log = Arc::clone(log);
        let name = path.to_string();
        server
            .mock("GET", path)
            .with_status(200)
            .with_body_from_request(move |_| {
                log.lock().unwrap().push((name.clone(), Instant::now()));
                ARTICLE.as_bytes().to_vec()
            })
            .create_async()
            .await
    }

    fn assert_spaced(log: &FetchLog, expected: &[&str], delay: Duration) {
        let log = log.lock().unwrap();
        let order: Vec<&str> = log.iter().map(|(path, _)| path.as_str()).collect();
        assert_eq!(order, expected);
        for pair in log.windows(2) {
            let gap = pair[1].1.duration_since(pair[0].1);
            assert!(gap >= delay, "{} fetched {gap:?} after {}", pair[1].0, pair[0].0);
        }
    }

    #[tokio::test]
    async fn test_scrape_date_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        let listing = mock_listing(&mut server).await;
        let excluded = server.mock("GET", "/sport/a-1").expect(0).create_async().await;
        let ok = server
            .mock("GET", "/regional/b-2")
            .with_status(200)
            .with_body(ARTICLE)
            .expect(1)
            .create_async()
            .await;
        let broken = server.mock("GET", "/regional/c-3").with_status(500).expect(1).create_async().await;

        let tmp = tempfile::tempdir().unwrap();
        let profile = Site::Bild.profile().with_origin(server.url());
        let scraper = ArchiveScraper::new(profile, test_config(&["sport"]), tmp.path()).unwrap();

        let runs = scraper.scrape_dates(&[date()]).await.unwrap();
        assert_eq!(runs.len(), 1);
        let run = &runs[0].1;
        assert_eq!(run.total_links, 3);
        assert_eq!(run.filtered_links, 2);
        assert_eq!(run.attempted, 2);
        assert_eq!(run.failed, 1);
        assert_eq!(run.rendered, vec![tmp.path().join("2016-12-19_01_regional_b-2.pdf")]);
        assert!(run.rendered[0].is_file());
        assert!(!tmp.path().join("2016-12-19_02_regional_c-3.pdf").exists());

        assert_eq!(
            std::fs::read_to_string(tmp.path().join(ALL_LINKS_FILE)).unwrap(),
            "link\r\n/sport/a-1\r\n/regional/b-2\r\n/regional/c-3\r\n"
        );
        assert_eq!(
            std::fs::read_to_string(tmp.path().join(FILTERED_LINKS_FILE)).unwrap(),
            "link\r\n/regional/b-2\r\n/regional/c-3\r\n"
        );

        listing.assert_async().await;
        excluded.assert_async().await;
        ok.assert_async().await;
        broken.assert_async().await;
    }

    #[tokio::test]
    async fn test_batch_cap_limits_fetches() {
        let mut server = mockito::Server::new_async().await;
        let _listing = mock_listing(&mut server).await;
        let first = server.mock("GET", "/sport/a-1").with_body(ARTICLE).expect(1).create_async().await;
        let rest = server
            .mock("GET", Matcher::Regex("^/regional/".to_string()))
            .with_body(ARTICLE)
            .expect(0)
            .create_async()
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let mut config = test_config(&[]);
        config.max_articles = Some(1);
        let scraper = ArchiveScraper::new(Site::Bild.profile().with_origin(server.url()), config, tmp.path()).unwrap();

        let run = scraper.scrape_date(date()).await.unwrap();
        assert_eq!(run.filtered_links, 3);
        assert_eq!(run.attempted, 1);
        assert_eq!(run.rendered, vec![tmp.path().join("2016-12-19_01_sport_a-1.pdf")]);

        first.assert_async().await;
        rest.assert_async().await;
    }

    #[tokio::test]
    async fn test_delay_between_articles_of_one_date() {
        let delay = Duration::from_millis(300);
        let mut server = mockito::Server::new_async().await;
        let _listing = mock_listing(&mut server).await;
        let log = FetchLog::default();
        let mut mocks = Vec::new();
        for path in ["/sport/a-1", "/regional/b-2", "/regional/c-3"] {
            mocks.push(mock_logged_article(&mut server, path, &log).await);
        }

        let tmp = tempfile::tempdir().unwrap();
        let mut config = test_config(&[]);
        config.rate_limit_delay = delay;
        let scraper = ArchiveScraper::new(Site::Bild.profile().with_origin(server.url()), config, tmp.path()).unwrap();

        let run = scraper.scrape_date(date()).await.unwrap();
        let finished = Instant::now();

        assert_eq!(run.rendered.len(), 3);
        assert_spaced(&log, &["/sport/a-1", "/regional/b-2", "/regional/c-3"], delay);
        let last_fetch = log.lock().unwrap()[2].1;
        assert!(finished.duration_since(last_fetch) < delay, "no pause after the last article");
    }

    #[tokio::test]
    async fn test_delay_carries_across_dates() {
        let delay = Duration::from_millis(300);
        let mut server = mockito::Server::new_async().await;
        let _first = mock_listing_on(&mut server, "2016-12-19", &listing_of(&["/regional/a-1"])).await;
        let _second = mock_listing_on(&mut server, "2016-12-20", &listing_of(&["/regional/b-2"])).await;
        let log = FetchLog::default();
        let _a = mock_logged_article(&mut server, "/regional/a-1", &log).await;
        let _b = mock_logged_article(&mut server, "/regional/b-2", &log).await;

        let tmp = tempfile::tempdir().unwrap();
        let mut config = test_config(&[]);
        config.rate_limit_delay = delay;
        let scraper = ArchiveScraper::new(Site::Bild.profile().with_origin(server.url()), config, tmp.path()).unwrap();

        let dates = [date(), date().succ_opt().unwrap()];
        let runs = scraper.scrape_dates(&dates).await.unwrap();

        assert_eq!(runs.len(), 2);
        assert_spaced(&log, &["/regional/a-1", "/regional/b-2"], delay);
    }

    #[tokio::test]
    async fn test_failed_listing_skips_date() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("GET", "/themen/uebersicht/archiv/archiv-82532020.bild.html")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let scraper =
            ArchiveScraper::new(Site::Bild.profile().with_origin(server.url()), test_config(&[]), tmp.path()).unwrap();

        let runs = scraper.scrape_dates(&[date()]).await.unwrap();
        assert!(runs.is_empty());
        assert!(!tmp.path().join(ALL_LINKS_FILE).exists());
    }
}
