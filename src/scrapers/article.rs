//! Article page fetching and field extraction.
//!
//! Fields are read from the direct text nodes of the matched elements, so
//! markup nested inside a headline span or a body paragraph (links, bold runs)
//! does not leak into neighbouring fragments. Whitespace-only nodes are
//! skipped. A field whose query matches nothing gets the site's placeholder.

use super::SiteProfile;
use super::links::compile_selector;
use crate::error::Result;
use crate::models::Article;
use reqwest::Client;
use scraper::{ElementRef, Html};
use tracing::{debug, instrument};

/// Fetch a page and return its body, failing on non-success status codes.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_html(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    debug!(bytes = body.len(), "Fetched page");
    Ok(body)
}

/// Trimmed, non-empty text nodes that are direct children of `element`.
fn direct_text(element: ElementRef<'_>) -> impl Iterator<Item = String> + '_ {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// All direct text fragments under every match of `selector`, in document order.
fn fragments(document: &Html, selector: &str) -> Result<Vec<String>> {
    let selector = compile_selector(selector)?;
    Ok(document.select(&selector).flat_map(direct_text).collect())
}

/// Extract an [`Article`] from page markup using the site's queries.
pub fn parse_article(html: &str, source: &str, profile: &SiteProfile) -> Result<Article> {
    let document = Html::parse_document(html);

    let headline_parts = fragments(&document, profile.headline_selector)?;
    let headline = if headline_parts.is_empty() {
        profile.headline_placeholder.to_string()
    } else {
        headline_parts.join(" ")
    };

    let timestamp = fragments(&document, profile.timestamp_selector)?
        .into_iter()
        .next()
        .unwrap_or_else(|| profile.timestamp_placeholder.to_string());

    let intro = match &profile.intro {
        Some(rule) => Some(
            fragments(&document, rule.selector)?
                .into_iter()
                .next()
                .unwrap_or_else(|| rule.placeholder.to_string()),
        ),
        None => None,
    };

    let body = fragments(&document, profile.body_selector)?.join("\n");

    Ok(Article {
        source: source.to_string(),
        headline,
        timestamp,
        intro,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::Site;

    const SPIEGEL_ARTICLE: &str = r#"<html><body>
        <header data-area="intro">
          <h2><span>Berlin</span> <span>Lkw rast in Weihnachtsmarkt</span></h2>
          <p>Am Breitscheidplatz ist ein Lastwagen in einen Weihnachtsmarkt gefahren.</p>
          <time datetime="2016-12-19 21:14:00">19.12.2016, 21.14 Uhr</time>
        </header>
        <div data-area="text">
          <p>Erster Absatz.</p>
          <section><p>Zweiter <a href="/x">Link</a> Absatz.</p></section>
        </div>
    </body></html>"#;

    #[test]
    fn test_parse_spiegel_article() {
        let article = parse_article(SPIEGEL_ARTICLE, "https://www.spiegel.de/a", &Site::Spiegel.profile()).unwrap();
        assert_eq!(article.headline, "Berlin Lkw rast in Weihnachtsmarkt");
        assert_eq!(article.timestamp, "19.12.2016, 21.14 Uhr");
        assert_eq!(
            article.intro.as_deref(),
            Some("Am Breitscheidplatz ist ein Lastwagen in einen Weihnachtsmarkt gefahren.")
        );
        assert_eq!(article.body, "Erster Absatz.\nZweiter\nAbsatz.");
    }

    #[test]
    fn test_parse_bild_article() {
        let html = r#"<html><body>
            <h2><span>Terror in Berlin</span></h2>
            <time>19.12.2016 - 22:01 Uhr</time>
            <div class="article-body"><p>Satz eins.</p><p>Satz zwei.</p></div>
            <div class="article-body teaser"><p>Nicht im Text.</p></div>
        </body></html>"#;
        let article = parse_article(html, "https://www.bild.de/a", &Site::Bild.profile()).unwrap();
        assert_eq!(article.headline, "Terror in Berlin");
        assert_eq!(article.intro, None);
        assert_eq!(article.body, "Satz eins.\nSatz zwei.");
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let html = "<html><body><p>nothing useful</p></body></html>";

        let bild = parse_article(html, "u", &Site::Bild.profile()).unwrap();
        assert_eq!(bild.headline, "No Title");
        assert_eq!(bild.timestamp, "No Date and Time");
        assert_eq!(bild.body, "");

        let spiegel = parse_article(html, "u", &Site::Spiegel.profile()).unwrap();
        assert_eq!(spiegel.headline, "No Headline");
        assert_eq!(spiegel.intro.as_deref(), Some("No Introduction"));
    }

    #[tokio::test]
    async fn test_fetch_html_rejects_error_status() {
        let mut server = mockito::Server::new_async().await;
        let m = server.mock("GET", "/gone").with_status(404).create_async().await;

        let client = Client::new();
        let result = fetch_html(&client, &format!("{}/gone", server.url())).await;
        assert!(result.is_err());
        m.assert_async().await;
    }
}
