//! Hacker News front-page scraper.
//!
//! This module scrapes listings from the [Hacker News](https://news.ycombinator.com/news)
//! front page. Each story title is an anchor inside a `span.titleline`, so one
//! selector yields exactly one anchor per story.
//!
//! # Link Format
//!
//! Story links are absolute URLs for external stories and relative ones such
//! as `item?id=42` for Ask/Show HN posts. They are kept as written unless
//! `resolve_links` is set, in which case they are joined onto the page URL.

use crate::config::ScrapeConfig;
use crate::error::ExtractError;
use crate::models::Listing;
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

/// CSS for story title anchors on the front page.
pub const TITLE_LINK_CSS: &str = "span.titleline > a";

/// Parsed form of [`TITLE_LINK_CSS`].
pub static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(TITLE_LINK_CSS).expect("static selector is valid CSS"));

/// Build the HTTP client used for scraping.
pub fn build_client(user_agent: &str) -> Result<Client, ExtractError> {
    Ok(Client::builder().user_agent(user_agent).build()?)
}

/// Parse a listing selector.
///
/// The default selector is served from [`TITLE_LINK`] without reparsing.
pub fn listing_selector(css: &str) -> Result<Selector, ExtractError> {
    if css == TITLE_LINK_CSS {
        return Ok(TITLE_LINK.clone());
    }
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Fetch the raw HTML of a page.
///
/// # Errors
///
/// Returns [`ExtractError::Http`] on transport failure or a non-success status.
#[instrument(level = "info", skip(client))]
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, ExtractError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let status = response.status();
    let body = response.text().await?;
    info!(%status, bytes = body.len(), "Fetched page");
    debug!(preview = %truncate_for_log(&body, 300), "Page body");
    Ok(body)
}

/// Lazily extract one [`Listing`] per anchor matching `selector`.
///
/// Nothing is read from the document until the iterator is advanced, and
/// each call starts a fresh pass over the document.
pub fn extract_listings<'a>(
    document: &'a Html,
    selector: &'a Selector,
) -> impl Iterator<Item = Listing> + 'a {
    document.select(selector).map(|anchor| Listing {
        title: first_text(&anchor),
        link: anchor.value().attr("href").map(str::to_string),
    })
}

/// First text node directly under `element`, if any.
fn first_text(element: &ElementRef<'_>) -> Option<String> {
    element
        .children()
        .find_map(|child| child.value().as_text().map(|text| (**text).to_string()))
}

/// Join `href` onto `base`, falling back to the raw href when it cannot be joined.
pub fn resolve_link(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|resolved| resolved.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Fetch the configured page and collect its listings.
///
/// # Errors
///
/// Propagates invalid URLs, invalid selectors and network failures.
#[instrument(level = "info", skip_all, fields(url = %config.start_url))]
pub async fn scrape_listings(
    client: &Client,
    config: &ScrapeConfig,
) -> Result<Vec<Listing>, ExtractError> {
    let base = Url::parse(&config.start_url)?;
    let selector = listing_selector(&config.selector)?;

    let html = fetch_page(client, base.as_str()).await?;
    let document = Html::parse_document(&html);

    let mut listings: Vec<Listing> = extract_listings(&document, &selector).collect();
    if config.resolve_links {
        for listing in &mut listings {
            if let Some(href) = listing.link.take() {
                listing.link = Some(resolve_link(&base, &href));
            }
        }
    }

    info!(count = listings.len(), selector = %config.selector, "Extracted listings");
    debug!(listings = ?listings, "Listings");
    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FRONT_PAGE: &str = r#"
        <html><body><table>
          <tr class="athing"><td class="title">
            <span class="titleline"><a href="https://example.com/rust">Rust 2.0 released</a>
              <span class="sitebit comhead"> (<a href="from?site=example.com"><span class="sitestr">example.com</span></a>)</span>
            </span>
          </td></tr>
          <tr class="athing"><td class="title">
            <span class="titleline"><a href="item?id=42">Ask HN: What are you <i>building</i>?</a></span>
          </td></tr>
          <tr class="athing"><td class="title">
            <span class="titleline"><a>Untitled link</a></span>
          </td></tr>
          <tr class="athing"><td class="title">
            <span class="titleline"><a href="https://example.org/"><b>Bold</b></a></span>
          </td></tr>
        </table></body></html>
    "#;

    fn listings(html: &str) -> Vec<Listing> {
        let document = Html::parse_document(html);
        extract_listings(&document, &TITLE_LINK).collect()
    }

    #[test]
    fn test_one_listing_per_matching_anchor() {
        let found = listings(FRONT_PAGE);
        // The site-bit anchor is nested deeper than `span.titleline > a`.
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn test_title_and_link_extracted() {
        let found = listings(FRONT_PAGE);
        assert_eq!(
            found[0],
            Listing {
                title: Some("Rust 2.0 released".to_string()),
                link: Some("https://example.com/rust".to_string()),
            }
        );
    }

    #[test]
    fn test_title_is_first_direct_text_node() {
        let found = listings(FRONT_PAGE);
        assert_eq!(found[1].title.as_deref(), Some("Ask HN: What are you "));
        assert_eq!(found[1].link.as_deref(), Some("item?id=42"));
    }

    #[test]
    fn test_missing_href_and_missing_text() {
        let found = listings(FRONT_PAGE);
        assert_eq!(found[2].link, None);
        assert_eq!(found[2].title.as_deref(), Some("Untitled link"));
        assert_eq!(found[3].title, None);
    }

    #[test]
    fn test_zero_matches_is_empty_not_error() {
        let found = listings("<html><body><p>No stories today</p></body></html>");
        assert!(found.is_empty());
    }

    #[test]
    fn test_extraction_restarts_per_call() {
        let document = Html::parse_document(FRONT_PAGE);
        let first: Vec<Listing> = extract_listings(&document, &TITLE_LINK).take(1).collect();
        let second: Vec<Listing> = extract_listings(&document, &TITLE_LINK).collect();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 4);
        assert_eq!(first[0], second[0]);
    }

    #[test]
    fn test_custom_selector() {
        let selector = listing_selector("span.sitestr").unwrap();
        let document = Html::parse_document(FRONT_PAGE);
        let found: Vec<Listing> = extract_listings(&document, &selector).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title.as_deref(), Some("example.com"));
        assert_eq!(found[0].link, None);
    }

    #[test]
    fn test_invalid_selector_is_error() {
        let result = listing_selector("span.titleline >");
        assert!(matches!(result, Err(ExtractError::Selector { .. })));
    }

    #[test]
    fn test_resolve_link() {
        let base = Url::parse("https://news.ycombinator.com/news").unwrap();
        assert_eq!(
            resolve_link(&base, "item?id=42"),
            "https://news.ycombinator.com/item?id=42"
        );
        assert_eq!(
            resolve_link(&base, "https://example.com/rust"),
            "https://example.com/rust"
        );
    }

    #[tokio::test]
    async fn test_scrape_rejects_invalid_url() {
        let client = build_client("test").unwrap();
        let config = ScrapeConfig {
            start_url: "not a url".to_string(),
            ..ScrapeConfig::default()
        };

        let result = scrape_listings(&client, &config).await;
        assert!(matches!(result, Err(ExtractError::InvalidUrl(_))));
    }

    async fn serve_front_page(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    fn config_for(server: &MockServer, resolve_links: bool) -> ScrapeConfig {
        ScrapeConfig {
            start_url: format!("{}/news", server.uri()),
            resolve_links,
            ..ScrapeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_scrape_listings_from_served_page() {
        let server = serve_front_page(200, FRONT_PAGE).await;
        let client = build_client("test").unwrap();

        let found = scrape_listings(&client, &config_for(&server, false))
            .await
            .unwrap();
        assert_eq!(found, listings(FRONT_PAGE));
        assert_eq!(found[1].link.as_deref(), Some("item?id=42"));
    }

    #[tokio::test]
    async fn test_scrape_listings_resolves_relative_links() {
        let server = serve_front_page(200, FRONT_PAGE).await;
        let client = build_client("test").unwrap();

        let found = scrape_listings(&client, &config_for(&server, true))
            .await
            .unwrap();
        assert_eq!(found.len(), 4);
        assert_eq!(found[0].link.as_deref(), Some("https://example.com/rust"));
        assert_eq!(
            found[1].link,
            Some(format!("{}/item?id=42", server.uri()))
        );
        assert_eq!(found[2].link, None);
    }

    #[tokio::test]
    async fn test_scrape_listings_non_success_status_is_http_error() {
        let server = serve_front_page(503, "Service Unavailable").await;
        let client = build_client("test").unwrap();

        let result = scrape_listings(&client, &config_for(&server, false)).await;
        match result {
            Err(ExtractError::Http(e)) => {
                assert_eq!(e.status().map(|s| s.as_u16()), Some(503));
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_returns_body() {
        let server = serve_front_page(200, "<p>hello</p>").await;
        let client = build_client("test").unwrap();

        let body = fetch_page(&client, &format!("{}/news", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<p>hello</p>");
    }
}
