//! News source scrapers.
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | stiripesurse.ro | [`stiripesurse`] | HTML scraping | `<article>` cards on the homepage |
//! | biziday.ro | [`biziday`] | HTML scraping | "Știri verificate" list, walks `/page/N/` |
//! | any page | [`web`] | HTML scraping | Diagnostic summary for `--inspect-url` |
//!
//! Each news scraper exports a `scrape(client, settings)` entry point that
//! returns a [`SourceListing`](crate::models::SourceListing), and a pure
//! parsing function working on an HTML string so the heuristics can be
//! tested on fixtures. Requests go out one after the other through a single
//! shared [`reqwest::Client`].

pub mod biziday;
pub mod stiripesurse;
pub mod web;

use crate::settings::NewsSettings;
use reqwest::Client;
use scraper::ElementRef;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Desktop browser User-Agent sent with every scrape request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Build the HTTP client shared by all scrapers.
pub fn build_client(news: &NewsSettings) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(news.request_timeout_secs))
        .build()
}

/// GET a page and return its body, failing on non-success status codes.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_html(client: &Client, url: &str) -> Result<String, Box<dyn Error>> {
    let response = client.get(url).send().await?.error_for_status()?;
    let html = response.text().await?;
    debug!(bytes = html.len(), "Fetched page");
    Ok(html)
}

/// Resolve an href against the source base URL.
///
/// Absolute links come back unchanged; anything that cannot be joined yields
/// `None`.
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(|url| url.to_string())
}

/// Visible text of an element: text runs trimmed, empty runs dropped,
/// joined with single spaces.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_link() {
        let base = Url::parse("https://www.stiripesurse.ro/").unwrap();
        assert_eq!(
            resolve_link(&base, "/politica/ceva.html").as_deref(),
            Some("https://www.stiripesurse.ro/politica/ceva.html")
        );
    }

    #[test]
    fn test_resolve_absolute_link_unchanged() {
        let base = Url::parse("https://www.biziday.ro/").unwrap();
        assert_eq!(
            resolve_link(&base, " https://other.ro/a ").as_deref(),
            Some("https://other.ro/a")
        );
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(&NewsSettings::default()).is_ok());
    }
}
