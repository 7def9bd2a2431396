//! Generic page inspection.
//!
//! Backs `--inspect-url`: a quick look at how an arbitrary page appears to
//! the scraper when a source changes its markup.

use crate::models::{PageLink, PageSummary};
use crate::scrapers::{element_text, fetch_html};
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector, node::Node};
use std::error::Error;
use tracing::{debug, info, instrument};

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static H2: Lazy<Selector> = Lazy::new(|| Selector::parse("h2").unwrap());
static H3: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

const HREF_PREVIEW: usize = 50;
const TEXT_PREVIEW: usize = 60;
const LOGGED_LINKS: usize = 10;

/// Fetch `url` and log what the scraper sees.
#[instrument(level = "info", skip(client))]
pub async fn inspect(client: &Client, url: &str) -> Result<PageSummary, Box<dyn Error>> {
    let html = fetch_html(client, url).await?;
    let summary = summarize_page(&html, url);

    info!(title = %summary.title, "Page title");
    info!(
        h1 = summary.h1_count,
        h2 = summary.h2_count,
        h3 = summary.h3_count,
        links = summary.links.len(),
        "Element counts"
    );
    for link in summary.links.iter().take(LOGGED_LINKS) {
        info!(href = %link.href, text = %link.text, "Link");
    }
    debug!(text = %truncate_for_log(&summary.text, 2000), "Visible text");
    Ok(summary)
}

/// Extract title, heading counts, links and visible text from a page.
///
/// The title falls back to `url` when the page has none. Links without text
/// are left out; hrefs and texts are shortened for display.
pub fn summarize_page(html: &str, url: &str) -> PageSummary {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| url.to_string());

    let links = document
        .select(&LINK)
        .filter_map(|a| {
            let text = element_text(a);
            if text.is_empty() {
                return None;
            }
            let href = a.value().attr("href").unwrap_or_default();
            Some(PageLink {
                href: href.chars().take(HREF_PREVIEW).collect(),
                text: text.chars().take(TEXT_PREVIEW).collect(),
            })
        })
        .collect();

    PageSummary {
        title,
        text: visible_text(document.root_element()),
        links,
        h1_count: document.select(&H1).count(),
        h2_count: document.select(&H2).count(),
        h3_count: document.select(&H3).count(),
    }
}

/// One line per non-empty text fragment, skipping script and style bodies.
///
/// Fragments separated by runs of two spaces end up on separate lines.
fn visible_text(root: ElementRef<'_>) -> String {
    root.descendants()
        .filter(|node| {
            !node.ancestors().any(|a| {
                matches!(a.value(), Node::Element(el) if matches!(el.name(), "script" | "style"))
            })
        })
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some(text.to_string()),
            _ => None,
        })
        .flat_map(|text| {
            text.lines()
                .flat_map(|line| line.trim().split("  ").map(str::trim).collect::<Vec<_>>())
                .filter(|chunk| !chunk.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head><title> Biziday </title><style>body { color: red; }</style></head>
          <body>
            <h1>Titlu</h1>
            <h2>Unu</h2><h2>Doi</h2>
            <script>var tracking = true;</script>
            <p>Primul rând  Al doilea fragment</p>
            <a href="/a"><img src="x.png"></a>
            <a href="https://www.biziday.ro/un-link-foarte-lung-care-depaseste-cincizeci-de-caractere/">Citește</a>
          </body>
        </html>
    "#;

    #[test]
    fn test_summarize_page() {
        let summary = summarize_page(PAGE, "https://www.biziday.ro/");
        assert_eq!(summary.title, "Biziday");
        assert_eq!(summary.h1_count, 1);
        assert_eq!(summary.h2_count, 2);
        assert_eq!(summary.h3_count, 0);
        assert_eq!(summary.links.len(), 1);
        assert_eq!(summary.links[0].href.chars().count(), 50);
        assert_eq!(summary.links[0].text, "Citește");
    }

    #[test]
    fn test_visible_text_skips_scripts() {
        let summary = summarize_page(PAGE, "https://www.biziday.ro/");
        assert!(!summary.text.contains("tracking"));
        assert!(!summary.text.contains("color: red"));
        assert!(summary.text.contains("Primul rând\nAl doilea fragment"));
    }

    #[test]
    fn test_missing_title_falls_back_to_url() {
        let summary = summarize_page("<html><body><p>x</p></body></html>", "https://x.ro/");
        assert_eq!(summary.title, "https://x.ro/");
    }
}
