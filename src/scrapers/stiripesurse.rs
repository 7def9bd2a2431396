//! stiripesurse.ro homepage scraper.
//!
//! Every story on the homepage is an `<article>` card. The first `h2`, `h3`
//! or `a` inside the card carries the headline, the first `a[href]` the link.

use crate::models::{ArticleRecord, SourceListing};
use crate::scrapers::{element_text, fetch_html, resolve_link};
use crate::settings::NewsSettings;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::error::Error;
use tracing::{debug, info, instrument};
use url::Url;

pub const HEADING: &str = "Știri din stiripesurse.ro:";

static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h2, h3, a").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Scrape the homepage into a listing.
#[instrument(level = "info", skip_all, fields(url = %news.stiripesurse_url))]
pub async fn scrape(client: &Client, news: &NewsSettings) -> Result<SourceListing, Box<dyn Error>> {
    info!("Scraping news from stiripesurse.ro");
    let base = Url::parse(&news.stiripesurse_url)?;
    let html = fetch_html(client, base.as_str()).await?;
    let articles = parse_articles(&html, &base, news.max_articles);

    info!(count = articles.len(), "Found stiripesurse.ro articles");
    debug!(articles = ?articles, "stiripesurse.ro articles");
    Ok(SourceListing::new(HEADING, articles))
}

/// Extract records from the first `max` `<article>` cards of a page.
///
/// The headline is the first `h2`, `h3` or `a` with visible text. Cards
/// missing a headline or a link are skipped, as are repeats of a
/// `(title, link)` pair already collected.
pub fn parse_articles(html: &str, base: &Url, max: usize) -> Vec<ArticleRecord> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut articles = Vec::new();

    for card in document.select(&ARTICLE).take(max) {
        let Some(title) = card.select(&TITLE).map(element_text).find(|t| !t.is_empty()) else {
            continue;
        };
        let Some(href) = card.select(&LINK).next().and_then(|a| a.value().attr("href")) else {
            continue;
        };
        let Some(link) = resolve_link(base, href) else {
            continue;
        };

        if seen.insert((title.clone(), link.clone())) {
            articles.push(ArticleRecord { title, link });
        }
    }

    articles
}
