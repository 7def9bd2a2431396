//! biziday.ro scraper.
//!
//! The homepage is a stream of short, verified news items grouped under a
//! "Știri verificate" heading, continued on `/page/2/`, `/page/3/`, and so
//! on. Each `<li>` in that list becomes one record.
//!
//! # Page heuristics
//!
//! 1. Find the first `h1`/`h2`/`h3`/`strong` whose text mentions
//!    "Știri verificate" and take the first `ul`/`div`/`section` after it in
//!    document order. Its `<li>` descendants are the candidates.
//! 2. Without such a section, every `<li>` on the page is a candidate.
//! 3. Items whose parent looks like navigation (`menu`, `cookie`, `footer`,
//!    `privacy` in its id or class) are skipped.
//! 4. The trailing `Biziday · YYYY-MM-DD …` stamp is cut from the title.

use crate::models::{ArticleRecord, SourceListing};
use crate::scrapers::{element_text, fetch_html, resolve_link};
use crate::settings::NewsSettings;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const HEADING: &str = "Știri din biziday.ro (Știri verificate):";

const SECTION_MARKER: &str = "Știri verificate";
const SKIPPED_PARENTS: [&str; 4] = ["menu", "cookie", "footer", "privacy"];

static SECTION_HEADER: Lazy<Selector> = Lazy::new(|| Selector::parse("h1, h2, h3, strong").unwrap());
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static DATE_STAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Biziday\s*·\s*\d{4}-\d{2}-\d{2}.*$").unwrap());

/// Walk the listing pages until enough records are collected.
///
/// A page that fails to load ends the walk; whatever was collected so far is
/// still returned.
#[instrument(level = "info", skip_all, fields(url = %news.biziday_url))]
pub async fn scrape(client: &Client, news: &NewsSettings) -> Result<SourceListing, Box<dyn Error>> {
    info!("Scraping news from biziday.ro");
    let base_url = news.biziday_url.trim_end_matches('/');
    let base = Url::parse(&format!("{}/", base_url))?;
    let mut collector = Collector::new(base, news.max_articles);

    for page in 1..=news.biziday_max_pages {
        if collector.is_full() {
            break;
        }
        let url = page_url(base_url, page);
        let html = match fetch_html(client, &url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(page, %url, error = %e, "Failed to fetch biziday.ro page; stopping");
                break;
            }
        };
        let added = collector.extract_page(&html);
        debug!(page, added, total = collector.count(), "Parsed biziday.ro page");
    }

    let articles = collector.into_articles();
    info!(count = articles.len(), "Found biziday.ro items");
    Ok(SourceListing::new(HEADING, articles))
}

/// URL of the n-th listing page (1-based).
pub fn page_url(base_url: &str, page: usize) -> String {
    let base_url = base_url.trim_end_matches('/');
    if page <= 1 {
        base_url.to_string()
    } else {
        format!("{}/page/{}/", base_url, page)
    }
}

/// Accumulates records across pages, deduplicating on `(title, link)`.
#[derive(Debug)]
pub struct Collector {
    base: Url,
    max: usize,
    seen: HashSet<(String, String)>,
    articles: Vec<ArticleRecord>,
}

impl Collector {
    pub fn new(base: Url, max: usize) -> Self {
        Self {
            base,
            max,
            seen: HashSet::new(),
            articles: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.articles.len() >= self.max
    }

    pub fn count(&self) -> usize {
        self.articles.len()
    }

    pub fn into_articles(self) -> Vec<ArticleRecord> {
        self.articles
    }

    /// Add the items of one listing page; returns how many were new.
    pub fn extract_page(&mut self, html: &str) -> usize {
        let document = Html::parse_document(html);
        let mut candidates: Vec<ElementRef<'_>> = verified_section(&document)
            .map(|section| section.select(&LIST_ITEM).collect())
            .unwrap_or_default();
        if candidates.is_empty() {
            candidates = document.select(&LIST_ITEM).collect();
        }

        let before = self.articles.len();
        for item in candidates {
            if self.is_full() {
                break;
            }
            if has_skipped_parent(item) {
                continue;
            }
            let Some(record) = self.record_from_item(item) else {
                continue;
            };
            if self.seen.insert((record.title.clone(), record.link.clone())) {
                self.articles.push(record);
            }
        }
        self.articles.len() - before
    }

    fn record_from_item(&self, item: ElementRef<'_>) -> Option<ArticleRecord> {
        let text = element_text(item);
        if text.is_empty() {
            return None;
        }
        let title = strip_date_stamp(&text);

        let link = match item.select(&LINK).next().and_then(|a| a.value().attr("href")) {
            Some(href) => resolve_link(&self.base, href)?,
            None => self.base.to_string(),
        };
        Some(ArticleRecord { title, link })
    }
}

/// Remove the trailing `Biziday · date` stamp, keeping the text if nothing
/// else is left.
pub fn strip_date_stamp(text: &str) -> String {
    let cleaned = DATE_STAMP.replace(text, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        text.to_string()
    } else {
        cleaned.to_string()
    }
}

/// First `ul`/`div`/`section` following the "Știri verificate" heading.
fn verified_section(document: &Html) -> Option<ElementRef<'_>> {
    let header = document
        .select(&SECTION_HEADER)
        .find(|el| element_text(*el).contains(SECTION_MARKER))?;
    let header_id = header.id();

    document
        .root_element()
        .descendants()
        .skip_while(|node| node.id() != header_id)
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| matches!(el.value().name(), "ul" | "div" | "section"))
}

fn has_skipped_parent(item: ElementRef<'_>) -> bool {
    let Some(parent) = item.parent().and_then(ElementRef::wrap) else {
        return false;
    };
    let id = parent.value().attr("id").unwrap_or_default();
    let classes = parent.value().classes().collect::<Vec<_>>().join(" ");
    let marker = format!("{}{}", id, classes).to_lowercase();
    SKIPPED_PARENTS.iter().any(|key| marker.contains(key))
}
