//! Run-level orchestration helpers.
//!
//! Collaborator availability is decided once at startup and recorded in
//! [`Capabilities`]; the rest of the run branches on those flags instead of
//! probing again.

use crate::models::SourceListing;
use crate::scrapers::{biziday, stiripesurse};
use crate::settings::NewsSettings;
use reqwest::Client;
use tracing::{error, info, instrument};

/// Which collaborators can be used in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// HTTP client built.
    pub fetch: bool,
    /// Model config and chat template loaded.
    pub analysis: bool,
    /// Gmail token or client credentials present.
    pub mail: bool,
}

/// Scrape both sources in turn and return the combined text listing.
///
/// A source that fails contributes nothing; the other is still used.
#[instrument(level = "info", skip_all)]
pub async fn gather_news(client: &Client, news: &NewsSettings) -> String {
    let mut listings = Vec::with_capacity(2);

    match stiripesurse::scrape(client, news).await {
        Ok(listing) => listings.push(listing),
        Err(e) => error!(source = "stiripesurse.ro", error = %e, "Scrape failed"),
    }
    match biziday::scrape(client, news).await {
        Ok(listing) => listings.push(listing),
        Err(e) => error!(source = "biziday.ro", error = %e, "Scrape failed"),
    }

    let total: usize = listings.iter().map(|l| l.articles.len()).sum();
    info!(articles = total, "News collected");
    combine_listings(&listings)
}

/// Join the non-empty listings' text blocks with a blank line.
pub fn combine_listings(listings: &[SourceListing]) -> String {
    listings
        .iter()
        .map(SourceListing::to_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
