//! Data models shared across the pipeline.
//!
//! - [`ArticleRecord`]: a scraped headline and its absolute link
//! - [`SourceListing`]: the records collected from one news source
//! - [`EmailBody`]: the HTML and plain-text parts attached to a message
//! - [`PageSummary`]: result of inspecting an arbitrary page

use std::fmt::Write;

/// A headline scraped from a news source.
///
/// The link is always absolute; relative hrefs are resolved against the
/// source's base URL before a record is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArticleRecord {
    pub title: String,
    pub link: String,
}

/// All records scraped from one source in a single run, in page order.
#[derive(Debug, Clone, Default)]
pub struct SourceListing {
    /// Heading placed above the records when the listing is rendered as text.
    pub heading: String,
    pub articles: Vec<ArticleRecord>,
}

impl SourceListing {
    pub fn new(heading: impl Into<String>, articles: Vec<ArticleRecord>) -> Self {
        Self {
            heading: heading.into(),
            articles,
        }
    }

    /// Render the listing as the numbered text block sent to the model.
    ///
    /// ```text
    /// Știri din stiripesurse.ro:
    ///
    /// 1. Titlu
    ///    https://www.stiripesurse.ro/titlu
    ///
    /// ```
    ///
    /// An empty listing renders as an empty string.
    pub fn to_text(&self) -> String {
        if self.articles.is_empty() {
            return String::new();
        }
        let mut out = format!("{}\n\n", self.heading);
        for (i, article) in self.articles.iter().enumerate() {
            let _ = write!(out, "{}. {}\n   {}\n\n", i + 1, article.title, article.link);
        }
        out
    }
}

/// The two alternative parts of an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailBody {
    /// Body-level HTML fragment, never a full document.
    pub html: String,
    /// Plain-text rendering of `html`.
    pub text: String,
}

/// A link found while inspecting a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub href: String,
    pub text: String,
}

/// Basic information extracted from an arbitrary web page.
#[derive(Debug, Clone, Default)]
pub struct PageSummary {
    pub title: String,
    pub text: String,
    pub links: Vec<PageLink>,
    pub h1_count: usize,
    pub h2_count: usize,
    pub h3_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, link: &str) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            link: link.to_string(),
        }
    }

    #[test]
    fn test_listing_to_text() {
        let listing = SourceListing::new(
            "Știri din stiripesurse.ro:",
            vec![
                record("Primul titlu", "https://www.stiripesurse.ro/a"),
                record("Al doilea", "https://www.stiripesurse.ro/b"),
            ],
        );
        assert_eq!(
            listing.to_text(),
            "Știri din stiripesurse.ro:\n\n\
             1. Primul titlu\n   https://www.stiripesurse.ro/a\n\n\
             2. Al doilea\n   https://www.stiripesurse.ro/b\n\n"
        );
    }

    #[test]
    fn test_empty_listing_renders_nothing() {
        let listing = SourceListing::new("Știri din biziday.ro (Știri verificate):", vec![]);
        assert_eq!(listing.to_text(), "");
    }
}
