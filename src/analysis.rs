//! Fake-news analysis of the day's listing.
//!
//! Wraps the news in the analysis prompt, sends it through any [`AskAsync`]
//! client and normalizes the reply. The run never fails here: when the model
//! cannot be reached the news listing itself is returned, and the email
//! step formats it as plain text.

use crate::api::AskAsync;
use crate::html::normalize::normalize_response;
use crate::prompts;
use crate::utils::truncate_for_log;
use tracing::{debug, error, info, instrument, warn};

/// Ask the model for the HTML analysis of `news`.
///
/// Returns the normalized HTML on success, or `news` unchanged when the
/// request fails or the cleaned reply is empty.
#[instrument(level = "info", skip_all, fields(news_bytes = news.len()))]
pub async fn request_analysis<A>(asker: &A, news: &str, disclaimer: Option<&str>) -> String
where
    A: AskAsync<Response = String>,
{
    info!("Asking the model for analysis");
    let prompt = prompts::news_analysis(news);

    let raw = match asker.ask(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            error!(error = %e, "Analysis request failed; falling back to raw news");
            return news.to_string();
        }
    };
    debug!(response_preview = %truncate_for_log(&raw, 300), "Raw model response");

    let cleaned = normalize_response(&raw, disclaimer);
    if cleaned.is_empty() {
        warn!("Model returned an empty analysis; falling back to raw news");
        return news.to_string();
    }

    info!(bytes = cleaned.len(), "Analysis received");
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::error::Error;

    #[derive(Debug)]
    struct Canned {
        reply: Option<String>,
        prompts: RefCell<Vec<String>>,
    }

    impl Canned {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                prompts: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl AskAsync for Canned {
        type Response = String;

        async fn ask(&self, text: &str) -> Result<String, Box<dyn Error>> {
            self.prompts.borrow_mut().push(text.to_string());
            self.reply.clone().ok_or_else(|| "connection refused".into())
        }
    }

    const NEWS: &str = "Știri din biziday.ro (Știri verificate):\n\n1. Titlu\n   https://www.biziday.ro/t\n\n";
    const DISCLAIMER: &str = "Site-ul stiripesurse.ro este cunoscut pentru o gamă variată de știri";

    #[tokio::test]
    async fn test_reply_is_normalized() {
        let asker = Canned::replying(
            "Sigur, iată analiza:\n```html\n<!DOCTYPE html><html><body><h1>Analiza</h1></body></html>\n```",
        );
        let html = request_analysis(&asker, NEWS, Some(DISCLAIMER)).await;
        assert_eq!(html, "<!DOCTYPE html><html><body><h1>Analiza</h1></body></html>");
    }

    #[tokio::test]
    async fn test_prompt_carries_news() {
        let asker = Canned::replying("<p>ok</p>");
        request_analysis(&asker, NEWS, None).await;
        let prompts = asker.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("https://www.biziday.ro/t"));
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_news() {
        let asker = Canned::failing();
        assert_eq!(request_analysis(&asker, NEWS, None).await, NEWS);
    }

    #[tokio::test]
    async fn test_empty_reply_falls_back_to_news() {
        let asker = Canned::replying("```html\n\n```");
        assert_eq!(request_analysis(&asker, NEWS, None).await, NEWS);
    }

    #[tokio::test]
    async fn test_disclaimer_removed_from_reply() {
        let reply = format!("<body><p>{}.</p><p>Rest</p></body>", DISCLAIMER);
        let asker = Canned::replying(&reply);
        let html = request_analysis(&asker, NEWS, Some(DISCLAIMER)).await;
        assert_eq!(html, "<body><p>Rest</p></body>");
    }
}
