//! # Știri Digest
//!
//! Scrapes the day's headlines from stiripesurse.ro and biziday.ro, asks a
//! language model for a fake-news analysis and narrative summary, and emails
//! the result as HTML through Gmail.
//!
//! ## Usage
//!
//! ```sh
//! EMAIL_RECIPIENTS=a@example.com,b@example.com stiri_digest
//! stiri_digest --no-email --output-file ./azi.html
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: scrape both sources, one request at a time
//! 2. **Analysis**: send the combined listing to the model (retried with backoff)
//! 3. **Normalization**: clean the reply into an HTML fragment, or format
//!    the raw listing when no analysis is available
//! 4. **Delivery**: send one `multipart/alternative` message per recipient
//!
//! A failure in any collaborator degrades the run instead of aborting it.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod api;
mod cli;
mod html;
mod mail;
mod models;
mod pipeline;
mod prompts;
mod scrapers;
mod settings;
mod utils;

use api::LlmBackend;
use cli::Cli;
use html::email::prepare_email_body;
use mail::gmail::GmailSender;
use pipeline::Capabilities;
use settings::Settings;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("stiri_digest starting up");

    let args = Cli::parse();
    debug!(?args.config, no_email = args.no_email, "Parsed CLI arguments");

    let settings = Settings::load(args.config.as_deref()).await?.with_cli(&args);

    // ---- HTTP client ----
    let client = match scrapers::build_client(&settings.news) {
        Ok(client) => Some(client),
        Err(e) => {
            error!(error = %e, "Could not build HTTP client");
            None
        }
    };

    if let Some(ref url) = args.inspect_url {
        let client = client.ok_or("HTTP client unavailable")?;
        scrapers::web::inspect(&client, url).await?;
        return Ok(());
    }

    // ---- Model backend ----
    let backend = match LlmBackend::load(&settings.ai).await {
        Ok(backend) => Some(backend),
        Err(e) => {
            warn!(error = %e, "Model backend unavailable; raw news will be sent");
            None
        }
    };

    let caps = Capabilities {
        fetch: client.is_some(),
        analysis: backend.is_some(),
        mail: mail::credentials_available(&settings.gmail),
    };
    info!(fetch = caps.fetch, analysis = caps.analysis, mail = caps.mail, "Capabilities");

    // ---- Fetch ----
    let news = match client {
        Some(ref client) if caps.fetch => pipeline::gather_news(client, &settings.news).await,
        _ => String::new(),
    };
    if news.trim().is_empty() {
        warn!("No news collected; nothing to analyze");
        return Ok(());
    }

    // ---- Analyze ----
    let content = match backend {
        Some(ref backend) if caps.analysis => {
            let asker = backend.asker(settings.ai.max_retries);
            analysis::request_analysis(&asker, &news, settings.disclaimer.as_deref()).await
        }
        _ => news.clone(),
    };

    let body = prepare_email_body(&content);

    if let Some(ref path) = args.output_file {
        match tokio::fs::write(path, &body.html).await {
            Ok(()) => info!(path = %path.display(), "Wrote email HTML"),
            Err(e) => error!(path = %path.display(), error = %e, "Failed writing email HTML"),
        }
    }

    // ---- Deliver ----
    if args.no_email {
        info!("Email sending disabled");
    } else if settings.email_recipients.is_empty() {
        warn!("No email recipients configured; set EMAIL_RECIPIENTS or --recipients");
    } else if !caps.mail {
        warn!(
            credentials = %settings.gmail.credentials_file.display(),
            token = %settings.gmail.token_file.display(),
            "Gmail credentials not found; email not sent"
        );
    } else {
        match GmailSender::connect(&settings.gmail).await {
            Ok(sender) => {
                let report = mail::deliver(
                    &sender,
                    &settings.email_recipients,
                    &settings.gmail.default_subject,
                    &body,
                )
                .await;
                info!(sent = report.sent.len(), failed = report.failed.len(), "Delivery finished");
            }
            Err(e) => error!(error = %e, "Gmail authentication failed; email not sent"),
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
