//! Command-line interface definitions.
//!
//! Every option can also come from the settings file; values given here take
//! precedence. Options with an `env` fallback can be set in the environment.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for `stiri_digest`.
///
/// # Examples
///
/// ```sh
/// # Scrape, analyze and email the recipients from EMAIL_RECIPIENTS
/// stiri_digest
///
/// # Dry run: keep the HTML locally instead of sending it
/// stiri_digest --no-email --output-file ./azi.html
///
/// # Explicit recipients and a custom awful_aj model config
/// stiri_digest --recipients a@example.com,b@example.com --llm-config ./config.yaml
///
/// # Print what a page looks like to the scraper
/// stiri_digest --inspect-url https://www.biziday.ro/
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a settings YAML file
    #[arg(short, long, env = "STIRI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the awful_aj model config (defaults to its config directory)
    #[arg(long)]
    pub llm_config: Option<PathBuf>,

    /// Name of the awful_aj chat template used for the analysis
    #[arg(long)]
    pub template: Option<String>,

    /// Comma-separated list of email recipients
    #[arg(short, long, env = "EMAIL_RECIPIENTS", value_delimiter = ',')]
    pub recipients: Vec<String>,

    /// Generate the analysis without sending any email
    #[arg(long)]
    pub no_email: bool,

    /// Also write the final email HTML to this file
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,

    /// Gmail OAuth client credentials file
    #[arg(long)]
    pub credentials_file: Option<PathBuf>,

    /// Gmail OAuth token cache file
    #[arg(long)]
    pub token_file: Option<PathBuf>,

    /// Sender address (defaults to the authenticated Gmail account)
    #[arg(long)]
    pub from_email: Option<String>,

    /// Display name shown in the From header
    #[arg(long)]
    pub from_name: Option<String>,

    /// Email subject
    #[arg(short, long)]
    pub subject: Option<String>,

    /// Inspect a single page (title, headings, links) and exit
    #[arg(long)]
    pub inspect_url: Option<String>,
}

/// Parse `args` ignoring `STIRI_CONFIG` and `EMAIL_RECIPIENTS`, so results
/// do not depend on the calling shell.
#[cfg(test)]
pub fn parse_without_env<'a>(args: impl IntoIterator<Item = &'a str>) -> Cli {
    use clap::{CommandFactory, FromArgMatches};

    let command = Cli::command()
        .mut_arg("config", |arg| arg.env(None::<&'static str>))
        .mut_arg("recipients", |arg| arg.env(None::<&'static str>));
    let matches = command.get_matches_from(args);
    Cli::from_arg_matches(&matches).unwrap()
}
