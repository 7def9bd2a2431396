//! Application settings.
//!
//! One immutable [`Settings`] value is built at startup from an optional YAML
//! file plus command-line overrides, then passed by reference to whatever
//! needs it. Every field has a default, so an empty file (or no file) is a
//! valid configuration.
//!
//! ```yaml
//! news:
//!   max_articles: 100
//! gmail:
//!   from_name: "Știri AI"
//! email_recipients:
//!   - cineva@example.com
//! ```

use crate::cli::Cli;
use itertools::Itertools;
use serde::Deserialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Paragraph text the model tends to add about stiripesurse.ro; removed
/// from the analysis when present verbatim.
pub const DEFAULT_DISCLAIMER: &str =
    "Site-ul stiripesurse.ro este cunoscut pentru o gamă variată de știri";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub news: NewsSettings,
    pub ai: AiSettings,
    pub gmail: GmailSettings,
    pub email_recipients: Vec<String>,
    /// Set to `null` in the YAML file to keep disclaimer paragraphs.
    pub disclaimer: Option<String>,
}

/// Scraping targets and limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    pub stiripesurse_url: String,
    pub biziday_url: String,
    /// Upper bound on records collected per source.
    pub max_articles: usize,
    /// Number of biziday.ro listing pages to walk.
    pub biziday_max_pages: usize,
    pub request_timeout_secs: u64,
}

/// Model access. Endpoint, key and model name live in the awful_aj config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// awful_aj `config.yaml`; `None` means its default config directory.
    pub llm_config: Option<PathBuf>,
    pub template: String,
    pub max_retries: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GmailSettings {
    pub credentials_file: PathBuf,
    pub token_file: PathBuf,
    pub default_subject: String,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            news: NewsSettings::default(),
            ai: AiSettings::default(),
            gmail: GmailSettings::default(),
            email_recipients: Vec::new(),
            disclaimer: Some(DEFAULT_DISCLAIMER.to_string()),
        }
    }
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            stiripesurse_url: "https://www.stiripesurse.ro/".to_string(),
            biziday_url: "https://www.biziday.ro/".to_string(),
            max_articles: 150,
            biziday_max_pages: 8,
            request_timeout_secs: 10,
        }
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            llm_config: None,
            template: "news_analysis".to_string(),
            max_retries: 5,
        }
    }
}

impl Default for GmailSettings {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from("credentials.json"),
            token_file: PathBuf::from("token.json"),
            default_subject: "Știri de astăzi - Analiză AI".to_string(),
            from_email: None,
            from_name: None,
        }
    }
}

impl Settings {
    /// Parse settings from YAML text. An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load settings from `path`, or the defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        match path {
            Some(path) => {
                let yaml = tokio::fs::read_to_string(path).await?;
                let settings = Self::from_yaml(&yaml)?;
                info!(path = %path.display(), "Loaded settings file");
                Ok(settings)
            }
            None => {
                debug!("No settings file; using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Layer command-line values over the loaded settings.
    ///
    /// Recipients from the command line (or `EMAIL_RECIPIENTS`) replace the
    /// file's list. Blank entries and duplicates are dropped either way.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(ref path) = cli.llm_config {
            self.ai.llm_config = Some(path.clone());
        }
        if let Some(ref template) = cli.template {
            self.ai.template = template.clone();
        }
        if let Some(ref path) = cli.credentials_file {
            self.gmail.credentials_file = path.clone();
        }
        if let Some(ref path) = cli.token_file {
            self.gmail.token_file = path.clone();
        }
        if let Some(ref from_email) = cli.from_email {
            self.gmail.from_email = Some(from_email.clone());
        }
        if let Some(ref from_name) = cli.from_name {
            self.gmail.from_name = Some(from_name.clone());
        }
        if let Some(ref subject) = cli.subject {
            self.gmail.default_subject = subject.clone();
        }

        let recipients = if cli.recipients.iter().any(|r| !r.trim().is_empty()) {
            &cli.recipients
        } else {
            &self.email_recipients
        };
        self.email_recipients = clean_recipients(recipients);
        self
    }
}

/// Trim recipients, drop blanks and duplicates, keep first-seen order.
pub fn clean_recipients(recipients: &[String]) -> Vec<String> {
    recipients
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .unique()
        .map(str::to_string)
        .collect()
}
