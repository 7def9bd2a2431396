//! Email delivery through the Gmail REST API.
//!
//! - [`oauth`]: OAuth2 client secrets, token cache, refresh and first-time
//!   consent flow
//! - [`mime`]: builds the `multipart/alternative` message
//! - [`gmail`]: authenticated sender, one message per recipient
//!
//! Delivery is sequential. A failure for one recipient is logged and the
//! remaining recipients are still attempted.

pub mod gmail;
pub mod mime;
pub mod oauth;

use crate::models::EmailBody;
use crate::settings::GmailSettings;
use thiserror::Error;
use tracing::{error, info, instrument};

/// Errors raised while authenticating with or sending through Gmail.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OAuth client credentials not found at {0}")]
    MissingCredentials(String),

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Gmail API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Anything able to deliver one message to one recipient.
pub trait MailTransport {
    /// Send `body` to `to`; returns the provider's message id.
    async fn send(&self, to: &str, subject: &str, body: &EmailBody) -> Result<String, MailError>;
}

/// Outcome of a delivery round.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: Vec<String>,
    pub failed: Vec<String>,
}

/// Whether Gmail can be used at all: a cached token or client credentials
/// must exist on disk.
pub fn credentials_available(gmail: &GmailSettings) -> bool {
    gmail.token_file.exists() || gmail.credentials_file.exists()
}

/// Send the same message to every recipient, one after the other.
#[instrument(level = "info", skip_all, fields(recipients = recipients.len()))]
pub async fn deliver<T: MailTransport>(
    transport: &T,
    recipients: &[String],
    subject: &str,
    body: &EmailBody,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for recipient in recipients {
        match transport.send(recipient, subject, body).await {
            Ok(id) => {
                info!(%recipient, message_id = %id, "Email sent");
                report.sent.push(recipient.clone());
            }
            Err(e) => {
                error!(%recipient, error = %e, "Failed to send email");
                report.failed.push(recipient.clone());
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Recording {
        sent: RefCell<Vec<String>>,
    }

    impl MailTransport for Recording {
        async fn send(&self, to: &str, _subject: &str, _body: &EmailBody) -> Result<String, MailError> {
            if to.ends_with("@invalid") {
                return Err(MailError::Api {
                    status: 400,
                    body: "Invalid To header".to_string(),
                });
            }
            self.sent.borrow_mut().push(to.to_string());
            Ok(format!("id-{}", self.sent.borrow().len()))
        }
    }

    fn body() -> EmailBody {
        EmailBody {
            html: "<p>x</p>".to_string(),
            text: "x".to_string(),
        }
    }

    #[tokio::test]
    async fn test_failed_recipient_does_not_stop_delivery() {
        let transport = Recording::default();
        let recipients = vec![
            "a@example.com".to_string(),
            "b@invalid".to_string(),
            "c@example.com".to_string(),
        ];
        let report = deliver(&transport, &recipients, "Subiect", &body()).await;
        assert_eq!(report.sent, vec!["a@example.com", "c@example.com"]);
        assert_eq!(report.failed, vec!["b@invalid"]);
        assert_eq!(transport.sent.borrow().len(), 2);
    }

    #[test]
    fn test_credentials_available() {
        let missing = GmailSettings {
            credentials_file: PathBuf::from("/nonexistent/credentials.json"),
            token_file: PathBuf::from("/nonexistent/token.json"),
            ..GmailSettings::default()
        };
        assert!(!credentials_available(&missing));

        let present = GmailSettings {
            credentials_file: PathBuf::from("Cargo.toml"),
            ..missing
        };
        assert!(credentials_available(&present));
    }

    #[test]
    fn test_error_display() {
        let err = MailError::Api {
            status: 403,
            body: "insufficient scopes".to_string(),
        };
        assert_eq!(err.to_string(), "Gmail API returned 403: insufficient scopes");
    }
}
