//! Gmail REST sender.
//!
//! Authorizes once through [`oauth`], fixes the `From` header, then posts
//! each rendered message to `users/me/messages/send`.

use super::mime::{OutgoingMessage, format_address};
use super::{MailError, MailTransport, oauth};
use crate::models::EmailBody;
use crate::settings::GmailSettings;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, instrument};

const API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

/// Authenticated Gmail client sending as one fixed sender.
#[derive(Debug)]
pub struct GmailSender {
    http: Client,
    access_token: String,
    /// Ready-to-use `From` header value.
    from: String,
}

impl GmailSender {
    /// Authorize and resolve the sender address.
    ///
    /// The address comes from `from_email` when configured, otherwise from
    /// the authorized account's profile.
    #[instrument(level = "info", skip_all)]
    pub async fn connect(gmail: &GmailSettings) -> Result<Self, MailError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let token = oauth::authorize(&http, gmail).await?;

        let mut sender = Self {
            http,
            access_token: token.token,
            from: String::new(),
        };

        let email = match gmail.from_email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => email.to_string(),
            None => sender.profile_address().await?,
        };
        sender.from = format_address(gmail.from_name.as_deref(), &email);
        info!(from = %sender.from, "Gmail sender ready");
        Ok(sender)
    }

    async fn profile_address(&self) -> Result<String, MailError> {
        let resp = self
            .http
            .get(format!("{}/profile", API_BASE))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let profile: Profile = checked(resp).await?.json().await?;
        debug!(email = %profile.email_address, "Resolved sender from profile");
        Ok(profile.email_address)
    }
}

impl MailTransport for GmailSender {
    #[instrument(level = "info", skip(self, body))]
    async fn send(&self, to: &str, subject: &str, body: &EmailBody) -> Result<String, MailError> {
        let message = OutgoingMessage {
            to,
            from: &self.from,
            subject,
            body,
        }
        .render();

        let resp = self
            .http
            .post(format!("{}/messages/send", API_BASE))
            .bearer_auth(&self.access_token)
            .json(&json!({ "raw": encode_raw(&message) }))
            .send()
            .await?;
        let sent: SentMessage = checked(resp).await?.json().await?;
        Ok(sent.id)
    }
}

/// Gmail wants the full RFC 5322 message as padded base64url.
fn encode_raw(message: &str) -> String {
    URL_SAFE.encode(message.as_bytes())
}

async fn checked(resp: Response) -> Result<Response, MailError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(MailError::Api {
        status: status.as_u16(),
        body,
    })
}
