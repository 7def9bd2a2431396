//! OAuth2 for the Gmail API.
//!
//! The token cache uses the same JSON layout as Google's Python client
//! (`token`, `refresh_token`, `token_uri`, `client_id`, `client_secret`,
//! `scopes`, `expiry`), so an existing `token.json` keeps working.
//!
//! Order of preference:
//! 1. a cached token that has not expired
//! 2. a refreshed token when the cached one carries a refresh token
//! 3. the installed-app consent flow: a one-shot HTTP listener on
//!    `127.0.0.1` receives the authorization code from the browser redirect

use super::MailError;
use crate::settings::GmailSettings;
use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/gmail.readonly",
];

/// Tokens this close to expiry are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

const CALLBACK_PAGE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nConnection: close\r\n\r\n\
<html><body><p>Autorizare completă. Puteți închide această fereastră.</p></body></html>";

/// `credentials.json` as downloaded from the Google Cloud console.
#[derive(Debug, Deserialize)]
pub struct ClientSecretsFile {
    pub installed: Option<ClientSecrets>,
    pub web: Option<ClientSecrets>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Cached credentials, persisted to `token.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// UTC timestamp; absent means the token never expires locally.
    #[serde(default)]
    pub expiry: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

impl StoredToken {
    /// Whether the access token is expired (or about to be) at `now`.
    ///
    /// Accepts RFC 3339 timestamps and the offset-less form Python writes.
    /// An unparseable expiry counts as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let Some(expiry) = self.expiry.as_deref() else {
            return false;
        };
        match parse_expiry(expiry) {
            Some(at) => at - Duration::seconds(EXPIRY_SKEW_SECS) <= now,
            None => true,
        }
    }

    fn secrets(&self) -> ClientSecrets {
        ClientSecrets {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            auth_uri: default_auth_uri(),
            token_uri: self.token_uri.clone(),
        }
    }

    fn from_response(resp: TokenResponse, secrets: &ClientSecrets, previous_refresh: Option<String>, now: DateTime<Utc>) -> Self {
        let scopes = match resp.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => SCOPES.iter().map(|s| s.to_string()).collect(),
        };
        Self {
            token: resp.access_token,
            refresh_token: resp.refresh_token.or(previous_refresh),
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes,
            expiry: resp
                .expires_in
                .map(|secs| (now + Duration::seconds(secs)).to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

fn parse_expiry(expiry: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(expiry) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(expiry, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Produce a usable access token, refreshing or asking for consent as needed.
///
/// The resulting token is written back to the token file; a failed write is
/// only a warning.
#[instrument(level = "info", skip_all, fields(token_file = %gmail.token_file.display()))]
pub async fn authorize(http: &Client, gmail: &GmailSettings) -> Result<StoredToken, MailError> {
    let cached = match load_token(&gmail.token_file).await {
        Ok(token) => Some(token),
        Err(e) => {
            debug!(error = %e, "No usable cached token");
            None
        }
    };

    let token = match cached {
        Some(token) if !token.is_expired(Utc::now()) => {
            debug!("Using cached Gmail token");
            return Ok(token);
        }
        Some(token) if token.refresh_token.is_some() => match refresh(http, &token).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(error = %e, "Token refresh failed; starting consent flow");
                consent_flow(http, &gmail.credentials_file).await?
            }
        },
        _ => consent_flow(http, &gmail.credentials_file).await?,
    };

    if let Err(e) = save_token(&gmail.token_file, &token).await {
        warn!(error = %e, "Could not save Gmail token");
    }
    Ok(token)
}

pub async fn load_token(path: &Path) -> Result<StoredToken, MailError> {
    let json = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&json)?)
}

pub async fn save_token(path: &Path, token: &StoredToken) -> Result<(), MailError> {
    let json = serde_json::to_string_pretty(token)?;
    tokio::fs::write(path, json).await?;
    info!(path = %path.display(), "Saved Gmail token");
    Ok(())
}

pub async fn load_client_secrets(path: &Path) -> Result<ClientSecrets, MailError> {
    if !path.exists() {
        return Err(MailError::MissingCredentials(path.display().to_string()));
    }
    let json = tokio::fs::read_to_string(path).await?;
    let file: ClientSecretsFile = serde_json::from_str(&json)?;
    file.installed
        .or(file.web)
        .ok_or_else(|| MailError::OAuth("credentials file has no installed or web client".to_string()))
}

#[instrument(level = "info", skip_all)]
async fn refresh(http: &Client, token: &StoredToken) -> Result<StoredToken, MailError> {
    let refresh_token = token
        .refresh_token
        .clone()
        .ok_or_else(|| MailError::OAuth("no refresh token".to_string()))?;

    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token.as_str()),
        ("client_id", token.client_id.as_str()),
        ("client_secret", token.client_secret.as_str()),
    ];
    let resp = request_token(http, &token.token_uri, &params).await?;
    info!("Refreshed Gmail access token");
    Ok(StoredToken::from_response(resp, &token.secrets(), Some(refresh_token), Utc::now()))
}

async fn consent_flow(http: &Client, credentials_file: &Path) -> Result<StoredToken, MailError> {
    let secrets = load_client_secrets(credentials_file).await?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let redirect_uri = format!("http://localhost:{}/", port);

    info!(url = %consent_url(&secrets, &redirect_uri), "Open this URL in a browser to authorize Gmail access");
    let code = receive_code(&listener).await?;

    let params = [
        ("grant_type", "authorization_code"),
        ("code", code.as_str()),
        ("redirect_uri", redirect_uri.as_str()),
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.as_str()),
    ];
    let resp = request_token(http, &secrets.token_uri, &params).await?;
    info!("Gmail authorization granted");
    Ok(StoredToken::from_response(resp, &secrets, None, Utc::now()))
}

async fn request_token(http: &Client, token_uri: &str, params: &[(&str, &str)]) -> Result<TokenResponse, MailError> {
    let resp = http.post(token_uri).form(params).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(MailError::OAuth(format!("token endpoint returned {}: {}", status, body)));
    }
    Ok(resp.json().await?)
}

/// Browser URL asking the user to grant [`SCOPES`] to this client.
pub fn consent_url(secrets: &ClientSecrets, redirect_uri: &str) -> String {
    let scope = SCOPES.join(" ");
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&access_type=offline&prompt=consent",
        secrets.auth_uri,
        urlencoding::encode(&secrets.client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&scope),
    )
}

/// Serve redirects until one carries a `code` or an `error`.
async fn receive_code(listener: &TcpListener) -> Result<String, MailError> {
    loop {
        let (mut stream, peer) = listener.accept().await?;
        let mut buf = vec![0u8; 8192];
        let n = stream.read(&mut buf).await?;
        let request = String::from_utf8_lossy(&buf[..n]);
        let request_line = request.lines().next().unwrap_or_default();
        debug!(%peer, %request_line, "OAuth callback request");

        let outcome = callback_result(request_line);
        if outcome.is_some() {
            stream.write_all(CALLBACK_PAGE.as_bytes()).await?;
        } else {
            stream.write_all(b"HTTP/1.1 404 Not Found\r\nConnection: close\r\n\r\n").await?;
        }
        stream.shutdown().await.ok();

        if let Some(result) = outcome {
            return result;
        }
    }
}

/// Interpret the request line of the redirect, e.g.
/// `GET /?code=4/abc&scope=... HTTP/1.1`.
///
/// `None` for requests that are not the callback (such as `/favicon.ico`).
pub fn callback_result(request_line: &str) -> Option<Result<String, MailError>> {
    let target = request_line.split_whitespace().nth(1)?;
    let url = Url::parse(&format!("http://localhost{}", target)).ok()?;

    let mut code = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    match (code, error) {
        (_, Some(error)) => Some(Err(MailError::OAuth(format!("authorization denied: {}", error)))),
        (Some(code), None) => Some(Ok(code)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn secrets() -> ClientSecrets {
        ClientSecrets {
            client_id: "123.apps.googleusercontent.com".to_string(),
            client_secret: "s3cret".to_string(),
            auth_uri: default_auth_uri(),
            token_uri: default_token_uri(),
        }
    }

    fn token_expiring(expiry: Option<&str>) -> StoredToken {
        StoredToken {
            token: "ya29.a0".to_string(),
            refresh_token: Some("1//0g".to_string()),
            token_uri: default_token_uri(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec![],
            expiry: expiry.map(str::to_string),
        }
    }

    #[test]
    fn test_callback_with_code() {
        let result = callback_result("GET /?state=x&code=4%2F0Adeu5&scope=gmail.send HTTP/1.1").unwrap();
        assert_eq!(result.unwrap(), "4/0Adeu5");
    }

    #[test]
    fn test_callback_with_error() {
        let result = callback_result("GET /?error=access_denied HTTP/1.1").unwrap();
        assert!(result.unwrap_err().to_string().contains("access_denied"));
    }

    #[test]
    fn test_unrelated_request_ignored() {
        assert!(callback_result("GET /favicon.ico HTTP/1.1").is_none());
        assert!(callback_result("").is_none());
    }

    #[test]
    fn test_consent_url() {
        let url = consent_url(&secrets(), "http://localhost:8080/");
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?response_type=code"));
        assert!(url.contains("client_id=123.apps.googleusercontent.com"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2F"));
        assert!(url.contains("gmail.send%20https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fgmail.readonly"));
        assert!(url.contains("access_type=offline"));
    }

    #[test]
    fn test_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        assert!(!token_expiring(None).is_expired(now));
        assert!(!token_expiring(Some("2025-03-01T13:00:00Z")).is_expired(now));
        assert!(token_expiring(Some("2025-03-01T11:00:00Z")).is_expired(now));
        // within the skew window
        assert!(token_expiring(Some("2025-03-01T12:00:30Z")).is_expired(now));
        // offset-less form
        assert!(!token_expiring(Some("2025-03-01T13:00:00.123456")).is_expired(now));
        assert!(token_expiring(Some("not a date")).is_expired(now));
    }

    #[test]
    fn test_reads_python_token_file() {
        let json = r#"{
            "token": "ya29.a0AfB",
            "refresh_token": "1//0gXyz",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "123.apps.googleusercontent.com",
            "client_secret": "s3cret",
            "scopes": ["https://www.googleapis.com/auth/gmail.send"],
            "universe_domain": "googleapis.com",
            "account": "",
            "expiry": "2025-03-01T13:00:00.123456Z"
        }"#;
        let token: StoredToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.token, "ya29.a0AfB");
        assert_eq!(token.refresh_token.as_deref(), Some("1//0gXyz"));
        assert_eq!(token.scopes.len(), 1);

        let round: StoredToken = serde_json::from_str(&serde_json::to_string(&token).unwrap()).unwrap();
        assert_eq!(round, token);
    }

    #[test]
    fn test_response_keeps_previous_refresh_token() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let resp = TokenResponse {
            access_token: "new".to_string(),
            expires_in: Some(3599),
            refresh_token: None,
            scope: None,
        };
        let token = StoredToken::from_response(resp, &secrets(), Some("1//old".to_string()), now);
        assert_eq!(token.token, "new");
        assert_eq!(token.refresh_token.as_deref(), Some("1//old"));
        assert_eq!(token.expiry.as_deref(), Some("2025-03-01T12:59:59Z"));
        assert_eq!(token.scopes.len(), SCOPES.len());
    }

    #[test]
    fn test_client_secrets_file_installed() {
        let json = r#"{"installed":{"client_id":"abc","client_secret":"def","redirect_uris":["http://localhost"]}}"#;
        let file: ClientSecretsFile = serde_json::from_str(json).unwrap();
        let secrets = file.installed.unwrap();
        assert_eq!(secrets.client_id, "abc");
        assert_eq!(secrets.token_uri, "https://oauth2.googleapis.com/token");
        assert!(file.web.is_none());
    }

    #[tokio::test]
    async fn test_missing_client_secrets() {
        let err = load_client_secrets(Path::new("/nonexistent/credentials.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::MissingCredentials(_)));
    }

    #[tokio::test]
    async fn test_token_save_and_load() {
        let path = std::env::temp_dir().join(format!("stiri_digest_token_{}.json", std::process::id()));
        let token = token_expiring(Some("2025-03-01T13:00:00Z"));
        save_token(&path, &token).await.unwrap();
        let loaded = load_token(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.ok();
        assert_eq!(loaded, token);
    }
}
