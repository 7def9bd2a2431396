//! MIME message construction.
//!
//! Builds an RFC 5322 message with a `multipart/alternative` body: the plain
//! text part first, the HTML part last (clients pick the last part they can
//! render). Both parts are UTF-8 with base64 transfer encoding; non-ASCII
//! header values use RFC 2047 encoded words.

use crate::models::EmailBody;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::{Rng, rng};

/// Base64 body lines are wrapped at this width.
const LINE_WIDTH: usize = 76;
/// Raw bytes per encoded word; keeps each word under 75 characters.
const ENCODED_WORD_BYTES: usize = 45;

/// Everything needed to render one outgoing message.
#[derive(Debug)]
pub struct OutgoingMessage<'a> {
    pub to: &'a str,
    /// Already formatted, see [`format_address`].
    pub from: &'a str,
    pub subject: &'a str,
    pub body: &'a EmailBody,
}

impl OutgoingMessage<'_> {
    /// Render with a random boundary.
    pub fn render(&self) -> String {
        let boundary = format!("==============={:019}==", rng().random::<u64>());
        self.render_with_boundary(&boundary)
    }

    /// Render with the given part boundary.
    pub fn render_with_boundary(&self, boundary: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("To: {}\r\n", self.to));
        out.push_str(&format!("From: {}\r\n", self.from));
        out.push_str(&format!("Subject: {}\r\n", encode_header(self.subject)));
        out.push_str("MIME-Version: 1.0\r\n");
        out.push_str(&format!(
            "Content-Type: multipart/alternative; boundary=\"{}\"\r\n\r\n",
            boundary
        ));

        for (subtype, content) in [("plain", &self.body.text), ("html", &self.body.html)] {
            out.push_str(&format!("--{}\r\n", boundary));
            out.push_str(&format!("Content-Type: text/{}; charset=\"utf-8\"\r\n", subtype));
            out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
            out.push_str(&encode_body(content));
            out.push_str("\r\n");
        }
        out.push_str(&format!("--{}--\r\n", boundary));
        out
    }
}

/// Encode a header value as RFC 2047 words when it is not plain ASCII.
pub fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for c in value.chars() {
        if chunk.len() + c.len_utf8() > ENCODED_WORD_BYTES {
            words.push(encoded_word(&chunk));
            chunk.clear();
        }
        chunk.push(c);
    }
    if !chunk.is_empty() {
        words.push(encoded_word(&chunk));
    }
    words.join("\r\n ")
}

/// Format a mailbox, optionally with a display name.
///
/// `format_address(Some("Știri AI"), "me@example.com")` gives
/// `=?utf-8?b?yJh0aXJpIEFJ?= <me@example.com>`.
pub fn format_address(name: Option<&str>, email: &str) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        None => email.to_string(),
        Some(name) if name.is_ascii() => {
            let quoted = name.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{}\" <{}>", quoted, email)
        }
        Some(name) => format!("{} <{}>", encode_header(name), email),
    }
}

fn encoded_word(chunk: &str) -> String {
    format!("=?utf-8?b?{}?=", STANDARD.encode(chunk.as_bytes()))
}

fn encode_body(content: &str) -> String {
    let encoded = STANDARD.encode(content.as_bytes());
    encoded
        .as_bytes()
        .chunks(LINE_WIDTH)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join("\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_part(message: &str, content_type: &str) -> String {
        let header = format!("Content-Type: {}; charset=\"utf-8\"\r\nContent-Transfer-Encoding: base64\r\n\r\n", content_type);
        let start = message.find(&header).unwrap() + header.len();
        let rest = &message[start..];
        let end = rest.find("\r\n--").unwrap();
        let encoded: String = rest[..end].split("\r\n").collect();
        String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap()
    }

    fn body() -> EmailBody {
        EmailBody {
            html: "<h1>Analiză</h1><p>Știri de astăzi</p>".to_string(),
            text: "Analiză\nȘtiri de astăzi".to_string(),
        }
    }

    #[test]
    fn test_render_structure() {
        let body = body();
        let message = OutgoingMessage {
            to: "cititor@example.com",
            from: "\"Stiri AI\" <me@example.com>",
            subject: "Test",
            body: &body,
        }
        .render_with_boundary("BOUNDARY");

        assert!(message.starts_with("To: cititor@example.com\r\nFrom: \"Stiri AI\" <me@example.com>\r\nSubject: Test\r\n"));
        assert!(message.contains("MIME-Version: 1.0\r\n"));
        assert!(message.contains("Content-Type: multipart/alternative; boundary=\"BOUNDARY\"\r\n\r\n--BOUNDARY\r\n"));
        assert!(message.ends_with("--BOUNDARY--\r\n"));

        let plain_at = message.find("text/plain").unwrap();
        let html_at = message.find("text/html").unwrap();
        assert!(plain_at < html_at);

        assert_eq!(decode_part(&message, "text/plain"), body.text);
        assert_eq!(decode_part(&message, "text/html"), body.html);
    }

    #[test]
    fn test_body_lines_are_wrapped() {
        let long = EmailBody {
            html: "ă".repeat(500),
            text: "x".to_string(),
        };
        let message = OutgoingMessage {
            to: "a@example.com",
            from: "me@example.com",
            subject: "s",
            body: &long,
        }
        .render_with_boundary("B");
        assert!(message.split("\r\n").all(|line| line.len() <= LINE_WIDTH));
        assert_eq!(decode_part(&message, "text/html"), long.html);
    }

    #[test]
    fn test_random_boundaries_differ() {
        let body = body();
        let message = OutgoingMessage {
            to: "a@example.com",
            from: "me@example.com",
            subject: "s",
            body: &body,
        };
        assert_ne!(message.render(), message.render());
    }

    #[test]
    fn test_ascii_header_unchanged() {
        assert_eq!(encode_header("Daily news"), "Daily news");
    }

    #[test]
    fn test_non_ascii_header_encoded() {
        let encoded = encode_header("Știri de astăzi - Analiză AI");
        assert!(encoded.starts_with("=?utf-8?b?"));
        assert!(encoded.is_ascii());

        let decoded: String = encoded
            .split("\r\n ")
            .map(|word| {
                let payload = word.trim_start_matches("=?utf-8?b?").trim_end_matches("?=");
                String::from_utf8(STANDARD.decode(payload).unwrap()).unwrap()
            })
            .collect();
        assert_eq!(decoded, "Știri de astăzi - Analiză AI");
    }

    #[test]
    fn test_long_header_split_into_words() {
        let encoded = encode_header(&"ș".repeat(60));
        let words: Vec<&str> = encoded.split("\r\n ").collect();
        assert!(words.len() > 1);
        assert!(words.iter().all(|w| w.len() <= 75));
    }

    #[test]
    fn test_format_address() {
        assert_eq!(format_address(None, "me@example.com"), "me@example.com");
        assert_eq!(format_address(Some("  "), "me@example.com"), "me@example.com");
        assert_eq!(
            format_address(Some("AI \"News\""), "me@example.com"),
            "\"AI \\\"News\\\"\" <me@example.com>"
        );
        assert_eq!(
            format_address(Some("Știri AI"), "me@example.com"),
            "=?utf-8?b?yJh0aXJpIEFJ?= <me@example.com>"
        );
    }
}
