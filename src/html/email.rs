//! Email body preparation.
//!
//! Mail clients render a second document shell nested inside their own
//! markup inconsistently, so everything attached to a message is reduced to
//! `<body>`-level content first. The plain-text alternative part is derived
//! from that fragment.

use crate::html::{format::plain_text_to_html, looks_like_html};
use crate::models::EmailBody;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, node::Node};
use tracing::{debug, instrument, warn};

static BODY_CONTENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body>").unwrap());
static DOCTYPE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<!DOCTYPE[^>]*>").unwrap());
static HTML_OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<html[^>]*>").unwrap());
static HTML_CLOSE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</html>").unwrap());
static HEAD_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<head(?:\s[^>]*)?>.*?</head>").unwrap());
static BODY_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?body(?:\s[^>]*)?>").unwrap());

/// Turn analysis output (HTML or plain text) into the two parts of an email.
///
/// Plain text is run through the formatter first; whatever comes out is
/// reduced to a body-level fragment.
#[instrument(level = "info", skip_all, fields(bytes = content.len()))]
pub fn prepare_email_body(content: &str) -> EmailBody {
    let document = if looks_like_html(content) {
        content.to_string()
    } else {
        debug!("Content is plain text; formatting as HTML");
        plain_text_to_html(content)
    };

    let html = extract_body_fragment(&document);
    let text = html_to_plain_text(&html);
    debug!(html_bytes = html.len(), text_bytes = text.len(), "Prepared email body");
    EmailBody { html, text }
}

/// Reduce a document to the content of its `<body>`.
///
/// Content without a `<body>` that does not start a document is returned
/// unchanged. When the extracted body still carries a document shell, the
/// whole input goes through [`strip_document_shell`] instead.
pub fn extract_body_fragment(content: &str) -> String {
    if let Some(inner) = BODY_CONTENT.captures(content).and_then(|caps| caps.get(1)) {
        let body = inner.as_str().trim();
        if !body.is_empty() && !has_document_shell(body) {
            return body.to_string();
        }
        warn!("Extracted body still contains a document shell; stripping tags");
        return strip_document_shell(content);
    }

    let start: String = content.trim_start().chars().take(9).collect::<String>().to_ascii_lowercase();
    if !start.starts_with("<!doctype") && !start.starts_with("<html") {
        return content.to_string();
    }
    strip_document_shell(content)
}

/// Remove every DOCTYPE, `<html>` tag, `<head>` block and `<body>` tag.
pub fn strip_document_shell(content: &str) -> String {
    let stripped = DOCTYPE_TAG.replace_all(content, "");
    let stripped = HEAD_BLOCK.replace_all(&stripped, "");
    let stripped = HTML_OPEN_TAG.replace_all(&stripped, "");
    let stripped = HTML_CLOSE_TAG.replace_all(&stripped, "");
    let stripped = BODY_TAGS.replace_all(&stripped, "");
    stripped.trim().to_string()
}

/// Render an HTML fragment as plain text, one trimmed text run per line.
///
/// Script and style contents are dropped.
pub fn html_to_plain_text(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let mut lines = Vec::new();

    for node in parsed.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let inside_raw_text = node.ancestors().any(|ancestor| {
            matches!(ancestor.value(), Node::Element(el) if matches!(el.name(), "script" | "style"))
        });
        if inside_raw_text {
            continue;
        }
        let run = text.trim();
        if !run.is_empty() {
            lines.push(run.to_string());
        }
    }

    lines.join("\n")
}

fn has_document_shell(content: &str) -> bool {
    DOCTYPE_TAG.is_match(content) || HTML_OPEN_TAG.is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_body_content() {
        let doc = "<!DOCTYPE html><html><head><title>t</title></head><BODY class=\"x\">\n<p>salut</p>\n</BODY></html>";
        assert_eq!(extract_body_fragment(doc), "<p>salut</p>");
    }

    #[test]
    fn test_fragment_without_body_is_unchanged() {
        let fragment = "<h1>Analiza</h1><p>Text</p>";
        assert_eq!(extract_body_fragment(fragment), fragment);
    }

    #[test]
    fn test_document_without_body_is_stripped() {
        let doc = "<!DOCTYPE html>\n<html lang=\"ro\"><head><style>p{}</style></head><p>x</p></html>";
        assert_eq!(extract_body_fragment(doc), "<p>x</p>");
    }

    #[test]
    fn test_nested_documents_lose_every_shell() {
        let doc = "<!DOCTYPE html><html><head><title>outer</title></head><body>\
                   <!DOCTYPE html><html><head><meta charset=\"UTF-8\"></head><body><p>inner</p></body></html>\
                   </body></html>";
        let fragment = extract_body_fragment(doc);
        let lower = fragment.to_ascii_lowercase();
        assert!(!lower.contains("<!doctype"));
        assert!(!lower.contains("<html"));
        assert!(!lower.contains("<head"));
        assert!(fragment.contains("<p>inner</p>"));
    }

    #[test]
    fn test_lowercase_doctype_inside_body_is_stripped() {
        let fragment = extract_body_fragment("<html><body><!doctype html><p>x</p></body></html>");
        assert_eq!(fragment, "<p>x</p>");
    }

    #[test]
    fn test_lowercase_doctype_without_body_is_stripped() {
        let fragment = extract_body_fragment("<!doctype html>\n<html><head><title>t</title></head><p>x</p></html>");
        assert_eq!(fragment, "<p>x</p>");
    }

    #[test]
    fn test_plain_text_gets_formatted_then_extracted() {
        let body = prepare_email_body("TITLU\n- unu\n- doi");
        assert!(!body.html.contains("<!DOCTYPE"));
        assert!(!body.html.contains("<head>"));
        assert!(body.html.starts_with(r#"<div class="container">"#));
        assert!(body.html.contains("<li"));
        assert!(body.text.starts_with("TITLU\nunu\ndoi\n"));
        assert!(body.text.contains("Email generat automat"));
    }

    #[test]
    fn test_html_analysis_keeps_markup() {
        let analysis = "<!DOCTYPE html><html><head></head><body><h1 style=\"color: #333;\">Analiza</h1><p>A &amp; B</p></body></html>";
        let body = prepare_email_body(analysis);
        assert_eq!(body.html, "<h1 style=\"color: #333;\">Analiza</h1><p>A &amp; B</p>");
        assert_eq!(body.text, "Analiza\nA & B");
    }

    #[test]
    fn test_plain_text_drops_script_and_style() {
        let text = html_to_plain_text("<style>p { color: red; }</style><p>vizibil</p><script>var x = 1;</script>");
        assert_eq!(text, "vizibil");
    }

    #[test]
    fn test_plain_text_has_no_blank_lines() {
        let text = html_to_plain_text("<p>a</p>\n\n\n<p>b</p>\n<br>\n<p>c</p>");
        assert_eq!(text, "a\nb\nc");
    }
}
