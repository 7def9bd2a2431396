//! Response normalization for raw model output.
//!
//! Models are asked for raw HTML but routinely wrap it in markdown fences,
//! escape the tags, or add a sentence before and after. [`normalize_response`]
//! runs a fixed sequence of small steps, each operating on the output of the
//! previous one:
//!
//! 1. trim
//! 2. [`strip_code_fence`]
//! 3. [`unescape_entities`]
//! 4. [`cut_preamble`]
//! 5. [`cut_trailer`]
//! 6. trim
//! 7. [`remove_disclaimer`]
//!
//! Entity decoding has to happen before the boundary search, otherwise an
//! escaped `&lt;html&gt;` would never be found.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:html|HTML)?\s*\n?(.*?)```").unwrap());
static DOCTYPE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<!DOCTYPE[^>]*>").unwrap());
static HTML_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<html[^>]*>").unwrap());
static HTML_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</html>").unwrap());

/// Sequences whose presence means the model escaped its markup.
const ESCAPE_MARKERS: [&str; 3] = ["&lt;", "&gt;", "&amp;"];

/// Clean a raw model response into an HTML fragment.
///
/// `disclaimer` is the literal sentence whose enclosing paragraph gets
/// dropped; pass `None` to skip that step. Empty input yields an empty
/// string.
#[instrument(level = "debug", skip_all, fields(bytes = raw.len()))]
pub fn normalize_response(raw: &str, disclaimer: Option<&str>) -> String {
    let content = raw.trim();
    let content = strip_code_fence(content);
    let content = unescape_entities(&content);
    let content = cut_preamble(&content);
    let content = cut_trailer(content);
    let content = content.trim();

    let cleaned = match disclaimer {
        Some(sentence) => remove_disclaimer(content, sentence),
        None => content.to_string(),
    };
    debug!(bytes = cleaned.len(), "Normalized model response");
    cleaned
}

/// Replace the content with the interior of its first closed code fence.
///
/// The opening fence may carry an `html`/`HTML` language tag. A dangling
/// fence with no closing marker leaves the content untouched.
pub fn strip_code_fence(content: &str) -> String {
    if !content.contains("```") {
        return content.to_string();
    }
    match CODE_FENCE.captures(content).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim().to_string(),
        None => content.to_string(),
    }
}

/// Decode every HTML entity if the content shows signs of escaped markup.
///
/// Unknown or malformed entities are passed through as-is.
pub fn unescape_entities(content: &str) -> String {
    if ESCAPE_MARKERS.iter().any(|marker| content.contains(marker)) {
        html_escape::decode_html_entities(content).into_owned()
    } else {
        content.to_string()
    }
}

/// Drop everything before the first `<!DOCTYPE…>`, or failing that `<html…>`.
pub fn cut_preamble(content: &str) -> &str {
    let start = DOCTYPE_OPEN
        .find(content)
        .or_else(|| HTML_OPEN.find(content))
        .map(|m| m.start());
    match start {
        Some(pos) => &content[pos..],
        None => content,
    }
}

/// Drop everything after the first `</html>`.
pub fn cut_trailer(content: &str) -> &str {
    match HTML_CLOSE.find(content) {
        Some(m) => &content[..m.end()],
        None => content,
    }
}

/// Remove any `<p>` element whose text contains `sentence` verbatim.
///
/// Matching is literal and case-sensitive; paragraphs with nested tags are
/// left alone.
pub fn remove_disclaimer(content: &str, sentence: &str) -> String {
    if sentence.is_empty() || !content.contains(sentence) {
        return content.to_string();
    }
    let pattern = format!(r"<p[^>]*>[^<]*{}[^<]*</p>", regex::escape(sentence));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(content, "").into_owned(),
        Err(_) => content.to_string(),
    }
}
