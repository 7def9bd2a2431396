//! HTML reconciliation for model output and email bodies.
//!
//! The pipeline that turns whatever the language model returns into
//! something safe to put inside an email:
//!
//! - [`normalize`]: cleans a raw model response into an HTML fragment
//!   (code fences, escaped tags, preamble/trailer commentary, disclaimer)
//! - [`format`]: converts line-oriented plain text into a styled HTML document
//! - [`email`]: reduces a full document to its `<body>` content and derives
//!   the plain-text alternative
//!
//! Every function here is a pure string transform. None of them fail: on
//! input they cannot make sense of they return the best string they have.

pub mod email;
pub mod format;
pub mod normalize;

/// Whether content already looks like markup rather than plain text.
///
/// Used to decide if the plain-text formatter has to run first.
pub fn looks_like_html(content: &str) -> bool {
    content.starts_with("<!DOCTYPE")
        || content.starts_with("<html")
        || content.trim_start().starts_with('<')
}
