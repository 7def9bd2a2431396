//! Plain-text to HTML conversion.
//!
//! Used when the content headed for an email is not markup, typically the raw
//! news listing when the analysis step was unavailable. Lines are classified
//! one at a time with a single bit of carried state (whether a bulleted list
//! is open):
//!
//! | Line | Output |
//! |------|--------|
//! | blank | closes the list, `<br>` |
//! | `"  - item"` | indented `<li>` in the current list |
//! | `"- item"` / `"• item"` | `<li>`, opening a list if needed |
//! | ALL CAPS, or `"Label:"` longer than 3 chars | closes the list, `<h3>` |
//! | anything else | closes the list, `<p>` |

use chrono::{DateTime, Local};

const LIST_OPEN: &str = r#"<ul style="margin: 10px 0; padding-left: 20px;">"#;
const LIST_CLOSE: &str = "</ul>";
const LINE_BREAK: &str = "<br>";

const DOCUMENT_STYLE: &str = r#"        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
            line-height: 1.6;
            color: #333;
            background-color: #f9f9f9;
            padding: 20px;
        }
        .container {
            background-color: white;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
            padding: 30px;
            max-width: 800px;
            margin: 0 auto;
        }
        h1 {
            color: #1a3a52;
            border-bottom: 3px solid #2196F3;
            padding-bottom: 10px;
            margin: 0 0 20px 0;
        }
        h3 {
            color: #1a3a52;
            margin: 20px 0 10px 0;
            font-size: 16px;
            font-weight: 600;
        }
        p {
            margin: 10px 0;
            line-height: 1.7;
        }
        ul {
            margin: 15px 0;
            padding-left: 25px;
        }
        li {
            margin: 8px 0;
            line-height: 1.7;
        }
        .footer {
            margin-top: 30px;
            padding-top: 20px;
            border-top: 1px solid #eee;
            font-size: 12px;
            color: #666;
        }"#;

/// Convert plain text into a complete, styled HTML document.
///
/// The footer is stamped with the current local time.
pub fn plain_text_to_html(text: &str) -> String {
    let body = render_blocks(text).join("\n");
    wrap_document(&body, Local::now())
}

/// Classify each line of `text` and return the HTML blocks in order.
///
/// The whole input is escaped (`&`, `<`, `>`, `"`) before it is split, so
/// the blocks never contain markup that came from the text itself.
pub fn render_blocks(text: &str) -> Vec<String> {
    let escaped = html_escape::encode_double_quoted_attribute(text);
    let mut blocks = Vec::new();
    let mut in_list = false;

    for line in escaped.split('\n') {
        let stripped = line.trim();

        if stripped.is_empty() {
            close_list(&mut blocks, &mut in_list);
            blocks.push(LINE_BREAK.to_string());
            continue;
        }

        if let Some(item) = line.strip_prefix("  - ") {
            open_list(&mut blocks, &mut in_list);
            blocks.push(format!(
                r#"<li style="margin: 5px 0; line-height: 1.6; margin-left: 20px;">{}</li>"#,
                item.trim()
            ));
        } else if let Some(item) = stripped
            .strip_prefix("- ")
            .or_else(|| stripped.strip_prefix("• "))
        {
            open_list(&mut blocks, &mut in_list);
            blocks.push(format!(
                r#"<li style="margin: 5px 0; line-height: 1.6;">{}</li>"#,
                item.trim()
            ));
        } else if is_heading(stripped) {
            close_list(&mut blocks, &mut in_list);
            blocks.push(format!(
                r#"<h3 style="color: #1a3a52; margin: 15px 0 10px 0; font-size: 16px; font-weight: bold;">{}</h3>"#,
                stripped
            ));
        } else {
            close_list(&mut blocks, &mut in_list);
            blocks.push(format!(
                r#"<p style="margin: 8px 0; line-height: 1.6; color: #333;">{}</p>"#,
                stripped
            ));
        }
    }

    close_list(&mut blocks, &mut in_list);
    blocks
}

/// Insert rendered blocks into the standalone document template.
pub fn wrap_document(body: &str, generated_at: DateTime<Local>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
{style}
    </style>
</head>
<body>
    <div class="container">
        {body}
        <div class="footer">
            <p>Email generat automat - {stamp}</p>
        </div>
    </div>
</body>
</html>"#,
        style = DOCUMENT_STYLE,
        body = body,
        stamp = generated_at.format("%d.%m.%Y %H:%M"),
    )
}

fn open_list(blocks: &mut Vec<String>, in_list: &mut bool) {
    if !*in_list {
        blocks.push(LIST_OPEN.to_string());
        *in_list = true;
    }
}

fn close_list(blocks: &mut Vec<String>, in_list: &mut bool) {
    if *in_list {
        blocks.push(LIST_CLOSE.to_string());
        *in_list = false;
    }
}

/// Upper-case lines and `Label:` lines become headings.
fn is_heading(line: &str) -> bool {
    is_all_upper(line) || (line.ends_with(':') && line.chars().count() > 3)
}

/// True when the line has at least one cased letter and none of them is
/// lower-case.
fn is_all_upper(line: &str) -> bool {
    let mut has_cased = false;
    for c in line.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}
