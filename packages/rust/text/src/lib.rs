//! Visible-text extraction and cleanup helpers.
//!
//! Turns raw HTML into the flat, whitespace-normalized text that the
//! resolver stores in table cells and the analyzer feeds to the model.

mod cleanup;

use scraper::{ElementRef, Html, Node};
use tracing::{debug, instrument};

use leadscout_shared::NOT_AVAILABLE;

/// Elements whose text is never visible to a reader.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

// ---------------------------------------------------------------------------
// Visible text
// ---------------------------------------------------------------------------

/// Extract the visible text of an HTML document.
///
/// Every non-empty text node outside `<script>`, `<style>`, `<noscript>`
/// and `<template>` is trimmed and the results are joined with a single space.
#[instrument(skip_all, fields(html_len = html.len()))]
pub fn visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);

    let mut pieces: Vec<&str> = Vec::new();
    for node in doc.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TAGS.contains(&el.name()))
        });
        if !hidden {
            pieces.push(trimmed);
        }
    }

    let text = pieces.join(" ");
    debug!(text_len = text.len(), nodes = pieces.len(), "visible text extracted");
    text
}

/// Concatenate the text of a single element.
///
/// Adjacent text nodes are glued together, with a space inserted only when
/// both sides are word characters (e.g. `Menlo Park<br>California`).
pub fn element_text(el: &ElementRef) -> String {
    let mut out = String::new();
    for piece in el.text() {
        let needs_space = matches!(
            (out.chars().last(), piece.chars().next()),
            (Some(prev), Some(next)) if prev.is_alphanumeric() && next.is_alphanumeric()
        );
        if needs_space {
            out.push(' ');
        }
        out.push_str(piece);
    }
    out
}

/// Keep the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

/// Remove bracketed citations and collapse whitespace.
pub fn clean_text(text: &str) -> String {
    cleanup::run_pipeline(text)
}

/// Make a scraped link absolute.
///
/// - empty → [`NOT_AVAILABLE`]
/// - `//host/path` → `https://host/path`
/// - `/path` → `{page_base}/path`
/// - anything not starting with `http` gets an `https://` prefix
pub fn fix_url(raw: &str, page_base: &str) -> String {
    let url = raw.trim();
    if url.is_empty() {
        return NOT_AVAILABLE.to_string();
    }

    let url = if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else if url.starts_with('/') {
        format!("{}{url}", page_base.trim_end_matches('/'))
    } else {
        url.to_string()
    };

    if url.starts_with("http") {
        url
    } else {
        format!("https://{url}")
    }
}
