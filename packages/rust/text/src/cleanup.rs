//! Cleanup passes for text scraped out of encyclopedia pages and websites.
//!
//! Each pass is a function `&str -> String` applied in sequence.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full cleanup pipeline on a scraped text fragment.
pub(crate) fn run_pipeline(text: &str) -> String {
    let mut result = text.to_string();

    result = strip_citations(&result);
    result = collapse_whitespace(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Strip bracketed citations
// ---------------------------------------------------------------------------

/// Remove bracketed references such as `[1]`, `[a]` or `[citation needed]`.
///
/// Non-greedy, so `a [1] b [2] c` keeps `b`.
fn strip_citations(text: &str) -> String {
    static CITATION_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));

    CITATION_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Collapse whitespace
// ---------------------------------------------------------------------------

/// Collapse every whitespace run (including newlines and NBSP) to one space.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_citations_removes_each_reference() {
        assert_eq!(strip_citations("Software[1] and services[2]"), "Software and services");
        assert_eq!(strip_citations("Tech [citation needed]"), "Tech ");
    }

    #[test]
    fn strip_citations_is_non_greedy() {
        assert_eq!(strip_citations("a [1] b [2] c"), "a  b  c");
    }

    #[test]
    fn collapse_whitespace_normalizes_runs() {
        assert_eq!(collapse_whitespace("  San  Francisco,\n\tCalifornia \u{a0}U.S. "), "San Francisco, California U.S.");
    }

    #[test]
    fn pipeline_cleans_infobox_value() {
        assert_eq!(
            run_pipeline("  3,500[2] (2023)\n"),
            "3,500 (2023)"
        );
    }
}
