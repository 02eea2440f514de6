//! Line-oriented keyword fallback over an article's plain text.
//!
//! Used for fields the infobox did not provide. Each field takes the first
//! line mentioning its keyword; matching is case-insensitive but the stored
//! value keeps the article's casing.

use std::sync::LazyLock;

use regex::Regex;

use leadscout_shared::{CompanyDetails, DetailField};
use leadscout_text::clean_text;

/// First `http(s)://` token on a line.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+").expect("url regex"));

/// Fill still-missing fields of `details` from `text`.
///
/// Returns the fields that were filled.
pub fn fill_from_text(text: &str, details: &mut CompanyDetails) -> Vec<DetailField> {
    let mut filled = Vec::new();

    for field in details.missing_fields() {
        if let Some(value) = scan_field(text, field) {
            details.set(field, value);
            filled.push(field);
        }
    }

    filled
}

/// Find the first line of `text` that yields a value for `field`.
fn scan_field(text: &str, field: DetailField) -> Option<String> {
    text.lines().find_map(|line| {
        let lower = line.to_lowercase();
        match field {
            DetailField::Website if lower.contains("website") => {
                URL_RE.find(line).map(|m| m.as_str().to_string())
            }
            DetailField::Industry if lower.contains("industry") => non_empty(clean_text(line)),
            DetailField::CompanySize if lower.contains("employee") => non_empty(clean_text(line)),
            DetailField::HqLocation if lower.contains("headquarter") => {
                non_empty(clean_text(line))
            }
            _ => None,
        }
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadscout_shared::NOT_AVAILABLE;

    const ARTICLE: &str = "Northwind Robotics is an American company.\n\
        \n\
        == History ==\n\
        The company is headquartered in Pittsburgh, Pennsylvania.[3]\n\
        It works in the logistics Industry.\n\
        As of 2023 it had about 1,200 employees.\n\
        The official website is https://northwind-robotics.example/en today.\n";

    #[test]
    fn fills_all_missing_fields() {
        let mut details = CompanyDetails::unknown("Northwind Robotics");
        let filled = fill_from_text(ARTICLE, &mut details);

        assert_eq!(filled.len(), 4);
        assert_eq!(details.website, "https://northwind-robotics.example/en");
        assert_eq!(details.industry, "It works in the logistics Industry.");
        assert_eq!(details.company_size, "As of 2023 it had about 1,200 employees.");
        assert_eq!(
            details.hq_location,
            "The company is headquartered in Pittsburgh, Pennsylvania."
        );
    }

    #[test]
    fn keeps_existing_values() {
        let mut details = CompanyDetails::unknown("Northwind Robotics");
        details.industry = "Robotics".into();

        let filled = fill_from_text(ARTICLE, &mut details);
        assert!(!filled.contains(&DetailField::Industry));
        assert_eq!(details.industry, "Robotics");
    }

    #[test]
    fn website_line_without_url_is_skipped() {
        let text = "See the company website for details.\nHomepage: https://acme.example";
        let mut details = CompanyDetails::unknown("Acme");
        fill_from_text(text, &mut details);
        assert_eq!(details.website, NOT_AVAILABLE);
    }

    #[test]
    fn first_matching_line_wins() {
        let text = "Over 50 employees in 2001.\nOver 900 employees in 2020.";
        assert_eq!(
            scan_field(text, DetailField::CompanySize).as_deref(),
            Some("Over 50 employees in 2001.")
        );
    }

    #[test]
    fn empty_text_fills_nothing() {
        let mut details = CompanyDetails::unknown("Acme");
        assert!(fill_from_text("", &mut details).is_empty());
        assert!(!details.has_website());
    }
}
