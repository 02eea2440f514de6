//! Infobox parsing for rendered encyclopedia articles.
//!
//! Company articles carry a `table.infobox` whose rows pair a `<th>` label
//! with a `<td>` value. Labels are matched by substring, so
//! "Number of employees" and "Headquarters" variants are all recognized.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use leadscout_shared::DetailField;
use leadscout_text::{clean_text, element_text, fix_url};

/// Extract `(field, value)` pairs from the first infobox in `html`.
///
/// Pairs are returned in row order; when a label appears twice the caller
/// should let the later row win.
pub fn parse_infobox(html: &str, page_base: &str) -> Vec<(DetailField, String)> {
    let doc = Html::parse_document(html);
    let infobox_sel = Selector::parse("table.infobox").expect("valid selector");
    let row_sel = Selector::parse("tr").expect("valid selector");
    let th_sel = Selector::parse("th").expect("valid selector");
    let td_sel = Selector::parse("td").expect("valid selector");

    let Some(infobox) = doc.select(&infobox_sel).next() else {
        debug!("no infobox on page");
        return Vec::new();
    };

    let mut fields = Vec::new();
    for row in infobox.select(&row_sel) {
        let (Some(header), Some(data)) = (row.select(&th_sel).next(), row.select(&td_sel).next())
        else {
            continue;
        };

        let key = element_text(&header).trim().to_lowercase();
        let Some(field) = classify_label(&key) else {
            continue;
        };

        let value = match field {
            DetailField::Website => website_value(&data, page_base),
            _ => clean_text(&element_text(&data)),
        };

        if !value.is_empty() {
            fields.push((field, value));
        }
    }

    debug!(fields = fields.len(), "infobox parsed");
    fields
}

/// Map a lowercased infobox label to the field it describes.
fn classify_label(key: &str) -> Option<DetailField> {
    if key.contains("headquarter") {
        Some(DetailField::HqLocation)
    } else if key.contains("industry") {
        Some(DetailField::Industry)
    } else if key.contains("employees") {
        Some(DetailField::CompanySize)
    } else if key.contains("website") {
        Some(DetailField::Website)
    } else {
        None
    }
}

/// Prefer the cell's first link; fall back to its text.
fn website_value(data: &ElementRef, page_base: &str) -> String {
    let link_sel = Selector::parse("a[href]").expect("valid selector");
    match data.select(&link_sel).next().and_then(|a| a.value().attr("href")) {
        Some(href) => fix_url(href, page_base),
        None => clean_text(&element_text(data)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://en.wikipedia.org";

    fn load_fixture(name: &str) -> String {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/html")
            .join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("missing fixture: {}", path.display()))
    }

    fn value_of(fields: &[(DetailField, String)], field: DetailField) -> Option<&str> {
        fields
            .iter()
            .rev()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn parses_wiki_fixture() {
        let html = load_fixture("wiki_infobox.html");
        let fields = parse_infobox(&html, BASE);

        assert_eq!(value_of(&fields, DetailField::Industry), Some("Robotics Warehouse automation"));
        assert_eq!(value_of(&fields, DetailField::CompanySize), Some("1,200 (2023)"));
        assert_eq!(
            value_of(&fields, DetailField::HqLocation),
            Some("Pittsburgh, Pennsylvania, U.S.")
        );
        assert_eq!(
            value_of(&fields, DetailField::Website),
            Some("https://www.northwind-robotics.example")
        );
    }

    #[test]
    fn website_without_link_uses_text() {
        let html = r#"<table class="infobox vcard"><tr><th>Website</th><td>acme.example</td></tr></table>"#;
        let fields = parse_infobox(html, BASE);
        assert_eq!(fields, vec![(DetailField::Website, "acme.example".to_string())]);
    }

    #[test]
    fn protocol_relative_website_link() {
        let html = r#"<table class="infobox"><tr><th>Website</th><td><a href="//acme.example">acme.example</a></td></tr></table>"#;
        let fields = parse_infobox(html, BASE);
        assert_eq!(fields, vec![(DetailField::Website, "https://acme.example".to_string())]);
    }

    #[test]
    fn rows_without_header_or_data_are_skipped() {
        let html = r#"<table class="infobox">
            <tr><th colspan="2">Acme Corporation</th></tr>
            <tr><td colspan="2"><img src="logo.png"></td></tr>
            <tr><th>Founded</th><td>1949</td></tr>
            <tr><th>Industry</th><td>Anvils[1]</td></tr>
        </table>"#;
        let fields = parse_infobox(html, BASE);
        assert_eq!(fields, vec![(DetailField::Industry, "Anvils".to_string())]);
    }

    #[test]
    fn no_infobox() {
        let html = "<html><body><table class=\"wikitable\"><tr><th>Industry</th><td>X</td></tr></table></body></html>";
        assert!(parse_infobox(html, BASE).is_empty());
    }

    #[test]
    fn label_classification() {
        assert_eq!(classify_label("headquarters"), Some(DetailField::HqLocation));
        assert_eq!(classify_label("number of employees"), Some(DetailField::CompanySize));
        assert_eq!(classify_label("industry"), Some(DetailField::Industry));
        assert_eq!(classify_label("website"), Some(DetailField::Website));
        assert_eq!(classify_label("founded"), None);
    }
}
