//! Core domain types for company enrichment.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel stored for any value that could not be determined.
pub const NOT_AVAILABLE: &str = "N/A";

/// Returns `true` when a table cell holds no usable value.
///
/// Empty cells, `N/A` and the `nan`/`NaN` that spreadsheet exports leave
/// behind all count as missing.
pub fn is_missing(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case(NOT_AVAILABLE) || v.eq_ignore_ascii_case("nan")
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one enrichment run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// DetailField
// ---------------------------------------------------------------------------

/// One of the four metadata fields the resolver fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailField {
    Website,
    Industry,
    CompanySize,
    HqLocation,
}

impl DetailField {
    /// All fields, in column order.
    pub const ALL: [DetailField; 4] = [
        DetailField::Website,
        DetailField::Industry,
        DetailField::CompanySize,
        DetailField::HqLocation,
    ];

    /// Column header used in the input/output table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Website => "Website",
            Self::Industry => "Industry",
            Self::CompanySize => "Company Size",
            Self::HqLocation => "HQ Location",
        }
    }
}

impl std::fmt::Display for DetailField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// DetailSource
// ---------------------------------------------------------------------------

/// Which stage of the fallback chain produced the website.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailSource {
    /// Already present in the input row.
    Provided,
    /// Parsed from the encyclopedia page infobox.
    Infobox,
    /// Pattern-matched from the page's plain text.
    RawText,
    /// Found through the search-engine fallback.
    Search,
    /// Not found anywhere.
    #[default]
    None,
}

// ---------------------------------------------------------------------------
// CompanyDetails
// ---------------------------------------------------------------------------

/// Public metadata for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetails {
    pub company_name: String,
    #[serde(default = "not_available")]
    pub website: String,
    #[serde(default = "not_available")]
    pub industry: String,
    #[serde(default = "not_available")]
    pub company_size: String,
    #[serde(default = "not_available")]
    pub hq_location: String,
    /// Where the website came from.
    #[serde(default)]
    pub website_source: DetailSource,
}

impl CompanyDetails {
    /// Details with every field set to [`NOT_AVAILABLE`].
    pub fn unknown(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            website: not_available(),
            industry: not_available(),
            company_size: not_available(),
            hq_location: not_available(),
            website_source: DetailSource::None,
        }
    }

    pub fn get(&self, field: DetailField) -> &str {
        match field {
            DetailField::Website => &self.website,
            DetailField::Industry => &self.industry,
            DetailField::CompanySize => &self.company_size,
            DetailField::HqLocation => &self.hq_location,
        }
    }

    pub fn set(&mut self, field: DetailField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DetailField::Website => self.website = value,
            DetailField::Industry => self.industry = value,
            DetailField::CompanySize => self.company_size = value,
            DetailField::HqLocation => self.hq_location = value,
        }
    }

    /// Returns `true` if `field` still holds no usable value.
    pub fn is_missing(&self, field: DetailField) -> bool {
        is_missing(self.get(field))
    }

    /// Fields that are still unknown, in column order.
    pub fn missing_fields(&self) -> Vec<DetailField> {
        DetailField::ALL
            .into_iter()
            .filter(|f| self.is_missing(*f))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn has_website(&self) -> bool {
        !self.is_missing(DetailField::Website)
    }
}

// ---------------------------------------------------------------------------
// CompanyAnalysis
// ---------------------------------------------------------------------------

/// The model's three-part reading of a company website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyAnalysis {
    #[serde(default = "not_available")]
    pub summary: String,
    #[serde(default = "not_available")]
    pub target_customer: String,
    #[serde(default = "not_available")]
    pub ai_automation_idea: String,
}

impl CompanyAnalysis {
    /// Column headers for the three analysis fields, in output order.
    pub const COLUMNS: [&'static str; 3] = ["Summary", "Target Customer", "AI Automation Idea"];

    /// Analysis with every field set to [`NOT_AVAILABLE`].
    pub fn unavailable() -> Self {
        Self {
            summary: not_available(),
            target_customer: not_available(),
            ai_automation_idea: not_available(),
        }
    }

    pub fn is_available(&self) -> bool {
        !(is_missing(&self.summary)
            && is_missing(&self.target_customer)
            && is_missing(&self.ai_automation_idea))
    }

    /// Values in the same order as [`Self::COLUMNS`].
    pub fn values(&self) -> [&str; 3] {
        [
            self.summary.as_str(),
            self.target_customer.as_str(),
            self.ai_automation_idea.as_str(),
        ]
    }
}

impl Default for CompanyAnalysis {
    fn default() -> Self {
        Self::unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values() {
        assert!(is_missing(""));
        assert!(is_missing("   "));
        assert!(is_missing("N/A"));
        assert!(is_missing("n/a"));
        assert!(is_missing("NaN"));
        assert!(!is_missing("Software"));
    }

    #[test]
    fn unknown_details_are_all_missing() {
        let details = CompanyDetails::unknown("Acme");
        assert_eq!(details.missing_fields(), DetailField::ALL.to_vec());
        assert!(!details.has_website());
        assert_eq!(details.website_source, DetailSource::None);
    }

    #[test]
    fn set_and_get_by_field() {
        let mut details = CompanyDetails::unknown("Acme");
        details.set(DetailField::Industry, "Anvils");
        details.set(DetailField::Website, "https://acme.example");
        assert_eq!(details.get(DetailField::Industry), "Anvils");
        assert_eq!(
            details.missing_fields(),
            vec![DetailField::CompanySize, DetailField::HqLocation]
        );
        assert!(details.has_website());
    }

    #[test]
    fn field_columns() {
        assert_eq!(DetailField::CompanySize.column(), "Company Size");
        assert_eq!(DetailField::HqLocation.to_string(), "HQ Location");
    }

    #[test]
    fn analysis_deserializes_with_defaults() {
        let json = r#"{"summary":"Makes anvils."}"#;
        let analysis: CompanyAnalysis = serde_json::from_str(json).expect("deserialize");
        assert_eq!(analysis.summary, "Makes anvils.");
        assert_eq!(analysis.target_customer, NOT_AVAILABLE);
        assert!(analysis.is_available());
        assert!(!CompanyAnalysis::unavailable().is_available());
    }

    #[test]
    fn details_serialize_source() {
        let mut details = CompanyDetails::unknown("Acme");
        details.website_source = DetailSource::RawText;
        let json = serde_json::to_string(&details).expect("serialize");
        assert!(json.contains(r#""website_source":"raw_text""#));
    }
}
