//! Export of the enriched table.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{info, instrument};

use leadscout_shared::{LeadScoutError, Result};

use crate::pipeline::EnrichmentSummary;
use crate::table::CompanyTable;

/// Output file name when none is given.
pub const DEFAULT_OUTPUT: &str = "enriched_companies.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    /// `{ "summary": {...}, "rows": [...] }`
    Json,
}

impl ExportFormat {
    /// Guess from the file extension; anything unrecognized is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = LeadScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(LeadScoutError::validation(format!(
                "unknown export format '{other}' (expected csv or json)"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Default output path next to `input`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input
        .parent()
        .map(|dir| dir.join(DEFAULT_OUTPUT))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

/// Write `table` to `path`, creating parent directories as needed.
#[instrument(skip_all, fields(path = %path.display(), %format))]
pub fn export(
    table: &CompanyTable,
    summary: Option<&EnrichmentSummary>,
    path: &Path,
    format: ExportFormat,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| LeadScoutError::io(parent, e))?;
    }

    let file = std::fs::File::create(path).map_err(|e| LeadScoutError::io(path, e))?;

    match format {
        ExportFormat::Csv => table.write_csv(file)?,
        ExportFormat::Json => {
            let report = serde_json::json!({
                "summary": summary,
                "rows": table.to_records(),
            });
            serde_json::to_writer_pretty(file, &report)
                .map_err(|e| LeadScoutError::parse(format!("failed to serialize report: {e}")))?;
        }
    }

    info!(%format, rows = table.len(), "export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{EnrichOptions, SilentProgress, enrich_table};
    use async_trait::async_trait;
    use leadscout_shared::CompanyDetails;

    struct NoLookup;

    #[async_trait]
    impl crate::pipeline::DetailLookup for NoLookup {
        async fn lookup(&self, company: &str) -> CompanyDetails {
            CompanyDetails::unknown(company)
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("leadscout-sink-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample() -> CompanyTable {
        let mut table =
            CompanyTable::from_reader("company_name\nAcme\n".as_bytes(), "company_name").unwrap();
        table.ensure_columns();
        table
    }

    #[test]
    fn format_detection() {
        assert_eq!(ExportFormat::from_path(Path::new("out.JSON")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("out")), ExportFormat::Csv);
        assert_eq!("Json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn default_output_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("data/in.csv")),
            PathBuf::from("data/enriched_companies.csv")
        );
        assert_eq!(
            default_output_path(Path::new("in.csv")),
            PathBuf::from("enriched_companies.csv")
        );
    }

    #[test]
    fn csv_export() {
        let dir = temp_dir();
        let path = dir.join("nested").join("out.csv");
        export(&sample(), None, &path, ExportFormat::Csv).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("company_name,Website,Industry,Company Size,HQ Location,Summary,Target Customer,AI Automation Idea")
        );
        assert_eq!(lines.next(), Some("Acme,N/A,N/A,N/A,N/A,N/A,N/A,N/A"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn json_export_includes_summary() {
        let mut table = sample();
        let summary = enrich_table(
            &mut table,
            &NoLookup,
            None,
            &EnrichOptions::default(),
            &SilentProgress,
        )
        .await
        .unwrap();

        let dir = temp_dir();
        let path = dir.join("out.json");
        export(&table, Some(&summary), &path, ExportFormat::Json).unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(report["summary"]["rows"], 1);
        assert_eq!(report["summary"]["resolved"], 1);
        assert_eq!(report["rows"][0]["company_name"], "Acme");
        assert_eq!(report["rows"][0]["Website"], "N/A");

        std::fs::remove_dir_all(&dir).ok();
    }
}
