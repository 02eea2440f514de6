//! In-memory company table loaded from CSV.
//!
//! Every cell is kept as a string. Columns other than the company column
//! and the enrichment columns are carried through untouched.

use std::io::{Read, Write};
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use leadscout_shared::{
    CompanyAnalysis, DetailField, LeadScoutError, NOT_AVAILABLE, Result,
};

/// The seven columns enrichment writes, in output order.
pub fn enrichment_columns() -> Vec<&'static str> {
    DetailField::ALL
        .iter()
        .map(|f| f.column())
        .chain(CompanyAnalysis::COLUMNS)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    company_column: usize,
}

impl CompanyTable {
    /// Read CSV with a header row. Short rows are padded with empty cells.
    pub fn from_reader<R: Read>(reader: R, company_column: &str) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv
            .headers()
            .map_err(|e| LeadScoutError::Csv(format!("failed to read header row: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let company_idx = headers
            .iter()
            .position(|h| h == company_column)
            .ok_or_else(|| {
                LeadScoutError::validation(format!(
                    "input has no '{company_column}' column (found: {})",
                    headers.join(", ")
                ))
            })?;

        let mut rows = Vec::new();
        for (line, record) in csv.records().enumerate() {
            let record =
                record.map_err(|e| LeadScoutError::Csv(format!("row {}: {e}", line + 1)))?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() > headers.len() {
                debug!(row = line + 1, extra = row.len() - headers.len(), "dropping cells beyond header width");
            }
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        debug!(rows = rows.len(), columns = headers.len(), "table loaded");
        Ok(Self {
            headers,
            rows,
            company_column: company_idx,
        })
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path, company_column: &str) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| LeadScoutError::io(path, e))?;
        Self::from_reader(file, company_column)
    }

    /// Append any missing enrichment column, filled with `N/A`.
    pub fn ensure_columns(&mut self) {
        for column in enrichment_columns() {
            if self.column_index(column).is_none() {
                self.headers.push(column.to_string());
                for row in &mut self.rows {
                    row.push(NOT_AVAILABLE.to_string());
                }
            }
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The company name of `row`, trimmed.
    pub fn company(&self, row: usize) -> &str {
        self.rows
            .get(row)
            .map(|r| r[self.company_column].trim())
            .unwrap_or("")
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    pub fn set(&mut self, row: usize, column: &str, value: impl Into<String>) -> Result<()> {
        let col = self
            .column_index(column)
            .ok_or_else(|| LeadScoutError::validation(format!("unknown column '{column}'")))?;
        let cells = self
            .rows
            .get_mut(row)
            .ok_or_else(|| LeadScoutError::validation(format!("row {row} out of range")))?;
        cells[col] = value.into();
        Ok(())
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(&self.headers)
            .map_err(|e| LeadScoutError::Csv(e.to_string()))?;
        for row in &self.rows {
            csv.write_record(row)
                .map_err(|e| LeadScoutError::Csv(e.to_string()))?;
        }
        csv.flush()
            .map_err(|e| LeadScoutError::Csv(format!("flush failed: {e}")))?;
        Ok(())
    }

    /// Rows as JSON objects keyed by header.
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = self
                    .headers
                    .iter()
                    .zip(row)
                    .map(|(h, v)| (h.clone(), Value::String(v.clone())))
                    .collect();
                Value::Object(object)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "company_name,Website,notes\n\
        Acme Corporation,https://acme.example,keep me\n\
        Northwind Robotics,,\n\
        ,,orphan\n";

    fn table() -> CompanyTable {
        CompanyTable::from_reader(INPUT.as_bytes(), "company_name").unwrap()
    }

    #[test]
    fn loads_rows() {
        let table = table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.headers(), &["company_name", "Website", "notes"]);
        assert_eq!(table.company(0), "Acme Corporation");
        assert_eq!(table.company(2), "");
        assert_eq!(table.get(1, "Website"), Some(""));
        assert_eq!(table.get(0, "missing"), None);
    }

    #[test]
    fn missing_company_column() {
        let err = CompanyTable::from_reader("name,Website\nAcme,\n".as_bytes(), "company_name")
            .unwrap_err();
        assert!(matches!(err, LeadScoutError::Validation { .. }));
    }

    #[test]
    fn short_rows_are_padded() {
        let table =
            CompanyTable::from_reader("company_name,Industry,HQ Location\nAcme\n".as_bytes(), "company_name")
                .unwrap();
        assert_eq!(table.get(0, "HQ Location"), Some(""));
    }

    #[test]
    fn ensure_columns_appends_in_order() {
        let mut table = table();
        table.ensure_columns();
        assert_eq!(
            table.headers(),
            &[
                "company_name",
                "Website",
                "notes",
                "Industry",
                "Company Size",
                "HQ Location",
                "Summary",
                "Target Customer",
                "AI Automation Idea",
            ]
        );
        // Existing column untouched, new ones filled.
        assert_eq!(table.get(1, "Website"), Some(""));
        assert_eq!(table.get(1, "Summary"), Some(NOT_AVAILABLE));

        let before = table.clone();
        table.ensure_columns();
        assert_eq!(table, before);
    }

    #[test]
    fn set_and_write_roundtrip() {
        let mut table = table();
        table.ensure_columns();
        table.set(1, "Industry", "Robotics, logistics").unwrap();
        assert!(table.set(1, "Nope", "x").is_err());
        assert!(table.set(9, "Industry", "x").is_err());

        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let reread = CompanyTable::from_reader(out.as_slice(), "company_name").unwrap();
        assert_eq!(reread.get(1, "Industry"), Some("Robotics, logistics"));
        assert_eq!(reread.get(0, "notes"), Some("keep me"));
    }

    #[test]
    fn records_are_keyed_by_header() {
        let records = table().to_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["company_name"], "Acme Corporation");
        assert_eq!(records[0]["notes"], "keep me");
    }

    #[test]
    fn enrichment_column_list() {
        assert_eq!(enrichment_columns().len(), 7);
        assert_eq!(enrichment_columns()[0], "Website");
        assert_eq!(enrichment_columns()[6], "AI Automation Idea");
    }

    #[test]
    fn loads_fixture() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/csv/companies.csv");
        let table = CompanyTable::from_path(&path, "company_name").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.company(0), "Northwind Robotics");
    }

    #[test]
    fn records_keep_column_order() {
        let table =
            CompanyTable::from_reader("company_name,zeta,alpha\nAcme,1,2\n".as_bytes(), "company_name")
                .unwrap();
        let records = table.to_records();
        assert_eq!(
            serde_json::to_string(&records[0]).unwrap(),
            r#"{"company_name":"Acme","zeta":"1","alpha":"2"}"#
        );
    }
}
