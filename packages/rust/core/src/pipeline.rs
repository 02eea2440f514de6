//! Row-by-row enrichment: resolve details → analyze website → write back.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use leadscout_analyzer::Analyzer;
use leadscout_resolver::DetailResolver;
use leadscout_shared::{
    CompanyAnalysis, CompanyDetails, DetailField, DetailSource, PipelineConfig, Result, RunId,
    is_missing,
};

use crate::table::CompanyTable;

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Looks up company details. Must not fail; unknown fields are `N/A`.
#[async_trait]
pub trait DetailLookup: Send + Sync {
    async fn lookup(&self, company: &str) -> CompanyDetails;
}

/// Produces a website analysis. Must not fail; unknown fields are `N/A`.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    async fn analyze(&self, url: &str, company: &str) -> CompanyAnalysis;
}

#[async_trait]
impl DetailLookup for DetailResolver {
    async fn lookup(&self, company: &str) -> CompanyDetails {
        self.resolve(company).await
    }
}

#[async_trait]
impl ContentAnalyzer for Analyzer {
    async fn analyze(&self, url: &str, company: &str) -> CompanyAnalysis {
        Analyzer::analyze(self, url, company).await
    }
}

// ---------------------------------------------------------------------------
// Options, progress, summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct EnrichOptions {
    /// Pause between rows.
    pub row_delay: Duration,
}

impl EnrichOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            row_delay: Duration::from_millis(config.row_delay_ms),
        }
    }
}

/// Progress callback for reporting enrichment status.
pub trait EnrichProgress: Send + Sync {
    /// Called before a row is processed. `index` is zero-based.
    fn row_started(&self, index: usize, total: usize, company: &str);
    /// Called when a row enters a new stage ("resolving", "analyzing").
    fn stage(&self, name: &str);
    /// Called after a row's cells are written.
    fn row_finished(&self, index: usize, total: usize, details: &CompanyDetails);
    /// Called once when every row is done.
    fn done(&self, summary: &EnrichmentSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl EnrichProgress for SilentProgress {
    fn row_started(&self, _index: usize, _total: usize, _company: &str) {}
    fn stage(&self, _name: &str) {}
    fn row_finished(&self, _index: usize, _total: usize, _details: &CompanyDetails) {}
    fn done(&self, _summary: &EnrichmentSummary) {}
}

/// Counters for a completed enrichment run.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentSummary {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    /// Rows in the table.
    pub rows: usize,
    /// Rows without a company name.
    pub skipped: usize,
    /// Rows sent to the detail resolver.
    pub resolved: usize,
    /// Rows that ended with a website.
    pub websites_found: usize,
    /// Rows with at least one analysis field filled.
    pub analyzed: usize,
    pub elapsed_ms: u64,
}

impl EnrichmentSummary {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Enrich every row of `table` in order.
///
/// Rows whose four detail cells are all present are not resolved again.
/// Analysis runs only when `analyzer` is given and the row has a website.
#[instrument(skip_all, fields(rows = table.len()))]
pub async fn enrich_table(
    table: &mut CompanyTable,
    resolver: &dyn DetailLookup,
    analyzer: Option<&dyn ContentAnalyzer>,
    options: &EnrichOptions,
    progress: &dyn EnrichProgress,
) -> Result<EnrichmentSummary> {
    let start = Instant::now();
    let mut summary = EnrichmentSummary {
        run_id: RunId::new(),
        started_at: Utc::now(),
        rows: table.len(),
        skipped: 0,
        resolved: 0,
        websites_found: 0,
        analyzed: 0,
        elapsed_ms: 0,
    };

    info!(run_id = %summary.run_id, analysis = analyzer.is_some(), "starting enrichment");
    table.ensure_columns();

    let total = table.len();
    for index in 0..total {
        if index > 0 && !options.row_delay.is_zero() {
            tokio::time::sleep(options.row_delay).await;
        }

        let company = table.company(index).to_string();
        progress.row_started(index, total, &company);

        if company.is_empty() {
            warn!(row = index + 1, "row has no company name, skipping");
            summary.skipped += 1;
            let details = provided_details(table, index, "");
            write_row(table, index, &details, &CompanyAnalysis::unavailable())?;
            progress.row_finished(index, total, &details);
            continue;
        }

        let provided = provided_details(table, index, &company);
        let details = if provided.is_complete() {
            debug!(%company, "all details provided, skipping resolver");
            provided
        } else {
            progress.stage("resolving");
            summary.resolved += 1;
            merge_details(provided, resolver.lookup(&company).await)
        };

        let analysis = match analyzer {
            Some(analyzer) if details.has_website() => {
                progress.stage("analyzing");
                analyzer.analyze(&details.website, &company).await
            }
            _ => CompanyAnalysis::unavailable(),
        };

        if details.has_website() {
            summary.websites_found += 1;
        }
        if analysis.is_available() {
            summary.analyzed += 1;
        }

        write_row(table, index, &details, &analysis)?;
        progress.row_finished(index, total, &details);
    }

    summary.elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
        rows = summary.rows,
        resolved = summary.resolved,
        websites = summary.websites_found,
        analyzed = summary.analyzed,
        skipped = summary.skipped,
        elapsed_ms = summary.elapsed_ms,
        "enrichment completed"
    );
    progress.done(&summary);

    Ok(summary)
}

/// Details already present in the row; blank cells become `N/A`.
fn provided_details(table: &CompanyTable, row: usize, company: &str) -> CompanyDetails {
    let mut details = CompanyDetails::unknown(company);
    for field in DetailField::ALL {
        if let Some(value) = table.get(row, field.column()).filter(|v| !is_missing(v)) {
            details.set(field, value.trim());
        }
    }
    if details.has_website() {
        details.website_source = DetailSource::Provided;
    }
    details
}

/// Fill the gaps of `provided` from `resolved`; provided values always win.
fn merge_details(provided: CompanyDetails, resolved: CompanyDetails) -> CompanyDetails {
    let mut merged = provided;
    for field in merged.missing_fields() {
        merged.set(field, resolved.get(field));
    }
    if merged.website_source != DetailSource::Provided {
        merged.website_source = resolved.website_source;
    }
    merged
}

fn write_row(
    table: &mut CompanyTable,
    row: usize,
    details: &CompanyDetails,
    analysis: &CompanyAnalysis,
) -> Result<()> {
    for field in DetailField::ALL {
        table.set(row, field.column(), details.get(field))?;
    }
    for (column, value) in CompanyAnalysis::COLUMNS.iter().zip(analysis.values()) {
        table.set(row, column, value)?;
    }
    Ok(())
}
