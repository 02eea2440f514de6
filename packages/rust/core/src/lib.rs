//! Core enrichment workflow for LeadScout.
//!
//! This crate ties the detail resolver and the website analyzer into an
//! end-to-end run over a company table: load → enrich → export.

pub mod pipeline;
pub mod sink;
pub mod table;

pub use pipeline::{
    ContentAnalyzer, DetailLookup, EnrichOptions, EnrichProgress, EnrichmentSummary,
    SilentProgress, enrich_table,
};
pub use sink::{DEFAULT_OUTPUT, ExportFormat, default_output_path, export};
pub use table::{CompanyTable, enrichment_columns};
