//! Shared types, error model, and configuration for LeadScout.
//!
//! This crate is the foundation depended on by all other LeadScout crates.
//! It provides:
//! - [`LeadScoutError`]: the unified error type
//! - Domain types ([`CompanyDetails`], [`CompanyAnalysis`], [`DetailField`], [`RunId`])
//! - Configuration ([`AppConfig`] and its sections, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ExtractorConfig, GeminiConfig, PipelineConfig, RenderProxyConfig, SearchConfig,
    WikiConfig, api_key_from_env, config_dir, config_file_path, init_config, load_config,
    load_config_from, validate_api_key,
};
pub use error::{LeadScoutError, Result};
pub use types::{
    CompanyAnalysis, CompanyDetails, DetailField, DetailSource, NOT_AVAILABLE, RunId, is_missing,
};
