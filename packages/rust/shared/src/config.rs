//! Application configuration for LeadScout.
//!
//! User config lives at `~/.leadscout/leadscout.toml`.
//! CLI flags override config file values, which override defaults.
//! Credentials are never stored in the file; each section names the
//! environment variable that holds its key.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LeadScoutError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "leadscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".leadscout";

// ---------------------------------------------------------------------------
// Config structs (matching leadscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Encyclopedia (MediaWiki) lookup settings.
    #[serde(default)]
    pub wiki: WikiConfig,

    /// Search-engine fallback settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Website content extraction settings.
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Third-party rendering proxy settings.
    #[serde(default)]
    pub render_proxy: RenderProxyConfig,

    /// Gemini model settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Row pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// `[wiki]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    /// MediaWiki action API endpoint.
    #[serde(default = "default_wiki_api_url")]
    pub api_url: String,

    /// Base used to absolutize site-relative links found in infoboxes.
    #[serde(default = "default_wiki_page_base")]
    pub page_base: String,

    /// User-Agent sent to the wiki (Wikimedia requires a descriptive one).
    #[serde(default = "default_wiki_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds.
    #[serde(default = "default_short_timeout")]
    pub timeout_secs: u64,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            api_url: default_wiki_api_url(),
            page_base: default_wiki_page_base(),
            user_agent: default_wiki_user_agent(),
            timeout_secs: default_short_timeout(),
        }
    }
}

fn default_wiki_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".into()
}
fn default_wiki_page_base() -> String {
    "https://en.wikipedia.org".into()
}
fn default_wiki_user_agent() -> String {
    concat!("LeadScoutBot/", env!("CARGO_PKG_VERSION")).into()
}
fn default_short_timeout() -> u64 {
    10
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Whether the search fallback runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// HTML search endpoint (DuckDuckGo's no-JS frontend by default).
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Number of result URLs to inspect.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_short_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_search_endpoint(),
            max_results: default_max_results(),
            timeout_secs: default_short_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_search_endpoint() -> String {
    "https://html.duckduckgo.com/html/".into()
}
fn default_max_results() -> usize {
    5
}

/// `[extractor]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// URL fragments that require a rendered (headless browser) fetch.
    #[serde(default = "default_browser_hosts")]
    pub browser_hosts: Vec<String>,

    /// URL fragments routed through the rendering proxy.
    #[serde(default)]
    pub proxy_hosts: Vec<String>,

    /// Maximum characters of visible text passed to the model.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Static fetch timeout in seconds.
    #[serde(default = "default_short_timeout")]
    pub timeout_secs: u64,

    /// User-Agent for static fetches.
    #[serde(default = "default_static_user_agent")]
    pub user_agent: String,

    /// User-Agent presented by the headless browser.
    #[serde(default = "default_browser_user_agent")]
    pub browser_user_agent: String,

    /// Navigation timeout for the headless browser, in seconds.
    #[serde(default = "default_browser_timeout")]
    pub browser_timeout_secs: u64,

    /// Time to let client-side JS (and bot challenges) settle after load.
    #[serde(default = "default_browser_settle_ms")]
    pub browser_settle_ms: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            browser_hosts: default_browser_hosts(),
            proxy_hosts: Vec::new(),
            max_chars: default_max_chars(),
            timeout_secs: default_short_timeout(),
            user_agent: default_static_user_agent(),
            browser_user_agent: default_browser_user_agent(),
            browser_timeout_secs: default_browser_timeout(),
            browser_settle_ms: default_browser_settle_ms(),
        }
    }
}

fn default_browser_hosts() -> Vec<String> {
    vec!["openai.com".into()]
}
fn default_max_chars() -> usize {
    6000
}
fn default_static_user_agent() -> String {
    "Mozilla/5.0".into()
}
fn default_browser_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0 Safari/537.36".into()
}
fn default_browser_timeout() -> u64 {
    60
}
fn default_browser_settle_ms() -> u64 {
    15_000
}

/// `[render_proxy]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderProxyConfig {
    /// Proxy endpoint; the target URL is passed as the `url` query parameter.
    #[serde(default = "default_proxy_endpoint")]
    pub endpoint: String,

    /// Name of the env var holding the proxy API key.
    #[serde(default = "default_proxy_key_env")]
    pub api_key_env: String,

    /// Ask the proxy to execute JavaScript before returning HTML.
    #[serde(default = "default_true")]
    pub render_js: bool,

    /// Request timeout in seconds (rendering is slow).
    #[serde(default = "default_browser_timeout")]
    pub timeout_secs: u64,
}

impl Default for RenderProxyConfig {
    fn default() -> Self {
        Self {
            endpoint: default_proxy_endpoint(),
            api_key_env: default_proxy_key_env(),
            render_js: true,
            timeout_secs: default_browser_timeout(),
        }
    }
}

fn default_proxy_endpoint() -> String {
    "https://api.scraperapi.com/".into()
}
fn default_proxy_key_env() -> String {
    "SCRAPER_API_KEY".into()
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env: String,

    /// Model used for company analysis.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL for `models/{model}:generateContent`.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature; the service default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_gemini_key_env(),
            model: default_model(),
            base_url: default_gemini_base_url(),
            timeout_secs: default_model_timeout(),
            temperature: None,
        }
    }
}

fn default_gemini_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_model() -> String {
    "gemini-1.5-flash-latest".into()
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".into()
}
fn default_model_timeout() -> u64 {
    120
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input column holding the company name.
    #[serde(default = "default_company_column")]
    pub company_column: String,

    /// Fixed pause between rows, in milliseconds.
    #[serde(default)]
    pub row_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            company_column: default_company_column(),
            row_delay_ms: 0,
        }
    }
}

fn default_company_column() -> String {
    "company_name".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.leadscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LeadScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.leadscout/leadscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LeadScoutError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LeadScoutError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LeadScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LeadScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LeadScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read a non-empty value from the named environment variable.
pub fn api_key_from_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => None,
    }
}

/// Check that the Gemini API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.gemini.api_key_env;
    match api_key_from_env(var_name) {
        Some(_) => Ok(()),
        None => Err(LeadScoutError::config(format!(
            "Gemini API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://aistudio.google.com/app/apikey"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("GEMINI_API_KEY"));
        assert!(toml_str.contains("openai.com"));
        assert!(!toml_str.contains("temperature"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.extractor.max_chars, 6000);
        assert_eq!(parsed.search.max_results, 5);
        assert_eq!(parsed.gemini.model, "gemini-1.5-flash-latest");
        assert_eq!(parsed.pipeline.company_column, "company_name");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[extractor]
proxy_hosts = ["cloudflare-protected.example"]

[gemini]
model = "gemini-1.5-pro"
temperature = 0.2
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.extractor.proxy_hosts, vec!["cloudflare-protected.example"]);
        assert_eq!(config.extractor.browser_hosts, vec!["openai.com"]);
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.gemini.temperature, Some(0.2));
        assert_eq!(config.gemini.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.wiki.timeout_secs, 10);
    }

    #[test]
    fn load_config_from_file() {
        let dir = std::env::temp_dir().join(format!("ls-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("leadscout.toml");
        std::fs::write(&path, "[pipeline]\nrow_delay_ms = 250\n").unwrap();

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.pipeline.row_delay_ms, 250);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_config_rejects_bad_toml() {
        let dir = std::env::temp_dir().join(format!("ls-config-bad-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("leadscout.toml");
        std::fs::write(&path, "[pipeline\nrow_delay_ms = ").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.gemini.api_key_env = "LS_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
