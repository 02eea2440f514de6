//! Website content extraction.
//!
//! This crate provides:
//! - [`strategy`]: hostname rules choosing static, browser or proxy fetching
//! - [`browser`]: headless Chrome rendering
//! - [`ContentExtractor`]: fetch a page and reduce it to bounded visible text

pub mod browser;
pub mod strategy;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use leadscout_shared::{
    AppConfig, ExtractorConfig, LeadScoutError, RenderProxyConfig, Result, api_key_from_env,
};
use leadscout_text::{truncate_chars, visible_text};

pub use browser::BrowserOptions;
pub use strategy::{FetchStrategy, StrategySelector};

/// Maximum number of redirects for static and proxy fetches.
const MAX_REDIRECTS: usize = 5;

/// Fetches a website and returns its visible text, capped at `max_chars`.
pub struct ContentExtractor {
    client: Client,
    rules: ExtractorConfig,
    selector: StrategySelector,
    browser: BrowserOptions,
    proxy: RenderProxyConfig,
    proxy_key: Option<String>,
    max_chars: usize,
}

impl ContentExtractor {
    /// Build an extractor; the proxy key is read from `render_proxy.api_key_env`.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let ext = &config.extractor;
        let client = Client::builder()
            .user_agent(ext.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(ext.timeout_secs))
            .build()
            .map_err(|e| LeadScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        let proxy_key = api_key_from_env(&config.render_proxy.api_key_env);
        if proxy_key.is_none() && !ext.proxy_hosts.is_empty() {
            debug!(
                env = %config.render_proxy.api_key_env,
                "render proxy key not set, proxy hosts will be fetched statically"
            );
        }

        Ok(Self {
            client,
            rules: ext.clone(),
            selector: StrategySelector::from_config(ext, proxy_key.is_some()),
            browser: BrowserOptions {
                user_agent: ext.browser_user_agent.clone(),
                navigation_timeout: Duration::from_secs(ext.browser_timeout_secs),
                settle: Duration::from_millis(ext.browser_settle_ms),
            },
            proxy: config.render_proxy.clone(),
            proxy_key,
            max_chars: ext.max_chars,
        })
    }

    /// Use an explicit render proxy key instead of the environment.
    pub fn with_proxy_key(mut self, key: impl Into<String>) -> Self {
        self.proxy_key = Some(key.into());
        self.selector = StrategySelector::from_config(&self.rules, true);
        self
    }

    /// The strategy that [`extract`](Self::extract) would use for `url`.
    pub fn strategy_for(&self, url: &str) -> FetchStrategy {
        self.selector.select(url)
    }

    /// Fetch `url` with the strategy its hostname calls for.
    ///
    /// Never fails: any error is logged and an empty string returned.
    #[instrument(skip(self))]
    pub async fn extract(&self, url: &str) -> String {
        let strategy = self.selector.select(url);
        match self.extract_with(strategy, url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(%strategy, error = %e, "content extraction failed");
                String::new()
            }
        }
    }

    /// Fetch `url` with an explicit strategy and return its bounded visible text.
    pub async fn extract_with(&self, strategy: FetchStrategy, url: &str) -> Result<String> {
        let html = match strategy {
            FetchStrategy::Static => self.fetch_static(url).await?,
            FetchStrategy::Browser => browser::render(url, &self.browser).await?,
            FetchStrategy::RenderProxy => self.fetch_via_proxy(url).await?,
        };

        let text = truncate_chars(&visible_text(&html), self.max_chars);
        info!(%strategy, text_len = text.len(), "content extracted");
        Ok(text)
    }

    async fn fetch_static(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url)
            .map_err(|e| LeadScoutError::validation(format!("invalid URL '{url}': {e}")))?;
        self.get_body(parsed, None).await
    }

    async fn fetch_via_proxy(&self, url: &str) -> Result<String> {
        let Some(key) = &self.proxy_key else {
            return Err(LeadScoutError::config(format!(
                "render proxy key not set; export {}",
                self.proxy.api_key_env
            )));
        };

        let request_url = proxy_request_url(&self.proxy, key, url)?;
        self.get_body(request_url, Some(Duration::from_secs(self.proxy.timeout_secs)))
            .await
    }

    async fn get_body(&self, url: Url, timeout: Option<Duration>) -> Result<String> {
        // Never log the full proxy URL: it carries the API key.
        let shown = format!("{}{}", url.origin().ascii_serialization(), url.path());

        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LeadScoutError::Network(format!("{shown}: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeadScoutError::Network(format!("{shown}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| {
                LeadScoutError::Network(format!("{shown}: failed to read body: {}", e.without_url()))
            })
    }
}

/// Build `{endpoint}?api_key=..&url=..[&render=true]`.
fn proxy_request_url(proxy: &RenderProxyConfig, key: &str, target: &str) -> Result<Url> {
    let mut url = Url::parse(&proxy.endpoint).map_err(|e| {
        LeadScoutError::config(format!("invalid render proxy endpoint '{}': {e}", proxy.endpoint))
    })?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("api_key", key).append_pair("url", target);
        if proxy.render_js {
            query.append_pair("render", "true");
        }
    }
    Ok(url)
}
