//! Hostname rules deciding how a page is fetched.

use std::fmt;

use leadscout_shared::ExtractorConfig;

/// How a page's HTML is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Plain HTTP GET.
    Static,
    /// Local headless Chrome, for sites that render client-side.
    Browser,
    /// Remote rendering proxy, for sites that block plain clients.
    RenderProxy,
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Browser => write!(f, "browser"),
            Self::RenderProxy => write!(f, "render-proxy"),
        }
    }
}

/// Picks a [`FetchStrategy`] per URL.
///
/// Rules are substring matches on the lowercased URL. Browser rules take
/// precedence; proxy rules only apply when a proxy key is available.
#[derive(Debug, Clone, Default)]
pub struct StrategySelector {
    browser_hosts: Vec<String>,
    proxy_hosts: Vec<String>,
    proxy_available: bool,
}

impl StrategySelector {
    pub fn new(browser_hosts: Vec<String>, proxy_hosts: Vec<String>, proxy_available: bool) -> Self {
        Self {
            browser_hosts: lowercase_all(browser_hosts),
            proxy_hosts: lowercase_all(proxy_hosts),
            proxy_available,
        }
    }

    pub fn from_config(config: &ExtractorConfig, proxy_available: bool) -> Self {
        Self::new(
            config.browser_hosts.clone(),
            config.proxy_hosts.clone(),
            proxy_available,
        )
    }

    pub fn select(&self, url: &str) -> FetchStrategy {
        let url = url.to_lowercase();

        if self.browser_hosts.iter().any(|h| url.contains(h.as_str())) {
            FetchStrategy::Browser
        } else if self.proxy_available && self.proxy_hosts.iter().any(|h| url.contains(h.as_str())) {
            FetchStrategy::RenderProxy
        } else {
            FetchStrategy::Static
        }
    }
}

fn lowercase_all(hosts: Vec<String>) -> Vec<String> {
    hosts
        .into_iter()
        .map(|h| h.trim().to_lowercase())
        .filter(|h| !h.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(proxy_available: bool) -> StrategySelector {
        StrategySelector::new(
            vec!["openai.com".into()],
            vec!["Cloudflare-Shop.example".into(), "openai.com".into()],
            proxy_available,
        )
    }

    #[test]
    fn browser_host_wins() {
        assert_eq!(selector(true).select("https://OpenAI.com/about"), FetchStrategy::Browser);
    }

    #[test]
    fn proxy_host_needs_key() {
        let url = "https://www.cloudflare-shop.example/";
        assert_eq!(selector(true).select(url), FetchStrategy::RenderProxy);
        assert_eq!(selector(false).select(url), FetchStrategy::Static);
    }

    #[test]
    fn everything_else_is_static() {
        assert_eq!(selector(true).select("https://acme.example"), FetchStrategy::Static);
        assert_eq!(StrategySelector::default().select("https://openai.com"), FetchStrategy::Static);
    }

    #[test]
    fn default_config_routes_openai_to_browser() {
        let selector = StrategySelector::from_config(&ExtractorConfig::default(), false);
        assert_eq!(selector.select("https://openai.com"), FetchStrategy::Browser);
    }

    #[test]
    fn blank_rules_are_ignored() {
        let selector = StrategySelector::new(vec!["  ".into()], vec![], true);
        assert_eq!(selector.select("https://acme.example"), FetchStrategy::Static);
    }
}
