//! Search-engine fallback for locating a company's official website.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use leadscout_shared::{LeadScoutError, Result, SearchConfig};

/// Browser-like User-Agent; the HTML frontend rejects obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// A web search backend returning result URLs in rank order.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Run `query` and return at most `max_results` result URLs.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>>;

    /// Human-readable backend name for tracing.
    fn name(&self) -> &str;
}

/// Build the query used to look for an official site.
pub fn official_site_query(company: &str) -> String {
    format!("{} official website", company.trim())
}

/// Pick the first URL that mentions the company name.
///
/// A URL matches when it contains the lowercased name as-is, or its compact
/// alphanumeric form (`Acme Labs` → `acmelabs`).
pub fn pick_official_site(company: &str, urls: &[String]) -> Option<String> {
    let name = company.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }
    let compact: String = name.chars().filter(|c| c.is_alphanumeric()).collect();

    urls.iter()
        .find(|url| {
            let url = url.to_lowercase();
            url.contains(&name) || (!compact.is_empty() && url.contains(&compact))
        })
        .cloned()
}

// ---------------------------------------------------------------------------
// DuckDuckGo HTML frontend
// ---------------------------------------------------------------------------

/// Scrapes the no-JavaScript DuckDuckGo results page.
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LeadScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl SearchEngine for DuckDuckGoSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| LeadScoutError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeadScoutError::Network(format!(
                "{}: HTTP {status}",
                self.endpoint
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LeadScoutError::Network(format!("{}: failed to read body: {e}", self.endpoint)))?;

        let urls = parse_result_links(&body, max_results);
        debug!(results = urls.len(), "search results parsed");
        Ok(urls)
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

/// Extract organic result URLs from a results page.
fn parse_result_links(html: &str, max_results: usize) -> Vec<String> {
    let doc = Html::parse_document(html);
    let link_sel = Selector::parse("a.result__a[href]").expect("valid selector");

    let mut urls: Vec<String> = Vec::new();
    for el in doc.select(&link_sel) {
        if urls.len() >= max_results {
            break;
        }
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Some(target) = unwrap_redirect(href) else {
            continue;
        };
        if !urls.contains(&target) {
            urls.push(target);
        }
    }
    urls
}

/// Resolve a result href to the destination URL.
///
/// Results are wrapped as `//duckduckgo.com/l/?uddg=<encoded target>`;
/// sponsored links point back at duckduckgo.com and are dropped.
fn unwrap_redirect(href: &str) -> Option<String> {
    let absolute = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        href.to_string()
    };

    let url = Url::parse(&absolute).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    let is_ddg = url
        .host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"));
    if !is_ddg {
        return Some(url.to_string());
    }

    url.query_pairs()
        .find(|(k, _)| k == "uddg")
        .map(|(_, v)| v.into_owned())
        .filter(|target| target.starts_with("http"))
        .filter(|target| !target.contains("duckduckgo.com/y.js"))
}
