//! MediaWiki action API client.
//!
//! A single `action=query` call resolves redirects and returns the page's
//! canonical URL together with its plain-text extract; the rendered HTML
//! (needed for the infobox) is fetched separately from that URL.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use leadscout_shared::{LeadScoutError, Result, WikiConfig};

/// Maximum number of redirects to follow for page HTML.
const MAX_REDIRECTS: usize = 5;

/// A resolved encyclopedia page.
#[derive(Debug, Clone)]
pub struct WikiPage {
    /// Canonical title after redirect resolution.
    pub title: String,
    /// Absolute URL of the rendered article.
    pub full_url: String,
    /// Plain-text body of the article (sections separated by newlines).
    pub text: String,
}

// ---------------------------------------------------------------------------
// API response shapes (formatversion=2)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<ApiPage>,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    extract: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Thin client over the MediaWiki action API.
pub struct WikiClient {
    client: Client,
    api_url: String,
}

impl WikiClient {
    pub fn new(config: &WikiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LeadScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// Look up an article by title. Returns `Ok(None)` when no such page exists.
    #[instrument(skip(self))]
    pub async fn page(&self, title: &str) -> Result<Option<WikiPage>> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("redirects", "1"),
                ("prop", "info|extracts"),
                ("inprop", "url"),
                ("explaintext", "1"),
                ("titles", title),
            ])
            .send()
            .await
            .map_err(|e| LeadScoutError::Network(format!("{}: {e}", self.api_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeadScoutError::Network(format!(
                "{}: HTTP {status}",
                self.api_url
            )));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| LeadScoutError::parse(format!("invalid wiki API response: {e}")))?;

        let Some(page) = body.query.and_then(|q| q.pages.into_iter().next()) else {
            debug!("wiki API returned no pages");
            return Ok(None);
        };

        if page.missing || page.invalid {
            debug!(title = %page.title, "wiki page does not exist");
            return Ok(None);
        }

        let Some(full_url) = page.fullurl else {
            return Err(LeadScoutError::parse(format!(
                "wiki page '{}' has no fullurl",
                page.title
            )));
        };

        Ok(Some(WikiPage {
            title: page.title,
            full_url,
            text: page.extract.unwrap_or_default(),
        }))
    }

    /// Fetch the rendered HTML of a page.
    #[instrument(skip_all, fields(url = %page.full_url))]
    pub async fn page_html(&self, page: &WikiPage) -> Result<String> {
        let response = self
            .client
            .get(&page.full_url)
            .send()
            .await
            .map_err(|e| LeadScoutError::Network(format!("{}: {e}", page.full_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeadScoutError::Network(format!(
                "{}: HTTP {status}",
                page.full_url
            )));
        }

        response.text().await.map_err(|e| {
            LeadScoutError::Network(format!("{}: failed to read body: {e}", page.full_url))
        })
    }
}
