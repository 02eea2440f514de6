//! Detail resolver: locates a company's public metadata.
//!
//! The fallback chain is:
//! 1. encyclopedia page lookup ([`wiki`]) and its infobox ([`infobox`])
//! 2. keyword matching over the page's plain text ([`raw_text`])
//! 3. a web search for the official site ([`search`]), website only
//!
//! Every stage is best-effort: failures are logged and the affected fields
//! stay `N/A`.

pub mod infobox;
pub mod raw_text;
pub mod search;
pub mod wiki;

use tracing::{debug, info, instrument, warn};

use leadscout_shared::{AppConfig, CompanyDetails, DetailField, DetailSource, Result};

pub use search::{DuckDuckGoSearch, SearchEngine, official_site_query, pick_official_site};
pub use wiki::{WikiClient, WikiPage};

/// Runs the encyclopedia → raw text → search fallback chain.
pub struct DetailResolver {
    wiki: WikiClient,
    search: Option<Box<dyn SearchEngine>>,
    page_base: String,
    max_results: usize,
}

impl DetailResolver {
    /// Build a resolver from config (DuckDuckGo search unless disabled).
    pub fn new(config: &AppConfig) -> Result<Self> {
        let search: Option<Box<dyn SearchEngine>> = if config.search.enabled {
            Some(Box::new(DuckDuckGoSearch::new(&config.search)?))
        } else {
            None
        };

        Ok(Self {
            wiki: WikiClient::new(&config.wiki)?,
            search,
            page_base: config.wiki.page_base.clone(),
            max_results: config.search.max_results,
        })
    }

    /// Replace the search backend.
    pub fn with_search(mut self, engine: Box<dyn SearchEngine>) -> Self {
        self.search = Some(engine);
        self
    }

    /// Resolve website, industry, size and HQ for `company`.
    ///
    /// Never fails; anything that cannot be found is left as `N/A`.
    #[instrument(skip(self))]
    pub async fn resolve(&self, company: &str) -> CompanyDetails {
        let mut details = CompanyDetails::unknown(company);

        let page = match self.wiki.page(company).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "wiki lookup failed");
                None
            }
        };

        let Some(page) = page else {
            info!("wiki page not found, trying search fallback");
            self.search_website(company, &mut details).await;
            return details;
        };

        debug!(title = %page.title, url = %page.full_url, "wiki page found");

        // --- Stage 1: infobox ---
        match self.wiki.page_html(&page).await {
            Ok(html) => {
                for (field, value) in infobox::parse_infobox(&html, &self.page_base) {
                    details.set(field, value);
                }
                if details.has_website() {
                    details.website_source = DetailSource::Infobox;
                }
            }
            Err(e) => warn!(error = %e, "error fetching infobox page"),
        }

        // --- Stage 2: raw text ---
        if !details.is_complete() {
            let filled = raw_text::fill_from_text(&page.text, &mut details);
            if filled.contains(&DetailField::Website) {
                details.website_source = DetailSource::RawText;
            }
            debug!(?filled, "raw text fallback");
        }

        // --- Stage 3: search ---
        if !details.has_website() {
            self.search_website(company, &mut details).await;
        }

        info!(
            website = %details.website,
            source = ?details.website_source,
            missing = details.missing_fields().len(),
            "details resolved"
        );
        details
    }

    /// Fill the website from a search, if a backend is configured.
    async fn search_website(&self, company: &str, details: &mut CompanyDetails) {
        let Some(engine) = &self.search else {
            return;
        };

        let query = official_site_query(company);
        match engine.search(&query, self.max_results).await {
            Ok(urls) => {
                if let Some(url) = pick_official_site(company, &urls) {
                    info!(engine = engine.name(), %url, "website found via search");
                    details.website = url;
                    details.website_source = DetailSource::Search;
                } else {
                    debug!(results = urls.len(), "no search result matched the company name");
                }
            }
            Err(e) => warn!(engine = engine.name(), error = %e, "search failed"),
        }
    }
}
