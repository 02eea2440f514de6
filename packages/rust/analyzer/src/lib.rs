//! Website analysis with a language model.
//!
//! [`Analyzer::analyze`] fetches a company's website text, prompts the model
//! and parses the reply into a [`CompanyAnalysis`]. Every failure degrades
//! to [`CompanyAnalysis::unavailable`].

pub mod gemini;
pub mod parse;
pub mod prompt;

use tracing::{info, instrument, warn};

use leadscout_extractor::ContentExtractor;
use leadscout_shared::{AppConfig, CompanyAnalysis, Result, is_missing};

pub use gemini::{GeminiClient, LanguageModel};
pub use parse::parse_response;
pub use prompt::build_prompt;

/// Source of website text for the analyzer.
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// Visible text of `url`, or an empty string when unavailable.
    async fn content(&self, url: &str) -> String;
}

#[async_trait::async_trait]
impl ContentSource for ContentExtractor {
    async fn content(&self, url: &str) -> String {
        self.extract(url).await
    }
}

pub struct Analyzer {
    content: Box<dyn ContentSource>,
    model: Box<dyn LanguageModel>,
}

impl Analyzer {
    /// Static/browser/proxy extractor plus Gemini, both from config.
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self::with_parts(
            Box::new(ContentExtractor::new(config)?),
            Box::new(GeminiClient::new(&config.gemini)?),
        ))
    }

    pub fn with_parts(content: Box<dyn ContentSource>, model: Box<dyn LanguageModel>) -> Self {
        Self { content, model }
    }

    /// Analyze the website at `url` for `company`.
    #[instrument(skip(self))]
    pub async fn analyze(&self, url: &str, company: &str) -> CompanyAnalysis {
        if is_missing(url) {
            info!("no website, skipping analysis");
            return CompanyAnalysis::unavailable();
        }

        let content = self.content.content(url).await;
        if content.trim().is_empty() {
            warn!("no website content to analyze");
            return CompanyAnalysis::unavailable();
        }

        let prompt = build_prompt(company, &content);
        let reply = match self.model.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(model = self.model.model_name(), error = %e, "model request failed");
                return CompanyAnalysis::unavailable();
            }
        };

        match parse_response(&reply) {
            Some(analysis) => {
                info!(model = self.model.model_name(), "analysis complete");
                analysis
            }
            None => {
                warn!(reply_len = reply.len(), "failed to parse JSON from model reply");
                CompanyAnalysis::unavailable()
            }
        }
    }
}
