//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use leadscout_shared::{GeminiConfig, LeadScoutError, Result, api_key_from_env};

/// A text-in, text-out language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send `prompt` and return the model's reply text.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier for tracing.
    fn model_name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: Option<f32>,
}

impl GeminiClient {
    /// Build a client, reading the key from `config.api_key_env`.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = api_key_from_env(&config.api_key_env).ok_or_else(|| {
            LeadScoutError::config(format!(
                "Gemini API key not found. Set the {} environment variable.",
                config.api_key_env
            ))
        })?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &GeminiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LeadScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.trim().to_string(),
            api_key: api_key.into(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: self.temperature.map(|temperature| GenerationConfig { temperature }),
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| LeadScoutError::Model(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LeadScoutError::Model(format!("API error ({status}): {text}")));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LeadScoutError::Model(format!("invalid response JSON: {}", e.without_url())))?;

        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| LeadScoutError::Model("response has no candidate text".into()))?;

        debug!(reply_len = text.len(), "model replied");
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> GeminiConfig {
        GeminiConfig {
            base_url: format!("{}/v1beta/models/", server.uri()),
            ..GeminiConfig::default()
        }
    }

    #[tokio::test]
    async fn generate_returns_first_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash-latest:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{ "parts": [{ "text": "hello" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "first" }, { "text": "second" }] },
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_api_key(&config_for(&server), "test-key").unwrap();
        assert_eq!(client.generate("hello").await.unwrap(), "first");
        assert_eq!(client.model_name(), "gemini-1.5-flash-latest");
    }

    #[tokio::test]
    async fn temperature_is_sent_when_set() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": { "temperature": 0.5 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
            })))
            .mount(&server)
            .await;

        let config = GeminiConfig {
            temperature: Some(0.5),
            ..config_for(&server)
        };
        let client = GeminiClient::with_api_key(&config, "k").unwrap();
        assert_eq!(client.generate("x").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn api_error_is_model_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let client = GeminiClient::with_api_key(&config_for(&server), "bad").unwrap();
        let err = client.generate("x").await.unwrap_err();
        match err {
            LeadScoutError::Model(msg) => assert!(msg.contains("API key not valid")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn blocked_reply_without_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_api_key(&config_for(&server), "k").unwrap();
        assert!(matches!(
            client.generate("x").await,
            Err(LeadScoutError::Model(_))
        ));
    }

    #[test]
    fn missing_env_key_is_config_error() {
        let config = GeminiConfig {
            api_key_env: "LEADSCOUT_TEST_UNSET_GEMINI_KEY".into(),
            ..GeminiConfig::default()
        };
        assert!(matches!(
            GeminiClient::new(&config),
            Err(LeadScoutError::Config { .. })
        ));
    }
}
