//! Gemini `generateContent` client.

use crate::config::toml_config::GeminiConfig;
use crate::domain::model::SearchPrompt;
use crate::domain::ports::SearchBackend;
use crate::utils::error::{GemsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f64,
    thinking_budget: u32,
    google_search: bool,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            temperature: config.temperature,
            thinking_budget: config.thinking_budget,
            google_search: config.google_search,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }

    fn request_body(&self, prompt: &SearchPrompt) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: prompt.user_prompt.clone(),
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: prompt.system_instruction.clone(),
                }],
            },
            tools: if self.google_search {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            } else {
                Vec::new()
            },
            generation_config: GenerationConfig {
                temperature: self.temperature,
                thinking_config: ThinkingConfig {
                    thinking_budget: self.thinking_budget,
                },
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    thinking_config: ThinkingConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
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

impl GenerateResponse {
    /// Text of the first candidate; empty when the model produced none.
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl SearchBackend for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &SearchPrompt) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GemsError::configuration("API_KEY environment variable is not set."))?;

        let url = self.url();
        tracing::debug!("Making Gemini request to: {}", url);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Gemini response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Gemini returned status {}: {}", status, body);
            return Err(GemsError::fetch(format!("Gemini returned status {}", status)));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GemsError::fetch(format!("Unreadable Gemini response: {}", e)))?;

        let text = body.text();
        tracing::debug!("Gemini returned {} characters of text", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config(endpoint: String) -> GeminiConfig {
        GeminiConfig {
            endpoint,
            ..GeminiConfig::default()
        }
    }

    fn prompt() -> SearchPrompt {
        SearchPrompt {
            system_instruction: "You are a real estate data API.".to_string(),
            user_prompt: "Find listings in 90210".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_sends_grounded_request_and_joins_parts() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent")
                .header("x-goog-api-key", "test-key")
                .json_body_partial(
                    r#"{
                        "tools": [{"google_search": {}}],
                        "generationConfig": {"temperature": 0.2, "thinkingConfig": {"thinkingBudget": 0}}
                    }"#,
                );
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "{\"properties\""}, {"text": ": []}"}]}
                }]
            }));
        });

        let client = GeminiClient::new(&config(server.base_url()), Some("test-key".into())).unwrap();
        let text = client.generate(&prompt()).await.unwrap();

        api_mock.assert();
        assert_eq!(text, r#"{"properties": []}"#);
    }

    #[tokio::test]
    async fn test_generate_without_candidates_is_empty_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200)
                .json_body(json!({"promptFeedback": {"blockReason": "OTHER"}}));
        });

        let client = GeminiClient::new(&config(server.base_url()), Some("k".into())).unwrap();
        assert_eq!(client.generate(&prompt()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_generate_maps_error_status_to_fetch_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST);
            then.status(503).body("overloaded");
        });

        let client = GeminiClient::new(&config(server.base_url()), Some("k".into())).unwrap();
        let err = client.generate(&prompt()).await.unwrap_err();

        api_mock.assert();
        assert!(matches!(err, GemsError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let client = GeminiClient::new(&GeminiConfig::default(), Some("  ".into())).unwrap();
        assert!(!client.has_credential());

        let err = client.generate(&prompt()).await.unwrap_err();
        assert!(matches!(err, GemsError::Configuration { .. }));
    }
}
