//! Generative model client.
//!
//! [`TextModel`] is the seam the generator talks to; [`GeminiModel`] is the
//! production implementation over the Generative Language REST API.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{NewsletterError, Result};

/// Default Generative Language API endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// One completion request: a system instruction plus a single user message.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// A model that turns a request into raw generated text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// Model endpoint and sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Model identifier, e.g. `gemini-1.5-flash`.
    pub model: String,
    /// API base URL without a trailing slash.
    pub api_base: String,
    /// Cap on generated tokens.
    pub max_output_tokens: u32,
    /// Sampling temperature; kept low so the markup stays predictable.
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            max_output_tokens: 1000,
            temperature: 0.1,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
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
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Gemini over REST.
pub struct GeminiModel {
    client: Client,
    api_key: String,
    config: ModelConfig,
}

impl GeminiModel {
    pub fn new(api_key: impl Into<String>, config: ModelConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, api_key: api_key.into(), config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("config", &self.config)
            .finish()
    }
}

#[async_trait]
impl TextModel for GeminiModel {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = GenerateContentRequest {
            system_instruction: Content { role: None, parts: vec![Part { text: &request.system_instruction }] },
            contents: vec![Content { role: Some("user"), parts: vec![Part { text: &request.prompt }] }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_output_tokens,
                temperature: request.temperature,
            },
        };

        tracing::debug!(model = %self.config.model, prompt_chars = request.prompt.len(), "requesting generation");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => match envelope.error.status {
                    Some(code) => format!("{} ({})", envelope.error.message, code),
                    None => envelope.error.message,
                },
                Err(_) => format!("HTTP {}: {}", status, text.trim()),
            };
            return Err(NewsletterError::Model(message));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| NewsletterError::Model(format!("Malformed response: {}", e)))?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| NewsletterError::Model("No candidates returned".to_string()))?;

        let output: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        tracing::debug!(model = %self.config.model, output_chars = output.len(), "generation finished");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_instruction: "You are a newsletter generating AI.".to_string(),
            prompt: "Rust news".to_string(),
            max_output_tokens: 1000,
            temperature: 0.1,
        }
    }

    fn model(server: &MockServer) -> GeminiModel {
        let config = ModelConfig { api_base: server.uri(), ..Default::default() };
        GeminiModel::new("test-key", config).unwrap()
    }

    #[test]
    fn test_model_config_default() {
        let config = ModelConfig::default();
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.max_output_tokens, 1000);
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_debug_redacts_key() {
        let model = GeminiModel::new("secret-key", ModelConfig::default()).unwrap();
        let debug = format!("{:?}", model);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [{ "text": "You are a newsletter generating AI." }] },
                "contents": [{ "role": "user", "parts": [{ "text": "Rust news" }] }],
                "generationConfig": { "maxOutputTokens": 1000 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "*Title* " }, { "text": "**Sub** ***Para***" }] },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = model(&server).generate(&request()).await.unwrap();
        assert_eq!(output, "*Title* **Sub** ***Para***");
    }

    #[tokio::test]
    async fn test_generate_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
            })))
            .mount(&server)
            .await;

        let err = model(&server).generate(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "Model error: API key not valid. (INVALID_ARGUMENT)");
    }

    #[tokio::test]
    async fn test_generate_non_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let err = model(&server).generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn test_generate_no_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = model(&server).generate(&request()).await.unwrap_err();
        assert!(matches!(err, NewsletterError::Model(ref m) if m == "No candidates returned"));
    }
}
