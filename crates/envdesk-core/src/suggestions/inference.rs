//! HTTP client for a hosted text-generation endpoint.
//!
//! The endpoint accepts `{ inputs, parameters }` and answers with either
//! `[{ "generated_text": ... }]` or `{ "generated_text": ... }`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result, error_from_response, normalize_base_url};

/// Default model endpoint.
pub const DEFAULT_INFERENCE_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-cnn";

/// Default generation budget.
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 500;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// A text-generation backend.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Whether the backend has what it needs to make a request.
    fn is_configured(&self) -> bool {
        true
    }

    /// Generate text for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f64,
    return_full_text: bool,
}

/// Extract `generated_text` from either response shape.
pub fn generated_text(body: &Value) -> Result<String> {
    let text = match body {
        Value::Array(items) => items.first().and_then(|first| first.get("generated_text")),
        Value::Object(_) => body.get("generated_text"),
        _ => None,
    };

    text.and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| Error::invalid_response("unexpected response format from inference API"))
}

/// Client for the inference endpoint.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    client: Client,
    url: String,
    token: Option<String>,
    max_new_tokens: u32,
    temperature: f64,
}

impl InferenceClient {
    /// Create a new client. An empty token counts as missing.
    pub fn new(url: &str, token: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            url: normalize_base_url(url)?,
            token: token.filter(|t| !t.is_empty()).map(String::from),
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Override generation parameters.
    pub fn with_parameters(mut self, max_new_tokens: u32, temperature: f64) -> Self {
        self.max_new_tokens = max_new_tokens;
        self.temperature = temperature;
        self
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl InferenceBackend for InferenceClient {
    fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let token = self
            .token
            .as_deref()
            .ok_or(Error::MissingCredentials("inference token"))?;

        let body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: self.max_new_tokens,
                temperature: self.temperature,
                return_full_text: false,
            },
        };

        debug!(url = %self.url, prompt_len = prompt.len(), "Requesting suggestions");
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: Value = response.json().await?;
        generated_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generated_text_array_shape() {
        let body = json!([{"generated_text": "  [ {\"id\": \"a\"} ]  "}]);
        assert_eq!(generated_text(&body).unwrap(), "[ {\"id\": \"a\"} ]");
    }

    #[test]
    fn test_generated_text_object_shape() {
        let body = json!({"generated_text": "hello"});
        assert_eq!(generated_text(&body).unwrap(), "hello");
    }

    #[test]
    fn test_generated_text_unexpected_shapes() {
        assert!(generated_text(&json!([])).is_err());
        assert!(generated_text(&json!([{"summary_text": "x"}])).is_err());
        assert!(generated_text(&json!({"error": "loading"})).is_err());
        assert!(generated_text(&json!({"generated_text": ""})).is_err());
        assert!(generated_text(&json!("text")).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerationRequest {
            inputs: "prompt",
            parameters: GenerationParameters {
                max_new_tokens: 500,
                temperature: 0.7,
                return_full_text: false,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "inputs": "prompt",
                "parameters": {"max_new_tokens": 500, "temperature": 0.7, "return_full_text": false}
            })
        );
    }

    #[test]
    fn test_missing_token_is_not_configured() {
        let client = InferenceClient::new(DEFAULT_INFERENCE_URL, None).unwrap();
        assert!(!client.is_configured());
        let client = InferenceClient::new(DEFAULT_INFERENCE_URL, Some("")).unwrap();
        assert!(!client.is_configured());
        let client = InferenceClient::new(DEFAULT_INFERENCE_URL, Some("hf_x")).unwrap();
        assert!(client.is_configured());
    }

    #[tokio::test]
    async fn test_missing_token_fails_without_request() {
        let client = InferenceClient::new("http://127.0.0.1:9", None).unwrap();
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, Error::MissingCredentials(_)));
    }
}
