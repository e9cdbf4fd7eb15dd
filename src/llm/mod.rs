//! HTTP client for an Ollama-compatible text-generation endpoint.
//!
//! Two operations: `GET /api/tags` for the one-time availability probe at
//! startup, and `POST /api/generate` (non-streaming) for completions. The
//! probe never fails — classification calls do their own error handling.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::GenerativeError;

/// Default request timeout for generate calls.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Timeout for the startup availability probe.
const PROBE_TIMEOUT_SECS: u64 = 5;

/// Client for a local text-generation server.
///
/// Stateless beyond the pooled HTTP connection; safe to share across
/// threads behind an `Arc`.
#[derive(Debug)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    http: Client,
    timeout: Duration,
}

/// Decoding options sent with each generate call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_p: f32,
    /// Maximum number of tokens to generate.
    pub num_predict: u32,
}

impl OllamaClient {
    /// Create a client with the default timeout.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, GenerativeError> {
        Self::with_timeout(base_url, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerativeError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerativeError::ClientBuild(e.to_string()))?;

        let base_url: String = base_url.into();

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            http,
            timeout,
        })
    }

    /// Configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Endpoint base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the endpoint's model listing.
    ///
    /// Logs a warning when the server is unreachable or the configured model
    /// is not among the available models. Never fails: the capability check
    /// is informational only.
    pub async fn probe_model(&self) {
        let url = format!("{}/api/tags", self.base_url);

        let response = match self
            .http
            .get(&url)
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "Generative endpoint unreachable");
                return;
            }
        };

        if !response.status().is_success() {
            warn!(
                url = %url,
                status = %response.status(),
                "Generative endpoint returned an error on model listing"
            );
            return;
        }

        let available: Vec<String> = match response.json::<TagsResponse>().await {
            Ok(tags) => tags.models.into_iter().map(|m| m.name).collect(),
            Err(e) => {
                warn!(url = %url, error = %e, "Could not parse model listing");
                return;
            }
        };

        if available.iter().any(|name| name.contains(&self.model)) {
            info!(model = %self.model, "Generative endpoint reachable, model available");
        } else {
            warn!(
                model = %self.model,
                available = ?available,
                "Configured model not found on generative endpoint"
            );
        }
    }

    /// Send a prompt to the generate API and return the raw completion text.
    pub async fn generate(
        &self,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<String, GenerativeError> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options,
        };

        debug!(
            model = %self.model,
            prompt_length = prompt.len(),
            "Sending generate request"
        );

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerativeError::Timeout {
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    GenerativeError::RequestFailed {
                        url: url.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            if status == 404 && body.contains("model") {
                return Err(GenerativeError::Api {
                    status,
                    body: format!(
                        "model '{}' not found — pull it with: ollama pull {}",
                        self.model, self.model
                    ),
                });
            }

            return Err(GenerativeError::Api { status, body });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerativeError::InvalidResponse(e.to_string()))?;

        if parsed.done == Some(false) {
            warn!(model = %self.model, "Generation reported incomplete");
        }

        Ok(parsed.response)
    }
}

/// Request body for the generate API.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Response body from the generate API (fields we consume).
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    done: Option<bool>,
}

/// Response body from the model-listing API.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3.1:8b").unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.model(), "llama3.1:8b");
    }

    #[test]
    fn generate_request_serializes_nested_options() {
        let request = GenerateRequest {
            model: "llama3.1:8b",
            prompt: "classify this",
            stream: false,
            options: GenerateOptions {
                temperature: 0.1,
                top_p: 0.9,
                num_predict: 20,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.1:8b");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["top_p"], 0.9);
        assert_eq!(json["options"]["num_predict"], 20);
    }

    #[test]
    fn generate_response_deserializes_minimal_body() {
        let json = r#"{"model":"llama3.1:8b","response":"Workflow Error","done":true}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.response, "Workflow Error");
        assert_eq!(response.done, Some(true));
    }

    #[test]
    fn tags_response_deserializes_model_names() {
        let json = r#"{"models":[{"name":"llama3.1:8b"},{"name":"mistral:latest"}]}"#;
        let tags: TagsResponse = serde_json::from_str(json).unwrap();
        let names: Vec<_> = tags.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["llama3.1:8b", "mistral:latest"]);
    }

    #[tokio::test]
    async fn probe_against_unreachable_endpoint_does_not_fail() {
        let client = OllamaClient::with_timeout(
            "http://127.0.0.1:59999",
            "llama3.1:8b",
            Duration::from_millis(200),
        )
        .unwrap();

        // Must complete without panicking — the probe is log-only.
        client.probe_model().await;
    }

    #[tokio::test]
    async fn generate_against_unreachable_endpoint_errors() {
        let client = OllamaClient::with_timeout(
            "http://127.0.0.1:59999",
            "llama3.1:8b",
            Duration::from_millis(200),
        )
        .unwrap();

        let options = GenerateOptions {
            temperature: 0.1,
            top_p: 0.9,
            num_predict: 20,
        };
        let result = client.generate("hello", options).await;
        assert!(matches!(
            result,
            Err(GenerativeError::RequestFailed { .. }) | Err(GenerativeError::Timeout { .. })
        ));
    }
}
