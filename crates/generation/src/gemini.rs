//! Google Gemini client implementation.
//!
//! Talks to the Generative Language REST API directly:
//! - `models/{model}:generateContent` for answer generation
//! - `models/{model}:embedContent` for embeddings
//!
//! Authentication uses the `x-goog-api-key` header.

use async_trait::async_trait;
use lexrag_core::error::GenerationError;
use lexrag_core::generation::GenerationClient;
use serde::Deserialize;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Gemini REST API client.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    embedding_model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client with the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the generation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the embedding model.
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    fn check_api_key(&self) -> Result<(), GenerationError> {
        if self.api_key.trim().is_empty() {
            return Err(GenerationError::NotConfigured(
                "GEMINI_API_KEY is not set".into(),
            ));
        }
        Ok(())
    }

    /// Pull the answer text out of a generateContent response.
    fn extract_text(resp: GenerateContentResponse) -> Result<String, GenerationError> {
        let candidate = resp.candidates.into_iter().next().ok_or_else(|| {
            GenerationError::InvalidResponse("Gemini returned no candidates".into())
        })?;

        let content = candidate.content.ok_or_else(|| {
            GenerationError::InvalidResponse(format!(
                "Gemini candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })?;

        // Multi-part candidates are concatenated without a separator
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() {
            return Err(GenerationError::InvalidResponse(
                "Gemini candidate contained no text".into(),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_response(&self, prompt: &str) -> Result<String, GenerationError> {
        self.check_api_key()?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{"parts": [{"text": prompt}]}],
        });

        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Sending generation request");
        let started = std::time::Instant::now();

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(format!("Gemini request timed out: {e}"))
                } else {
                    GenerationError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(GenerationError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(GenerationError::AuthenticationFailed(
                "Invalid Gemini API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini API error");
            return Err(GenerationError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: GenerateContentResponse = response.json().await.map_err(|e| {
            GenerationError::InvalidResponse(format!("Failed to parse Gemini response: {e}"))
        })?;

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generation response received"
        );
        Self::extract_text(api_resp)
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, GenerationError> {
        self.check_api_key()?;

        let url = format!(
            "{}/v1beta/models/{}:embedContent",
            self.base_url, self.embedding_model
        );
        let body = serde_json::json!({
            "model": format!("models/{}", self.embedding_model),
            "content": {"parts": [{"text": text}]},
        });

        debug!(model = %self.embedding_model, "Sending embedding request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(format!("Gemini request timed out: {e}"))
                } else {
                    GenerationError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(GenerationError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(GenerationError::AuthenticationFailed(
                "Invalid Gemini API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini API error");
            return Err(GenerationError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: EmbedContentResponse = response.json().await.map_err(|e| {
            GenerationError::InvalidResponse(format!("Failed to parse embedding response: {e}"))
        })?;

        Ok(api_resp.embedding.values)
    }
}

// --- Gemini API types ---

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_defaults() {
        let client = GeminiClient::new("test-key");
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.embedding_model, DEFAULT_EMBEDDING_MODEL);
    }

    #[test]
    fn constructor_overrides() {
        let client = GeminiClient::new("test-key")
            .with_base_url("https://proxy.example.com/")
            .with_model("gemini-2.0-flash")
            .with_embedding_model("text-embedding-005");
        assert_eq!(client.base_url, "https://proxy.example.com");
        assert_eq!(client.model(), "gemini-2.0-flash");
        assert_eq!(client.embedding_model, "text-embedding-005");
    }

    #[test]
    fn parse_text_response() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "parts": [{"text": "Article 634 defines theft as..."}],
                        "role": "model"
                    },
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 45}
            }"#,
        )
        .unwrap();

        let text = GeminiClient::extract_text(resp).unwrap();
        assert_eq!(text, "Article 634 defines theft as...");
    }

    #[test]
    fn multi_part_text_is_concatenated() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "parts": [{"text": "Part one. "}, {"text": "Part two."}]
                    }
                }]
            }"#,
        )
        .unwrap();

        let text = GeminiClient::extract_text(resp).unwrap();
        assert_eq!(text, "Part one. Part two.");
    }

    #[test]
    fn empty_candidates_is_invalid() {
        let resp: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();

        match GeminiClient::extract_text(resp) {
            Err(GenerationError::InvalidResponse(msg)) => {
                assert!(msg.contains("no candidates"));
            }
            other => panic!("Expected InvalidResponse, got: {other:?}"),
        }
    }

    #[test]
    fn safety_blocked_candidate_is_invalid() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"finishReason": "SAFETY"}]}"#,
        )
        .unwrap();

        match GeminiClient::extract_text(resp) {
            Err(GenerationError::InvalidResponse(msg)) => {
                assert!(msg.contains("SAFETY"));
            }
            other => panic!("Expected InvalidResponse, got: {other:?}"),
        }
    }

    #[test]
    fn parse_embedding_response() {
        let resp: EmbedContentResponse = serde_json::from_str(
            r#"{"embedding": {"values": [0.013, -0.008, 0.044]}}"#,
        )
        .unwrap();
        assert_eq!(resp.embedding.values.len(), 3);
        assert!((resp.embedding.values[0] - 0.013).abs() < 1e-6);
    }

    #[tokio::test]
    async fn missing_api_key_short_circuits() {
        let client = GeminiClient::new("");

        match client.generate_response("What is theft?").await {
            Err(GenerationError::NotConfigured(msg)) => {
                assert!(msg.contains("GEMINI_API_KEY"));
            }
            other => panic!("Expected NotConfigured, got: {other:?}"),
        }

        match client.generate_embedding("theft").await {
            Err(GenerationError::NotConfigured(_)) => {}
            other => panic!("Expected NotConfigured, got: {other:?}"),
        }
    }
}
