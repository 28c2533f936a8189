//! Transport — exactly one call to the hosted generation endpoint per `send`.
//!
//! Retrying is the caller's job (see `retry.rs`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm_client::error::GenerationError;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Sampling parameters forwarded to the endpoint with every prompt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub candidate_count: u32,
}

impl GenerationConfig {
    pub const fn new(temperature: f32, top_k: u32, top_p: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            top_k,
            top_p,
            max_output_tokens,
            candidate_count: 1,
        }
    }
}

/// Text returned by a single successful call.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub text: String,
    pub http_status: u16,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        timeout: Duration,
    ) -> Result<RawResponse, GenerationError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: &'a GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

fn default_safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    })
    .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini transport
// ────────────────────────────────────────────────────────────────────────────

/// reqwest-backed transport for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiTransport {
    client: Client,
    api_key: String,
    base_url: String,
    model: &'static str,
}

impl GeminiTransport {
    pub fn new(api_key: String, model: &'static str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
            model,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    async fn send(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        timeout: Duration,
    ) -> Result<RawResponse, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: config,
            safety_settings: default_safety_settings(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(e, timeout))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Generation endpoint returned {}: {}", status, message);
            return Err(classify_status(status, message));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| classify_reqwest_error(e, timeout))?;

        match parsed.text() {
            Some(text) => {
                debug!("Generation endpoint returned {} chars", text.len());
                Ok(RawResponse {
                    text,
                    http_status: status.as_u16(),
                })
            }
            None => {
                let reason = parsed
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .or_else(|| {
                        parsed
                            .candidates
                            .first()
                            .and_then(|c| c.finish_reason.clone())
                    })
                    .unwrap_or_else(|| "no candidates".to_string());
                Err(GenerationError::Malformed(format!(
                    "response carried no candidate text ({reason})"
                )))
            }
        }
    }
}

fn classify_status(status: StatusCode, message: String) -> GenerationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => GenerationError::Transport {
            status: Some(status.as_u16()),
            message,
            retryable: true,
        },
        s if s.is_server_error() => GenerationError::Transport {
            status: Some(s.as_u16()),
            message,
            retryable: true,
        },
        s => GenerationError::Transport {
            status: Some(s.as_u16()),
            message,
            retryable: false,
        },
    }
}

fn classify_reqwest_error(err: reqwest::Error, timeout: Duration) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }
    } else if err.is_decode() {
        GenerationError::Malformed(format!("response body was not valid JSON: {err}"))
    } else {
        GenerationError::network(err.to_string())
    }
}
