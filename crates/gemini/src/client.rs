//! Gemini `generateContent` client.

use async_trait::async_trait;
use deck_core::GatewayConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::GatewayError;
use crate::retry::RetryPolicy;
use crate::{GenerationRequest, TextGenerator};

/// Longest error body kept in an [`GatewayError::Upstream`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GeminiRequest<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            system_instruction: request.system_instruction.as_deref().map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            }),
        }
    }
}

#[derive(Deserialize, Default)]
struct GeminiResponse {
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

impl GeminiResponse {
    /// First candidate's first text part, or an empty string.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default()
    }
}

/// Client for a Gemini model.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl GeminiClient {
    /// Create a client. Fails when the API key is empty.
    pub fn new(api_key: impl Into<String>, config: &GatewayConfig) -> Result<Self, GatewayError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GatewayError::Config("API key is empty".into()));
        }

        let http = Client::builder()
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            timeout: Duration::from_secs(config.timeout_secs),
            retry: RetryPolicy::from_config(config),
        })
    }

    /// Override the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The full `generateContent` URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One attempt, bounded by the timeout.
    async fn attempt(&self, body: &GeminiRequest<'_>) -> Result<String, GatewayError> {
        let call = async {
            let response = self
                .http
                .post(&self.endpoint)
                .header("x-goog-api-key", &self.api_key)
                .json(body)
                .send()
                .await?;

            let status = response.status();
            let raw = response.text().await?;
            Ok::<_, GatewayError>((status, raw))
        };

        let (status, raw) = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))??;

        if !status.is_success() {
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body: truncate(&raw, MAX_ERROR_BODY),
            });
        }

        let parsed: GeminiResponse = serde_json::from_str(&raw)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        let text = parsed.into_text();
        if text.is_empty() {
            log::warn!("AI response contained no text parts");
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        let body = GeminiRequest::from_request(request);
        log::debug!("Calling {} ({} prompt bytes)", self.endpoint, request.prompt.len());
        self.retry.run(|| self.attempt(&body)).await
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &s[..cut])
}
