use crate::{domain::CaptionModel, errors::UpstreamError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Model used for caption generation.
const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Client for the Gemini `generateContent` REST API, reduced to plain
/// prompt-in/text-out.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

// --- Wire types ---

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
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

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate, the same
    /// reduction the official SDK's `response.text()` performs.
    fn into_text(self) -> Result<String, UpstreamError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Api("Text model returned no candidates".to_string()))?;
        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();
        Ok(text)
    }
}

/// Error envelope the API wraps non-2xx responses in.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait]
impl CaptionModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, GEMINI_MODEL
        );
        debug!(model = GEMINI_MODEL, "Gemini: requesting completion");

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            // Prefer the structured message when the body is the usual envelope
            let message = serde_json::from_str::<ApiErrorEnvelope>(&raw)
                .map(|envelope| envelope.error.message)
                .unwrap_or(raw);
            return Err(UpstreamError::Api(format!(
                "Text model returned status {status}: {message}"
            )));
        }

        let envelope: GenerateContentResponse = response.json().await?;
        let text = envelope.into_text()?;

        debug!(response_len = text.len(), "Gemini: completion received");
        Ok(text)
    }
}
