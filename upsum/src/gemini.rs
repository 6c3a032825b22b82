//! # Gemini summarizer (CLI <-> Core)
//!
//! Wires the [`Summarizer`] contract from `upsum-core` to Google's Generative
//! Language REST API. One blocking `generateContent` call per run: no streaming,
//! no retry. Also provides [`GeminiClient::list_models`] for `--list-models`.
//!
//! - Authenticates with the `x-goog-api-key` header; the key never appears in a URL or log.
//! - The HTTP client carries its own timeout, which callers set longer than the pipeline's
//!   bound; a client-side expiry still surfaces as [`SummarizeError::TimedOut`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use upsum_core::contract::Summarizer;
use upsum_core::error::SummarizeError;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SummarizeError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            tracing::error!(error = ?e, "Failed to build HTTP client");
            SummarizeError::Request(e.to_string())
        })?;
        let model = model.into();
        tracing::info!(model = %model, timeout = ?timeout, "Initialized GeminiClient");
        Ok(Self {
            client,
            api_key: api_key.into(),
            model,
            base_url: GEMINI_API_BASE.to_string(),
            timeout,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn generate_url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model_path(&self.model)
        )
    }

    /// Names of models that support `generateContent`, following pagination.
    pub async fn list_models(&self) -> Result<Vec<String>, SummarizeError> {
        let url = format!("{}/models", self.base_url.trim_end_matches('/'));
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .header("x-goog-api-key", &self.api_key);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let response = request.send().await.map_err(|e| {
                tracing::error!(error = ?e, url = %url, "Failed to list Gemini models");
                request_error(e, self.timeout)
            })?;
            let page: ModelList = decode(response, self.timeout).await?;
            names.extend(generate_capable(&page));
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::info!(count = names.len(), "Listed Gemini models");
        Ok(names)
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, SummarizeError> {
        let url = self.generate_url();
        tracing::info!(model = %self.model, prompt_len = prompt.len(), "Calling Gemini generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(prompt))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, url = %url, "Gemini request failed");
                request_error(e, self.timeout)
            })?;

        let body: GenerateContentResponse = decode(response, self.timeout).await?;
        let text = response_text(&body).ok_or_else(|| {
            tracing::error!(?body, "Gemini response carried no text");
            SummarizeError::EmptyResponse
        })?;
        tracing::info!(text_len = text.len(), "Gemini returned report text");
        Ok(text)
    }
}

/// Accept both `gemini-2.5-flash` and `models/gemini-2.5-flash`.
fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

fn request_error(e: reqwest::Error, timeout: Duration) -> SummarizeError {
    if e.is_timeout() {
        SummarizeError::TimedOut(timeout)
    } else {
        SummarizeError::Request(e.to_string())
    }
}

async fn decode<T>(response: reqwest::Response, timeout: Duration) -> Result<T, SummarizeError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| request_error(e, timeout))?;
    if !status.is_success() {
        tracing::error!(status = %status, body = %text, "Gemini API returned error");
        return Err(SummarizeError::Api {
            status: status.as_u16(),
            body: api_error_message(&text),
        });
    }
    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(error = ?e, "Failed to decode Gemini response");
        SummarizeError::Decode(e.to_string())
    })
}

/// Prefer the API's own error message over the raw JSON envelope.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|env| env.error.message)
        .unwrap_or_else(|_| body.to_string())
}

pub(crate) fn build_request(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(prompt.to_string()),
            }],
        }],
    }
}

/// Concatenated text parts of the first candidate; `None` when blank.
pub(crate) fn response_text(response: &GenerateContentResponse) -> Option<String> {
    let candidate = response.candidates.as_ref()?.first()?;
    let text: String = candidate
        .content
        .as_ref()?
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

pub(crate) fn generate_capable(list: &ModelList) -> Vec<String> {
    list.models
        .iter()
        .filter(|m| {
            m.supported_generation_methods
                .iter()
                .any(|method| method == "generateContent")
        })
        .map(|m| m.name.clone())
        .collect()
}

// ============================================================================
// Gemini API Types
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest {
    pub(crate) contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<String>,
    #[serde(default)]
    pub(crate) parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub(crate) content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModelList {
    #[serde(default)]
    pub(crate) models: Vec<ModelInfo>,
    #[serde(default)]
    pub(crate) next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModelInfo {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}
