//! Generative Language API client (`models/{model}:generateContent`)

use denidom_common::config::AiConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("DeniDom/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum AiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Response contained no text")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
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

pub struct AiClient {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl AiClient {
    pub fn new(endpoint: &str, model: &str, api_key: &str, timeout: Duration) -> Result<Self, AiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// `None` when no API key is configured
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>, AiError> {
        match config.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => Self::new(
                &config.endpoint,
                &config.model,
                key,
                Duration::from_secs(config.timeout_secs),
            )
            .map(Some),
            None => Ok(None),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one prompt and return the text of the first candidate
    pub async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                response_mime_type: "application/json",
            },
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Sending generateContent request");

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AiError::ApiError(status.as_u16(), error_text));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }
}
