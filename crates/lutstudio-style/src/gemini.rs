//! Google Gemini `generateContent` backend.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::analyzer::{StyleBackend, StyleRequest};
use crate::error::StyleError;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Upper bound on one HTTP exchange with the service.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// HTTP client for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, StyleError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StyleError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Build from `GEMINI_API_KEY`, using [`DEFAULT_MODEL`].
    pub fn from_env() -> Result<Self, StyleError> {
        let key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(StyleError::MissingCredentials(API_KEY_ENV))?;
        Self::new(key, DEFAULT_MODEL)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn body(request: &StyleRequest, prompt: &str) -> serde_json::Value {
        json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": request.mime_type, "data": request.image_base64 } },
                    { "text": prompt }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "styleName": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "palette": { "type": "ARRAY", "items": { "type": "STRING" } }
                    },
                    "required": ["styleName", "description", "palette"]
                }
            }
        })
    }
}

impl StyleBackend for GeminiBackend {
    async fn generate(&self, request: &StyleRequest, prompt: &str) -> Result<String, StyleError> {
        let url = format!("{ENDPOINT}/{}:generateContent", self.model);
        tracing::debug!(model = %self.model, "requesting style profile");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::body(request, prompt))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StyleError::from_status(status.as_u16(), message));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| StyleError::MalformedResponse(e.to_string()))?;

        // An empty reply decodes as `{}` and is rejected as missing a name.
        Ok(body
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .unwrap_or_default())
    }
}

fn transport_error(err: reqwest::Error) -> StyleError {
    if err.is_timeout() {
        StyleError::Timeout(REQUEST_TIMEOUT)
    } else {
        StyleError::Transport(err.to_string())
    }
}
