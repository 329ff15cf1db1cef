//! Retrying style analysis on top of a pluggable backend.

use std::future::Future;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tokio::task::JoinHandle;

use crate::error::StyleError;
use crate::profile::{PROMPT, StyleProfile, parse_profile};
use crate::retry::RetryPolicy;

/// An encoded reference image ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRequest {
    /// Base64 image payload, without any data-URL prefix.
    pub image_base64: String,
    pub mime_type: String,
}

impl StyleRequest {
    /// Encode raw image file bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            image_base64: STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Accept a `data:<mime>;base64,<payload>` URL or a bare payload.
    ///
    /// A bare payload is assumed to be JPEG.
    pub fn from_data_url(url: &str) -> Self {
        match url.split_once(',') {
            Some((header, payload)) => {
                let mime = header
                    .strip_prefix("data:")
                    .and_then(|h| h.split(';').next())
                    .filter(|m| !m.is_empty())
                    .unwrap_or("image/jpeg");
                Self {
                    image_base64: payload.to_string(),
                    mime_type: mime.to_string(),
                }
            }
            None => Self {
                image_base64: url.to_string(),
                mime_type: "image/jpeg".to_string(),
            },
        }
    }
}

/// A service that turns an image and a prompt into raw profile JSON.
pub trait StyleBackend: Send + Sync {
    fn generate(
        &self,
        request: &StyleRequest,
        prompt: &str,
    ) -> impl Future<Output = Result<String, StyleError>> + Send;
}

/// Requests a style profile, retrying transient failures with backoff.
#[derive(Debug, Clone)]
pub struct StyleAnalyzer<B> {
    backend: B,
    policy: RetryPolicy,
}

impl<B: StyleBackend> StyleAnalyzer<B> {
    pub fn new(backend: B) -> Self {
        Self::with_policy(backend, RetryPolicy::default())
    }

    pub fn with_policy(backend: B, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Request and normalize a profile.
    ///
    /// Transient errors and attempts that outlive `attempt_timeout` are
    /// retried up to `max_attempts` in total, sleeping `base × 2ⁿ` between
    /// attempts. Any other error is returned at once.
    /// Exhausting the attempts returns [`StyleError::RetriesExhausted`].
    pub async fn analyze(&self, request: &StyleRequest) -> Result<StyleProfile, StyleError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            let limit = self.policy.attempt_timeout();
            let outcome = tokio::time::timeout(limit, self.attempt(request))
                .await
                .unwrap_or_else(|_| Err(StyleError::Timeout(limit)));
            let err = match outcome {
                Ok(profile) => {
                    tracing::info!(style = %profile.style_name, attempt = attempt + 1, "style profile ready");
                    return Ok(profile);
                }
                Err(err) => err,
            };
            attempt += 1;
            tracing::warn!(attempt, error = %err, "style analysis attempt failed");

            if !err.is_retryable() {
                return Err(err);
            }
            if attempt >= attempts {
                return Err(StyleError::RetriesExhausted {
                    attempts,
                    last: Box::new(err),
                });
            }
            tokio::time::sleep(self.policy.delay_for(attempt - 1)).await;
        }
    }

    async fn attempt(&self, request: &StyleRequest) -> Result<StyleProfile, StyleError> {
        let raw = self.backend.generate(request, PROMPT).await?;
        parse_profile(&raw)
    }
}

/// Run an analysis in the background on the current tokio runtime.
///
/// The pixel pipeline never awaits this; callers merge the result into UI
/// state whenever it arrives.
pub fn spawn_analysis<B>(
    analyzer: Arc<StyleAnalyzer<B>>,
    request: StyleRequest,
) -> JoinHandle<Result<StyleProfile, StyleError>>
where
    B: StyleBackend + 'static,
{
    tokio::spawn(async move { analyzer.analyze(&request).await })
}
