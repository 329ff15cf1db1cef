//! Style-analysis errors.

use std::time::Duration;

/// Errors raised while requesting or decoding a style profile.
///
/// None of these ever reach the pixel pipeline; callers show them as a
/// display-only condition.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("style service temporarily unavailable (HTTP {status}): {message}")]
    Transient { status: u16, message: String },

    #[error("style service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("style service request failed: {0}")]
    Transport(String),

    #[error("style service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("malformed style profile: {0}")]
    MalformedResponse(String),

    #[error("failed to decode style profile JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing API key: set {0}")]
    MissingCredentials(&'static str),

    #[error("style service still failing after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<StyleError>,
    },
}

impl StyleError {
    /// HTTP statuses worth retrying with backoff.
    pub const RETRYABLE_STATUSES: [u16; 2] = [429, 503];

    /// Map a non-success HTTP status to the matching variant.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if Self::RETRYABLE_STATUSES.contains(&status) {
            Self::Transient { status, message }
        } else {
            Self::Http { status, message }
        }
    }

    /// True for transient service errors and timeouts; everything else
    /// fails immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(StyleError::from_status(503, "overloaded").is_retryable());
        assert!(StyleError::from_status(429, "quota").is_retryable());
        assert!(!StyleError::from_status(400, "bad").is_retryable());
        assert!(!StyleError::from_status(500, "boom").is_retryable());
        assert!(!StyleError::MalformedResponse("x".into()).is_retryable());
        assert!(StyleError::Timeout(Duration::from_secs(5)).is_retryable());
    }

    #[test]
    fn test_exhausted_keeps_last_error() {
        let err = StyleError::RetriesExhausted {
            attempts: 3,
            last: Box::new(StyleError::from_status(503, "overloaded")),
        };
        let text = err.to_string();
        assert!(text.contains("3 attempts"));
        assert!(text.contains("503"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
