//! LLM-specific error types
//!
//! All of these are "soft" from the request's point of view: they trigger the
//! next analysis strategy in the fallback chain rather than failing the scan.

use std::fmt;

/// LLM operation error
#[derive(Debug, Clone)]
pub enum LlmError {
    /// Authentication failed (invalid API key, expired token, etc.)
    Authentication(String),

    /// Rate limited by the provider
    RateLimited(String),

    /// Network/connection error
    Network(String),

    /// Request timed out
    Timeout,

    /// Service temporarily unavailable (5xx)
    ServiceUnavailable(String),

    /// Provider returned a reply that could not be reduced to the expected
    /// JSON shape
    InvalidResponse(String),

    /// Configuration error (missing credential, bad model id)
    Configuration(String),

    /// Generic/unknown error
    Other(String),
}

impl LlmError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            LlmError::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            LlmError::Network(msg) => write!(f, "Network error: {}", msg),
            LlmError::Timeout => write!(f, "Request timed out"),
            LlmError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            LlmError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            LlmError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            LlmError::Other(msg) => write!(f, "LLM error: {}", msg),
        }
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::Network(format!("Connection failed: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::InvalidResponse(format!("JSON parse error: {}", err))
    }
}
