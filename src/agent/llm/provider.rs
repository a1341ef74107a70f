//! LLM provider trait definition.

use super::types::{CompletionResponse, Message};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Options for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: Some(500),
            timeout: Duration::from_secs(60),
        }
    }
}

/// How a failed provider call should affect the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credential, quota or rate limit problem. The next provider may be tried.
    Unavailable,
    /// The provider answered but the payload was empty or malformed.
    Protocol,
    /// Anything else.
    Other,
}

/// Message fragments that mark a provider as unavailable rather than broken.
const UNAVAILABLE_SIGNATURES: &[&str] = &[
    "quota",
    "rate limit",
    "authentication",
    "invalid api key",
    "invalid_api_key",
];

/// Classifies a free-form error message.
pub fn classify_error_message(message: &str) -> FailureKind {
    let message = message.to_lowercase();
    if UNAVAILABLE_SIGNATURES.iter().any(|s| message.contains(s)) {
        FailureKind::Unavailable
    } else {
        FailureKind::Other
    }
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No content in {0} response")]
    EmptyResponse(String),
}

impl LlmError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LlmError::RateLimited | LlmError::Unauthorized(_) => FailureKind::Unavailable,
            LlmError::Api { status, .. } if matches!(status, 401 | 403 | 429) => {
                FailureKind::Unavailable
            }
            LlmError::InvalidResponse(_) | LlmError::EmptyResponse(_) => FailureKind::Protocol,
            LlmError::Timeout => FailureKind::Other,
            LlmError::Api { .. } | LlmError::Connection(_) => {
                classify_error_message(&self.to_string())
            }
        }
    }
}

/// Trait for LLM providers.
///
/// Implementations of this trait can connect to different LLM backends
/// (OpenAI-compatible services, Gemini, etc.) while providing a unified interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider's name (e.g., "openai", "gemini").
    fn name(&self) -> &str;

    /// Get the model being used.
    fn model(&self) -> &str;

    /// Whether a usable credential is configured.
    fn has_credentials(&self) -> bool;

    /// Complete a conversation.
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError>;
}

/// Returns true for keys that are set and not left at a template placeholder.
pub fn is_usable_api_key(key: Option<&str>) -> bool {
    match key.map(str::trim) {
        Some(key) => !key.is_empty() && !key.starts_with("your_"),
        None => false,
    }
}
