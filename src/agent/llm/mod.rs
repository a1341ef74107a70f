//! LLM provider abstraction layer.
//!
//! This module provides a trait-based abstraction for LLM providers,
//! allowing mood suggestions to come from different backends (OpenAI, Gemini, etc.).

mod gemini;
mod openai;
mod provider;
mod types;

pub use gemini::{GeminiProvider, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
pub use openai::{ApiKeySource, OpenAIProvider, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
pub use provider::{
    classify_error_message, is_usable_api_key, CompletionOptions, FailureKind, LlmError,
    LlmProvider,
};
pub use types::{CompletionResponse, FinishReason, Message, MessageRole};
