//! Agent infrastructure for LLM-backed features.
//!
//! Currently this is the LLM provider abstraction used to ask language models
//! for mood suggestions.

pub mod llm;

pub use llm::{
    CompletionOptions, CompletionResponse, FailureKind, GeminiProvider, LlmError, LlmProvider,
    Message, MessageRole, OpenAIProvider,
};
