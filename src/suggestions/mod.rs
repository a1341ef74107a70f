//! Qualitative mood suggestions.
//!
//! Language-model providers and the offline keyword heuristic share the
//! [`SuggestionSource`] trait. [`ProviderChain`] walks the configured
//! providers in priority order and always ends with the offline heuristic,
//! so asking for suggestions never fails.

mod chain;
mod llm_source;
mod offline;
pub mod prompt;

pub use chain::{
    AttemptResult, ProviderAttempt, ProviderChain, ProviderPreference, ProviderStatus,
    SuggestionOutcome,
};
pub use llm_source::LlmSuggestionSource;
pub use offline::{OfflineHeuristic, OFFLINE_SOURCE_NAME};

use crate::agent::llm::{FailureKind, LlmError};
use crate::mood::MoodCatalog;
use crate::playlist::Playlist;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of suggestions kept from any source.
pub const MAX_SUGGESTIONS: usize = 3;

fn default_confidence() -> f64 {
    0.5
}

/// A single mood suggested for a playlist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub mood: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl Suggestion {
    pub fn new(mood: impl Into<String>, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            mood: mood.into(),
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
        }
    }
}

/// Suggestions plus the source's overall assessment of the playlist.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionSet {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub overall_assessment: String,
}

impl SuggestionSet {
    /// Clamps confidences into `[0, 1]` and keeps at most [`MAX_SUGGESTIONS`].
    pub fn normalized(mut self) -> Self {
        self.suggestions.truncate(MAX_SUGGESTIONS);
        for suggestion in &mut self.suggestions {
            suggestion.confidence = if suggestion.confidence.is_finite() {
                suggestion.confidence.clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
        self
    }

    /// The first suggestion for `mood`, if any.
    pub fn find(&self, mood: &str) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| s.mood == mood)
    }
}

/// A failed suggestion request, classified for the fallback chain.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SuggestionError {
    pub kind: FailureKind,
    pub message: String,
}

impl SuggestionError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Protocol, message)
    }
}

impl From<LlmError> for SuggestionError {
    fn from(err: LlmError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Anything that can suggest moods for a playlist.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Name used in preferences and traces (e.g., "openai", "gemini").
    fn name(&self) -> &str;

    /// Whether the source can be used at all. Sampled once at startup.
    fn is_available(&self) -> bool;

    async fn suggest(
        &self,
        playlist: &Playlist,
        moods: &MoodCatalog,
    ) -> Result<SuggestionSet, SuggestionError>;
}
