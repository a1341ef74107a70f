//! Playlist Mood Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod agent;
pub mod analysis;
pub mod config;
pub mod mood;
pub mod playlist;
pub mod server;
pub mod suggestions;

// Re-export commonly used types for convenience
pub use analysis::{AnalysisError, BatchReport, CombinedResult, MoodAnalyzer};
pub use mood::{MoodCatalog, MoodCategory, RuleBasedAnalysis};
pub use playlist::{AudioFeatures, Playlist, PlaylistInfo, Track};
pub use server::{run_server, RequestsLoggingLevel};
pub use suggestions::{ProviderChain, ProviderPreference, SuggestionSource};
