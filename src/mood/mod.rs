//! Mood configuration and rule-based scoring.
//!
//! The mood table is data: each category names the audio attribute ranges
//! it accepts, and scoring walks that table without any per-mood code.

mod catalog;
mod scoring;

pub use catalog::{FeatureTarget, MoodCatalog, MoodCategory, MoodConfigError};
pub use scoring::{
    feature_score, MoodScoreMap, MoodScorer, PlaylistMoodSummary, RankedMood, RuleBasedAnalysis,
    NO_FEATURE_DATA_MESSAGE, TOP_MOODS,
};
pub(crate) use scoring::rank_top;
