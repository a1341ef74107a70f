//! Playlist classification: rule-based scoring, AI suggestions and blending.

mod analyzer;
mod combiner;

pub use analyzer::{
    AnalysisError, BatchEntry, BatchItem, BatchReport, CombinedResult, MoodAnalyzer,
    MoodExplanation,
};
pub use combiner::{CombinedRecommendation, Combiner, AI_WEIGHT, MAX_RECOMMENDATIONS, RULE_WEIGHT};
