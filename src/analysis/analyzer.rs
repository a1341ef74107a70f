use super::combiner::{CombinedRecommendation, Combiner};
use crate::mood::{FeatureTarget, MoodCatalog, MoodCategory, MoodScorer, RuleBasedAnalysis};
use crate::playlist::{Playlist, PlaylistOverview};
use crate::suggestions::{ProviderChain, SuggestionOutcome};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

const DESCRIPTION_KEYWORDS: usize = 3;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Playlist has no tracks")]
    EmptyPlaylist,

    #[error("Mood \"{0}\" not found")]
    MoodNotFound(String),

    #[error("Invalid playlist: {0}")]
    InvalidPlaylist(String),
}

/// Everything produced for one playlist.
#[derive(Clone, Debug, Serialize)]
pub struct CombinedResult {
    pub playlist: PlaylistOverview,
    pub rule_based_analysis: RuleBasedAnalysis,
    pub ai_suggestions: SuggestionOutcome,
    pub final_recommendations: Vec<CombinedRecommendation>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MoodExplanation {
    pub mood: String,
    pub keywords: Vec<String>,
    pub audio_features: BTreeMap<String, FeatureTarget>,
    pub description: String,
}

impl From<&MoodCategory> for MoodExplanation {
    fn from(category: &MoodCategory) -> Self {
        Self {
            mood: category.name.clone(),
            keywords: category.keywords.clone(),
            audio_features: category.features.clone(),
            description: format!(
                "Music characterized by {} qualities",
                category.keyword_excerpt(DESCRIPTION_KEYWORDS).join(", ")
            ),
        }
    }
}

/// One batch input, kept even when it could not be read as a playlist so the
/// failure is reported next to the other results.
#[derive(Debug)]
pub struct BatchEntry {
    pub label: String,
    pub playlist: Result<Playlist, AnalysisError>,
}

impl BatchEntry {
    /// Converts a raw JSON item. `position` is zero-based and names items
    /// that carry no readable playlist name.
    pub fn from_json(value: serde_json::Value, position: usize) -> Self {
        let label = value
            .pointer("/info/name")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("playlist #{}", position + 1));
        let playlist = serde_json::from_value::<Playlist>(value)
            .map_err(|e| AnalysisError::InvalidPlaylist(e.to_string()));
        Self { label, playlist }
    }

    pub fn invalid(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            playlist: Err(AnalysisError::InvalidPlaylist(reason.into())),
        }
    }
}

impl From<Playlist> for BatchEntry {
    fn from(playlist: Playlist) -> Self {
        Self {
            label: playlist.info.name.clone(),
            playlist: Ok(playlist),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchItem {
    pub playlist: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<CombinedResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchReport {
    pub results: Vec<BatchItem>,
    pub total_processed: usize,
    pub successful: usize,
}

/// Entry point tying the rule-based scorer, the provider chain and the
/// combiner together.
pub struct MoodAnalyzer {
    catalog: Arc<MoodCatalog>,
    scorer: MoodScorer,
    chain: ProviderChain,
    combiner: Combiner,
}

impl MoodAnalyzer {
    pub fn new(catalog: Arc<MoodCatalog>, chain: ProviderChain) -> Self {
        Self {
            scorer: MoodScorer::new(catalog.clone()),
            combiner: Combiner::new(catalog.clone()),
            catalog,
            chain,
        }
    }

    pub fn catalog(&self) -> &MoodCatalog {
        &self.catalog
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    /// Classifies a playlist. Provider failures never surface here; the chain
    /// degrades to the offline heuristic instead.
    ///
    /// Each scored track gets its per-mood scores stored on it.
    pub async fn classify(&self, playlist: &mut Playlist) -> CombinedResult {
        let started = Instant::now();
        let rule_based_analysis = self.scorer.aggregate(playlist);
        let ai_suggestions = self.chain.suggest(playlist, &self.catalog).await;
        let final_recommendations = self
            .combiner
            .combine(&rule_based_analysis, &ai_suggestions.set);

        info!(
            playlist = %playlist.info.name,
            tracks = playlist.tracks.len(),
            with_features = playlist.tracks_with_features(),
            source = %ai_suggestions.source,
            top_mood = final_recommendations.first().map(|r| r.mood.as_str()).unwrap_or("-"),
            duration_ms = started.elapsed().as_millis() as u64,
            "Classified playlist"
        );

        CombinedResult {
            playlist: playlist.overview(),
            rule_based_analysis,
            ai_suggestions,
            final_recommendations,
        }
    }

    pub async fn analyze(&self, playlist: &mut Playlist) -> Result<CombinedResult, AnalysisError> {
        if playlist.tracks.is_empty() {
            return Err(AnalysisError::EmptyPlaylist);
        }
        Ok(self.classify(playlist).await)
    }

    /// Analyzes playlists one after another; a failed item, including one that
    /// could not be read, never stops the batch.
    pub async fn analyze_batch<E: Into<BatchEntry>>(&self, entries: Vec<E>) -> BatchReport {
        let mut results = Vec::with_capacity(entries.len());

        for entry in entries {
            let BatchEntry {
                label: name,
                playlist,
            } = entry.into();
            let analysis = match playlist {
                Ok(mut playlist) => self.analyze(&mut playlist).await,
                Err(err) => Err(err),
            };
            let item = match analysis {
                Ok(analysis) => BatchItem {
                    playlist: name,
                    success: true,
                    analysis: Some(analysis),
                    error: None,
                },
                Err(err) => {
                    warn!(playlist = %name, error = %err, "Batch item failed");
                    BatchItem {
                        playlist: name,
                        success: false,
                        analysis: None,
                        error: Some(err.to_string()),
                    }
                }
            };
            results.push(item);
        }

        let successful = results.iter().filter(|r| r.success).count();
        BatchReport {
            total_processed: results.len(),
            successful,
            results,
        }
    }

    pub fn explain_mood(&self, mood: &str) -> Result<MoodExplanation, AnalysisError> {
        self.catalog
            .get(mood)
            .map(MoodExplanation::from)
            .ok_or_else(|| AnalysisError::MoodNotFound(mood.to_string()))
    }

    pub fn list_moods(&self) -> Vec<MoodExplanation> {
        self.catalog.iter().map(MoodExplanation::from).collect()
    }
}
