//! Rule-based mood scoring of audio features.

use super::catalog::{FeatureTarget, MoodCatalog};
use crate::playlist::{AudioFeatures, Playlist};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Number of moods kept when ranking.
pub const TOP_MOODS: usize = 3;

pub const NO_FEATURE_DATA_MESSAGE: &str = "no tracks with audio features";

/// Scores how well `value` fits `target`, in `[0.0, 1.0]`.
///
/// Outside a range the score decays linearly with the distance to the nearer
/// bound, in the attribute's own units: a tempo 1 BPM outside its range still
/// scores 0.0 while a valence 0.5 outside scores 0.5.
pub fn feature_score(value: f64, target: &FeatureTarget) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    match *target {
        FeatureTarget::Range { min, max } => {
            if min <= value && value <= max {
                1.0
            } else {
                let distance = (value - min).abs().min((value - max).abs());
                (1.0 - distance).max(0.0)
            }
        }
        FeatureTarget::Exact(expected) => {
            if value == expected {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Mood name to score mapping, kept in configuration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoodScoreMap(Vec<(String, f64)>);

impl MoodScoreMap {
    pub fn get(&self, mood: &str) -> Option<f64> {
        self.0.iter().find(|(m, _)| m == mood).map(|(_, s)| *s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(m, s)| (m.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, mood: &str, score: f64) {
        self.0.push((mood.to_string(), score.clamp(0.0, 1.0)));
    }
}

impl Serialize for MoodScoreMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (mood, score) in &self.0 {
            map.serialize_entry(mood, score)?;
        }
        map.end()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedMood {
    pub mood: String,
    pub score: f64,
}

/// Sorts descending by score and keeps the first `n`.
///
/// The sort is stable, so equal scores keep their input order.
pub(crate) fn rank_top<'a, I>(entries: I, n: usize) -> Vec<RankedMood>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut ranked: Vec<RankedMood> = entries
        .into_iter()
        .map(|(mood, score)| RankedMood {
            mood: mood.to_string(),
            score,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(n);
    ranked
}

/// Playlist-level averages over the tracks that carried audio features.
#[derive(Clone, Debug, Serialize)]
pub struct PlaylistMoodSummary {
    pub mood_averages: MoodScoreMap,
    pub top_moods: Vec<RankedMood>,
    pub total_tracks_analyzed: usize,
}

/// Outcome of the rule-based pass over a playlist.
#[derive(Clone, Debug)]
pub enum RuleBasedAnalysis {
    Scored(PlaylistMoodSummary),
    /// No track had audio features; downstream blending switches to AI only.
    NoFeatureData,
}

impl RuleBasedAnalysis {
    pub fn summary(&self) -> Option<&PlaylistMoodSummary> {
        match self {
            RuleBasedAnalysis::Scored(summary) => Some(summary),
            RuleBasedAnalysis::NoFeatureData => None,
        }
    }

    /// Top moods when the analysis produced any.
    pub fn top_moods(&self) -> Option<&[RankedMood]> {
        self.summary()
            .map(|s| s.top_moods.as_slice())
            .filter(|top| !top.is_empty())
    }
}

impl Serialize for RuleBasedAnalysis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RuleBasedAnalysis::Scored(summary) => summary.serialize(serializer),
            RuleBasedAnalysis::NoFeatureData => {
                let mut state = serializer.serialize_struct("NoFeatureData", 1)?;
                state.serialize_field("error", NO_FEATURE_DATA_MESSAGE)?;
                state.end()
            }
        }
    }
}

/// Scores tracks and playlists against the configured mood table.
#[derive(Clone, Debug)]
pub struct MoodScorer {
    catalog: Arc<MoodCatalog>,
}

impl MoodScorer {
    pub fn new(catalog: Arc<MoodCatalog>) -> Self {
        Self { catalog }
    }

    /// Scores one track against every configured mood.
    ///
    /// A mood for which the track has none of the declared attributes scores 0.0.
    pub fn score_track(&self, features: &AudioFeatures) -> MoodScoreMap {
        let mut scores = MoodScoreMap::default();
        for category in self.catalog.iter() {
            let (sum, count) = category
                .features
                .iter()
                .filter_map(|(name, target)| features.get(name).map(|v| feature_score(v, target)))
                .fold((0.0, 0usize), |(sum, count), score| (sum + score, count + 1));

            let score = if count > 0 { sum / count as f64 } else { 0.0 };
            scores.push(&category.name, score);
        }
        scores
    }

    /// Scores every track carrying audio features, stores each track's map on
    /// the track and averages per mood over the scored tracks only.
    pub fn aggregate(&self, playlist: &mut Playlist) -> RuleBasedAnalysis {
        let mut track_scores = Vec::new();
        for track in playlist.tracks.iter_mut() {
            let Some(features) = track.features() else {
                continue;
            };
            let scores = self.score_track(features);
            track.mood_scores = Some(scores.clone());
            track_scores.push(scores);
        }

        if track_scores.is_empty() {
            debug!(playlist = %playlist.info.name, "No tracks with audio features");
            return RuleBasedAnalysis::NoFeatureData;
        }

        let analyzed = track_scores.len();
        let mut mood_averages = MoodScoreMap::default();
        for category in self.catalog.iter() {
            let sum: f64 = track_scores
                .iter()
                .map(|scores| scores.get(&category.name).unwrap_or(0.0))
                .sum();
            mood_averages.push(&category.name, sum / analyzed as f64);
        }

        let top_moods = rank_top(mood_averages.iter(), TOP_MOODS);

        debug!(
            playlist = %playlist.info.name,
            analyzed,
            top = ?top_moods.first().map(|m| &m.mood),
            "Rule-based mood analysis complete"
        );

        RuleBasedAnalysis::Scored(PlaylistMoodSummary {
            mood_averages,
            top_moods,
            total_tracks_analyzed: analyzed,
        })
    }
}
