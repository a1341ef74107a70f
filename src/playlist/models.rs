use crate::mood::MoodScoreMap;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Quantitative audio attributes of a track, keyed by attribute name
/// (energy, valence, tempo, acousticness, danceability, loudness, ...).
///
/// Non-numeric entries (ids, uris, analysis urls) are dropped on input.
#[derive(Clone, Default, PartialEq, Serialize, Debug)]
#[serde(transparent)]
pub struct AudioFeatures(BTreeMap<String, f64>);

impl<'de> Deserialize<'de> for AudioFeatures {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawValue {
            Number(f64),
            Other(IgnoredAny),
        }

        let raw = BTreeMap::<String, RawValue>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(name, value)| match value {
                RawValue::Number(n) => Some((name, n)),
                RawValue::Other(_) => None,
            })
            .collect())
    }
}

impl AudioFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for AudioFeatures {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_features: Option<AudioFeatures>,
    /// Filled in by the rule-based analysis, never read from input.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub mood_scores: Option<MoodScoreMap>,
}

impl Track {
    pub fn new(id: impl Into<String>, name: impl Into<String>, artists: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artists,
            album: None,
            duration_ms: None,
            audio_features: None,
            mood_scores: None,
        }
    }

    pub fn with_features(mut self, features: AudioFeatures) -> Self {
        self.audio_features = Some(features);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Audio features usable for scoring. An empty feature map counts as absent.
    pub fn features(&self) -> Option<&AudioFeatures> {
        self.audio_features.as_ref().filter(|f| !f.is_empty())
    }
}

#[derive(Clone, Default, Serialize, Deserialize, Debug)]
pub struct PlaylistInfo {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    /// Track count as reported by the catalog; may exceed the tracks supplied.
    #[serde(default)]
    pub total_tracks: Option<usize>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Playlist {
    pub info: PlaylistInfo,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(info: PlaylistInfo, tracks: Vec<Track>) -> Self {
        Self { info, tracks }
    }

    pub fn total_tracks(&self) -> usize {
        self.info.total_tracks.unwrap_or(self.tracks.len())
    }

    pub fn tracks_with_features(&self) -> usize {
        self.tracks.iter().filter(|t| t.features().is_some()).count()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.tracks.iter().filter_map(|t| t.duration_ms).sum()
    }

    pub fn overview(&self) -> PlaylistOverview {
        let total_duration_ms = self.total_duration_ms();
        PlaylistOverview {
            id: self.info.id.clone(),
            name: self.info.name.clone(),
            description: self.info.description.clone(),
            owner: self.info.owner.clone(),
            total_tracks: self.total_tracks(),
            total_with_features: self.tracks_with_features(),
            total_duration_ms,
            total_duration_formatted: format_duration(total_duration_ms),
        }
    }
}

/// Summary of the analyzed playlist returned alongside the results.
#[derive(Clone, Serialize, Debug)]
pub struct PlaylistOverview {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner: String,
    pub total_tracks: usize,
    pub total_with_features: usize,
    pub total_duration_ms: u64,
    pub total_duration_formatted: String,
}

/// Formats a duration as `m:ss`, or `h:mm:ss` past the hour.
pub fn format_duration(duration_ms: u64) -> String {
    let total_seconds = duration_ms / 1000;

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
