//! Mood category configuration table.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Target specification for one audio attribute of a mood.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFeatureTarget", into = "RawFeatureTarget")]
pub enum FeatureTarget {
    /// Closed numeric range `[min, max]`.
    Range { min: f64, max: f64 },
    /// Exact categorical value, e.g. `mode = 0` for minor keys.
    Exact(f64),
}

impl FeatureTarget {
    pub fn range(min: f64, max: f64) -> Self {
        FeatureTarget::Range { min, max }
    }

    fn validate(&self) -> Result<(), String> {
        match *self {
            FeatureTarget::Range { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(format!("range bounds must be finite, got [{}, {}]", min, max));
                }
                if min > max {
                    return Err(format!("range min {} is greater than max {}", min, max));
                }
                Ok(())
            }
            FeatureTarget::Exact(value) if !value.is_finite() => {
                Err(format!("exact value must be finite, got {}", value))
            }
            FeatureTarget::Exact(_) => Ok(()),
        }
    }
}

// Ranges are written as two element arrays, exact values as plain numbers.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum RawFeatureTarget {
    Range([f64; 2]),
    Exact(f64),
}

impl From<RawFeatureTarget> for FeatureTarget {
    fn from(raw: RawFeatureTarget) -> Self {
        match raw {
            RawFeatureTarget::Range([min, max]) => FeatureTarget::Range { min, max },
            RawFeatureTarget::Exact(value) => FeatureTarget::Exact(value),
        }
    }
}

impl From<FeatureTarget> for RawFeatureTarget {
    fn from(target: FeatureTarget) -> Self {
        match target {
            FeatureTarget::Range { min, max } => RawFeatureTarget::Range([min, max]),
            FeatureTarget::Exact(value) => RawFeatureTarget::Exact(value),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoodCategory {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, alias = "audio_features")]
    pub features: BTreeMap<String, FeatureTarget>,
}

impl MoodCategory {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            features: BTreeMap::new(),
        }
    }

    pub fn with_range(mut self, feature: impl Into<String>, min: f64, max: f64) -> Self {
        self.features
            .insert(feature.into(), FeatureTarget::range(min, max));
        self
    }

    pub fn with_exact(mut self, feature: impl Into<String>, value: f64) -> Self {
        self.features
            .insert(feature.into(), FeatureTarget::Exact(value));
        self
    }

    /// The first `n` keywords, in configured order.
    pub fn keyword_excerpt(&self, n: usize) -> Vec<String> {
        self.keywords.iter().take(n).cloned().collect()
    }
}

#[derive(Debug, Error)]
pub enum MoodConfigError {
    #[error("Failed to read mood file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse mood table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Mood table contains no categories")]
    Empty,

    #[error("Mood category with empty name")]
    EmptyName,

    #[error("Duplicate mood category: {0}")]
    DuplicateName(String),

    #[error("Invalid target for {mood}.{feature}: {reason}")]
    InvalidTarget {
        mood: String,
        feature: String,
        reason: String,
    },
}

#[derive(Deserialize)]
struct MoodFile {
    #[serde(rename = "mood", default)]
    moods: Vec<MoodCategory>,
}

/// Ordered, validated set of mood categories.
///
/// Configuration order is significant: it breaks ties when moods are ranked.
#[derive(Clone, Debug)]
pub struct MoodCatalog {
    categories: Vec<MoodCategory>,
}

impl MoodCatalog {
    pub fn new(categories: Vec<MoodCategory>) -> Result<Self, MoodConfigError> {
        if categories.is_empty() {
            return Err(MoodConfigError::Empty);
        }

        let mut seen = HashSet::new();
        for category in &categories {
            if category.name.trim().is_empty() {
                return Err(MoodConfigError::EmptyName);
            }
            if !seen.insert(category.name.as_str()) {
                return Err(MoodConfigError::DuplicateName(category.name.clone()));
            }
            for (feature, target) in &category.features {
                target
                    .validate()
                    .map_err(|reason| MoodConfigError::InvalidTarget {
                        mood: category.name.clone(),
                        feature: feature.clone(),
                        reason,
                    })?;
            }
        }

        Ok(Self { categories })
    }

    /// Parses a TOML table made of `[[mood]]` entries.
    pub fn from_toml_str(content: &str) -> Result<Self, MoodConfigError> {
        let file: MoodFile = toml::from_str(content)?;
        Self::new(file.moods)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, MoodConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| MoodConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// The default six mood table.
    pub fn builtin() -> Self {
        let categories = vec![
            MoodCategory::new(
                "calming",
                &["peaceful", "relaxing", "serene", "tranquil", "soothing"],
            )
            .with_range("energy", 0.0, 0.4)
            .with_range("valence", 0.0, 0.6)
            .with_range("tempo", 60.0, 120.0)
            .with_range("acousticness", 0.3, 1.0),
            MoodCategory::new(
                "euphoric",
                &["uplifting", "joyful", "ecstatic", "blissful", "elated"],
            )
            .with_range("energy", 0.6, 1.0)
            .with_range("valence", 0.7, 1.0)
            .with_range("tempo", 120.0, 200.0)
            .with_range("danceability", 0.5, 1.0),
            MoodCategory::new(
                "introspective",
                &["thoughtful", "contemplative", "reflective", "meditative", "pensive"],
            )
            .with_range("energy", 0.0, 0.5)
            .with_range("valence", 0.0, 0.5)
            .with_range("acousticness", 0.4, 1.0)
            .with_range("instrumentalness", 0.2, 1.0),
            MoodCategory::new(
                "energetic",
                &["dynamic", "vigorous", "powerful", "intense", "driving"],
            )
            .with_range("energy", 0.7, 1.0)
            .with_range("tempo", 130.0, 200.0)
            .with_range("danceability", 0.6, 1.0)
            .with_range("loudness", -8.0, 0.0),
            MoodCategory::new(
                "melancholic",
                &["sad", "sorrowful", "wistful", "nostalgic", "melancholy"],
            )
            .with_range("energy", 0.0, 0.4)
            .with_range("valence", 0.0, 0.3)
            .with_range("tempo", 60.0, 120.0)
            .with_exact("mode", 0.0),
            MoodCategory::new(
                "romantic",
                &["loving", "tender", "passionate", "intimate", "affectionate"],
            )
            .with_range("energy", 0.2, 0.7)
            .with_range("valence", 0.4, 0.8)
            .with_range("acousticness", 0.3, 1.0)
            .with_range("danceability", 0.3, 0.8),
        ];

        Self { categories }
    }

    pub fn get(&self, name: &str) -> Option<&MoodCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MoodCategory> {
        self.categories.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for MoodCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
