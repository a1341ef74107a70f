//! Keyword-counting fallback used when no language model can answer.

use super::{Suggestion, SuggestionError, SuggestionSet, SuggestionSource, MAX_SUGGESTIONS};
use crate::mood::{rank_top, MoodCatalog};
use crate::playlist::Playlist;
use async_trait::async_trait;

pub const OFFLINE_SOURCE_NAME: &str = "offline";

/// Tracks whose names and artists feed the keyword search.
const SAMPLED_TRACKS: usize = 10;

const FALLBACK_MOOD: &str = "ambient";
const FALLBACK_CONFIDENCE: f64 = 0.7;

const MOOD_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "energetic",
        &["pump", "energy", "power", "rock", "metal", "dance", "electronic"],
    ),
    (
        "relaxed",
        &["chill", "relax", "calm", "peaceful", "soft", "acoustic"],
    ),
    (
        "happy",
        &["happy", "joy", "fun", "party", "celebration", "upbeat"],
    ),
    ("melancholic", &["sad", "blue", "melancholy", "sorrow", "lonely"]),
    (
        "ambient",
        &["ambient", "atmospheric", "drone", "soundscape", "space"],
    ),
    ("romantic", &["love", "romantic", "tender", "sweet", "intimate"]),
    (
        "meditative",
        &["meditation", "zen", "spiritual", "therapy", "healing"],
    ),
    (
        "aggressive",
        &["aggressive", "heavy", "intense", "brutal", "hardcore"],
    ),
    ("nostalgic", &["retro", "vintage", "classic", "old", "memories"]),
    (
        "focus",
        &["study", "focus", "concentration", "work", "productivity"],
    ),
    ("party", &["party", "club", "dance", "festival", "celebration"]),
    ("downtempo", &["downtempo", "slow", "laid-back", "lounge"]),
];

/// Deterministic mood guesses from playlist and track text.
///
/// Always available and never fails, so it terminates every provider chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineHeuristic;

impl OfflineHeuristic {
    pub fn new() -> Self {
        Self
    }

    fn searchable_text(playlist: &Playlist) -> String {
        let sample = &playlist.tracks[..playlist.tracks.len().min(SAMPLED_TRACKS)];
        let names: Vec<&str> = sample.iter().map(|t| t.name.as_str()).collect();
        let artists: Vec<String> = sample.iter().map(|t| t.artists.join(" ")).collect();

        format!(
            "{} {} {}",
            playlist.info.name,
            names.join(" "),
            artists.join(" ")
        )
        .to_lowercase()
    }

    /// Produces suggestions without any I/O.
    pub fn analyze(&self, playlist: &Playlist) -> SuggestionSet {
        let text = Self::searchable_text(playlist);

        let counts = MOOD_KEYWORDS.iter().filter_map(|(mood, keywords)| {
            let count = keywords.iter().filter(|k| text.contains(*k)).count();
            (count > 0).then_some((*mood, count as f64))
        });

        let mut suggestions: Vec<Suggestion> = rank_top(counts, MAX_SUGGESTIONS)
            .into_iter()
            .map(|ranked| {
                Suggestion::new(
                    ranked.mood.clone(),
                    (0.6 + 0.1 * ranked.score).min(0.95),
                    format!(
                        "Analysis of track names and playlist context suggests {} characteristics.",
                        ranked.mood
                    ),
                )
            })
            .collect();

        if suggestions.is_empty() {
            suggestions.push(Suggestion::new(
                FALLBACK_MOOD,
                FALLBACK_CONFIDENCE,
                "Default mood suggestion based on general music analysis patterns.",
            ));
        }

        SuggestionSet {
            suggestions,
            overall_assessment: format!(
                "Offline analysis of playlist based on track names and context. {} tracks analyzed.",
                playlist.tracks.len()
            ),
        }
    }
}

#[async_trait]
impl SuggestionSource for OfflineHeuristic {
    fn name(&self) -> &str {
        OFFLINE_SOURCE_NAME
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn suggest(
        &self,
        playlist: &Playlist,
        _moods: &MoodCatalog,
    ) -> Result<SuggestionSet, SuggestionError> {
        Ok(self.analyze(playlist))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::{PlaylistInfo, Track};

    fn playlist(name: &str, tracks: &[(&str, &str)]) -> Playlist {
        Playlist::new(
            PlaylistInfo {
                name: name.to_string(),
                ..Default::default()
            },
            tracks
                .iter()
                .enumerate()
                .map(|(i, (track, artist))| {
                    Track::new(i.to_string(), *track, vec![artist.to_string()])
                })
                .collect(),
        )
    }

    #[test]
    fn counts_keywords_across_names_and_artists() {
        let playlist = playlist(
            "Chill Sunday",
            &[
                ("Soft Rain", "Acoustic Trio"),
                ("Peaceful Morning", "Calm Waters"),
                ("Love Song", "Someone"),
            ],
        );

        let set = OfflineHeuristic::new().analyze(&playlist);
        // relaxed: chill, soft, acoustic, peaceful, calm
        assert_eq!(set.suggestions[0].mood, "relaxed");
        assert_eq!(set.suggestions[0].confidence, 0.95);
        assert_eq!(set.suggestions[1].mood, "romantic");
        assert!((set.suggestions[1].confidence - 0.7).abs() < 1e-9);
        assert_eq!(
            set.suggestions[0].reasoning,
            "Analysis of track names and playlist context suggests relaxed characteristics."
        );
        assert_eq!(
            set.overall_assessment,
            "Offline analysis of playlist based on track names and context. 3 tracks analyzed."
        );
    }

    #[test]
    fn ties_keep_dictionary_order() {
        // "dance" is a keyword of both energetic and party.
        let set = OfflineHeuristic::new().analyze(&playlist("dance", &[]));
        let moods: Vec<&str> = set.suggestions.iter().map(|s| s.mood.as_str()).collect();
        assert_eq!(moods, vec!["energetic", "party"]);
    }

    #[test]
    fn defaults_to_ambient_without_matches() {
        let set = OfflineHeuristic::new().analyze(&playlist("Xyz", &[("Qqq", "Zzz")]));
        assert_eq!(set.suggestions.len(), 1);
        assert_eq!(set.suggestions[0].mood, "ambient");
        assert_eq!(set.suggestions[0].confidence, 0.7);
    }

    #[test]
    fn same_text_gives_same_suggestions() {
        let tracks = [
            ("Dance Floor", "Club Kids"),
            ("Slow Love", "Tender Hearts"),
            ("Old Memories", "Retro Band"),
        ];
        let heuristic = OfflineHeuristic::new();
        let original = playlist("Party Mix", &tracks);

        let first = heuristic.analyze(&original);
        let second = heuristic.analyze(&original);
        let rebuilt = OfflineHeuristic::new().analyze(&playlist("Party Mix", &tracks));

        assert_eq!(first, second);
        assert_eq!(first, rebuilt);
        assert_eq!(first.suggestions.len(), 3);
    }

    #[tokio::test]
    async fn trait_call_matches_direct_analysis() {
        let playlist = playlist("Zen Garden", &[("Healing Tones", "Spiritual")]);
        let heuristic = OfflineHeuristic::new();

        assert!(heuristic.is_available());
        assert_eq!(heuristic.name(), OFFLINE_SOURCE_NAME);
        let set = heuristic
            .suggest(&playlist, &MoodCatalog::builtin())
            .await
            .unwrap();
        assert_eq!(set, heuristic.analyze(&playlist));
        assert_eq!(set.suggestions[0].mood, "meditative");
    }

    #[test]
    fn only_first_ten_tracks_are_read() {
        let mut tracks = vec![("Nothing", "Nobody"); 10];
        tracks.push(("Heavy Metal", "Brutal"));
        let set = OfflineHeuristic::new().analyze(&playlist("Mix", &tracks));
        assert_eq!(set.suggestions[0].mood, "ambient");
        assert!(set.overall_assessment.contains("11 tracks analyzed"));
    }
}
