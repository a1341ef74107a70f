//! Prompt construction and reply parsing for language-model suggestions.

use super::{SuggestionError, SuggestionSet};
use crate::mood::MoodCatalog;
use crate::playlist::Playlist;
use std::fmt::Write;

/// Tracks listed when none of the leading tracks carry audio features.
const SAMPLE_WITHOUT_FEATURES: usize = 10;
/// Tracks listed when audio features are available.
const SAMPLE_WITH_FEATURES: usize = 5;

pub const SYSTEM_PROMPT: &str =
    "You are a music curator who classifies playlists into mood categories. \
     You always answer with a single JSON object and nothing else.";

/// Builds the context block describing the playlist.
pub fn build_context(playlist: &Playlist, moods: &MoodCatalog) -> String {
    let info = &playlist.info;
    let description = if info.description.trim().is_empty() {
        "No description"
    } else {
        info.description.as_str()
    };

    let mut context = String::new();
    let _ = writeln!(context, "Playlist: {}", info.name);
    let _ = writeln!(context, "Description: {}", description);
    let _ = writeln!(context, "Total Tracks: {}", playlist.total_tracks());
    context.push_str("\nSample tracks:");

    let has_features = |n: usize| playlist.tracks.iter().take(n).any(|t| t.features().is_some());

    let sample_count = if has_features(SAMPLE_WITHOUT_FEATURES) {
        SAMPLE_WITH_FEATURES
    } else {
        SAMPLE_WITHOUT_FEATURES
    };

    for (i, track) in playlist.tracks.iter().take(sample_count).enumerate() {
        let _ = write!(
            context,
            "\n{}. {} by {}",
            i + 1,
            track.name,
            track.artists.join(", ")
        );
        if let Some(features) = track.features() {
            let _ = write!(
                context,
                " (Energy: {:.2}, Valence: {:.2})",
                features.get("energy").unwrap_or(0.0),
                features.get("valence").unwrap_or(0.0)
            );
        }
    }

    if !has_features(SAMPLE_WITH_FEATURES) {
        context.push_str(
            "\n\nNote: Audio features not available, analyzing based on track names, \
             artists, and playlist context.",
        );
    }

    let _ = write!(context, "\n\nAvailable moods: {}", moods.names().join(", "));
    context
}

/// Builds the full instruction sent to a provider.
pub fn build_prompt(playlist: &Playlist, moods: &MoodCatalog) -> String {
    let mood_list = moods.names().join(", ");
    format!(
        r#"Based on this playlist, suggest the top 3 most appropriate moods from the available options and explain why.

{context}

Available moods: {mood_list}

Rules:
- Only suggest moods from the available list
- Provide confidence between 0.0 and 1.0
- Give clear reasoning for each suggestion

Respond in JSON format:
{{
    "suggestions": [
        {{
            "mood": "mood_name",
            "confidence": 0.85,
            "reasoning": "explanation"
        }}
    ],
    "overall_assessment": "brief description"
}}"#,
        context = build_context(playlist, moods),
        mood_list = mood_list,
    )
}

/// Removes a surrounding markdown code fence, if present.
pub fn strip_code_fence(content: &str) -> &str {
    let mut content = content.trim();
    if let Some(rest) = content.strip_prefix("```json") {
        content = rest;
    } else if let Some(rest) = content.strip_prefix("```") {
        content = rest;
    }
    if let Some(rest) = content.strip_suffix("```") {
        content = rest;
    }
    content.trim()
}

/// Parses a provider reply into suggestions.
pub fn parse_reply(content: &str) -> Result<SuggestionSet, SuggestionError> {
    let body = strip_code_fence(content);
    if body.is_empty() {
        return Err(SuggestionError::protocol("Empty response content"));
    }
    let set: SuggestionSet = serde_json::from_str(body)
        .map_err(|e| SuggestionError::protocol(format!("Malformed suggestion payload: {}", e)))?;
    Ok(set.normalized())
}
