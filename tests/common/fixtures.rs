//! Playlist payloads used across end-to-end tests.
#![allow(dead_code)]

use super::constants::*;
use serde_json::{json, Value};

/// Two calm tracks with audio features plus one without.
pub fn calm_playlist() -> Value {
    json!({
        "info": {
            "id": "calm-1",
            "name": CALM_PLAYLIST_NAME,
            "description": "Quiet music before bed",
            "owner": "tester"
        },
        "tracks": [
            {
                "id": "t1",
                "name": "Still Water",
                "artists": ["Harbor"],
                "duration_ms": 200000,
                "audio_features": {
                    "energy": 0.2,
                    "valence": 0.3,
                    "tempo": 80.0,
                    "acousticness": 0.9,
                    "mode": 1
                }
            },
            {
                "id": "t2",
                "name": "Paper Lanterns",
                "artists": ["Harbor", "Guest"],
                "duration_ms": 180000,
                "audio_features": {
                    "energy": 0.3,
                    "valence": 0.4,
                    "tempo": 90.0,
                    "acousticness": 0.8,
                    "mode": 1
                }
            },
            {
                "id": "t3",
                "name": "Interlude",
                "artists": ["Harbor"],
                "duration_ms": 60000
            }
        ]
    })
}

/// Tracks without audio features; only names carry mood hints.
pub fn party_playlist() -> Value {
    json!({
        "info": {"id": "party-1", "name": PARTY_PLAYLIST_NAME},
        "tracks": [
            {"id": "p1", "name": "Festival Anthem", "artists": ["DJ Loud"]},
            {"id": "p2", "name": "Dance Floor", "artists": ["Club Kids"]}
        ]
    })
}

pub fn empty_playlist() -> Value {
    json!({
        "info": {"id": "empty-1", "name": "Nothing Here"},
        "tracks": []
    })
}
