//! Playlist and track models consumed by the analysis pipeline.

mod models;

pub use models::{format_duration, AudioFeatures, Playlist, PlaylistInfo, PlaylistOverview, Track};
