//! Shared constants for end-to-end tests

/// How long to wait for a spawned server to answer.
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Poll interval while waiting for the server.
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Timeout applied to every test client request.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Name of the fixture playlist with calm audio features.
#[allow(dead_code)]
pub const CALM_PLAYLIST_NAME: &str = "Evening Wind Down";

/// Name of the fixture playlist without any audio features.
#[allow(dead_code)]
pub const PARTY_PLAYLIST_NAME: &str = "Party Club Night";
