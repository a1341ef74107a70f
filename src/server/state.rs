use axum::extract::FromRef;

use crate::analysis::MoodAnalyzer;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedMoodAnalyzer = Arc<MoodAnalyzer>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub analyzer: GuardedMoodAnalyzer,
}

impl ServerState {
    pub fn new(config: ServerConfig, analyzer: GuardedMoodAnalyzer) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            analyzer,
        }
    }
}

impl FromRef<ServerState> for GuardedMoodAnalyzer {
    fn from_ref(input: &ServerState) -> Self {
        input.analyzer.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
