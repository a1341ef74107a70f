//! Ordered fallback across suggestion providers.

use super::{OfflineHeuristic, SuggestionSet, SuggestionSource};
use crate::agent::llm::FailureKind;
use crate::mood::MoodCatalog;
use crate::playlist::Playlist;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Which providers the chain may consult.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderPreference {
    /// Every available provider, in registration order.
    #[default]
    Auto,
    /// Only the named provider.
    Named(String),
}

impl FromStr for ProviderPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" => Err("provider preference cannot be empty".to_string()),
            "auto" => Ok(ProviderPreference::Auto),
            name => Ok(ProviderPreference::Named(name.to_string())),
        }
    }
}

impl fmt::Display for ProviderPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderPreference::Auto => f.write_str("auto"),
            ProviderPreference::Named(name) => f.write_str(name),
        }
    }
}

impl Serialize for ProviderPreference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptResult {
    Ok,
    Unavailable,
    ProtocolError,
    Failed,
}

impl From<FailureKind> for AttemptResult {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Unavailable => AttemptResult::Unavailable,
            FailureKind::Protocol => AttemptResult::ProtocolError,
            FailureKind::Other => AttemptResult::Failed,
        }
    }
}

/// One provider consulted while producing suggestions.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderAttempt {
    pub provider: String,
    pub result: AttemptResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Suggestions plus where they came from.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionOutcome {
    #[serde(flatten)]
    pub set: SuggestionSet,
    pub source: String,
    pub attempts: Vec<ProviderAttempt>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub available: bool,
}

/// Consults providers in priority order and falls back to the offline
/// heuristic. Never fails.
pub struct ProviderChain {
    sources: Vec<Arc<dyn SuggestionSource>>,
    preference: ProviderPreference,
    fallback: Arc<dyn SuggestionSource>,
}

impl ProviderChain {
    pub fn new(preference: ProviderPreference) -> Self {
        Self {
            sources: Vec::new(),
            preference,
            fallback: Arc::new(OfflineHeuristic::new()),
        }
    }

    /// Replaces the terminal source consulted once providers are exhausted.
    pub fn with_fallback(mut self, fallback: Arc<dyn SuggestionSource>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Registers a source after the ones already registered.
    pub fn with_source(mut self, source: Arc<dyn SuggestionSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn preference(&self) -> &ProviderPreference {
        &self.preference
    }

    pub fn statuses(&self) -> Vec<ProviderStatus> {
        self.sources
            .iter()
            .map(|s| ProviderStatus {
                name: s.name().to_string(),
                available: s.is_available(),
            })
            .collect()
    }

    /// Sources that will be tried, in order.
    pub fn candidates(&self) -> Vec<&dyn SuggestionSource> {
        self.sources
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| s.is_available())
            .filter(|s| match &self.preference {
                ProviderPreference::Auto => true,
                ProviderPreference::Named(name) => s.name() == name,
            })
            .collect()
    }

    pub async fn suggest(&self, playlist: &Playlist, moods: &MoodCatalog) -> SuggestionOutcome {
        let mut attempts = Vec::new();

        for source in self.candidates() {
            let started = Instant::now();
            let result = source.suggest(playlist, moods).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(set) => {
                    info!(
                        provider = %source.name(),
                        suggestions = set.suggestions.len(),
                        duration_ms,
                        "Received mood suggestions"
                    );
                    attempts.push(ProviderAttempt {
                        provider: source.name().to_string(),
                        result: AttemptResult::Ok,
                        error: None,
                        duration_ms,
                    });
                    return SuggestionOutcome {
                        set,
                        source: source.name().to_string(),
                        attempts,
                    };
                }
                Err(err) => {
                    warn!(
                        provider = %source.name(),
                        kind = ?err.kind,
                        error = %err,
                        duration_ms,
                        "Mood suggestion provider failed"
                    );
                    attempts.push(ProviderAttempt {
                        provider: source.name().to_string(),
                        result: err.kind.into(),
                        error: Some(err.message),
                        duration_ms,
                    });
                    if err.kind != FailureKind::Unavailable {
                        break;
                    }
                }
            }
        }

        let fallback = self.fallback.as_ref();
        info!(
            playlist = %playlist.info.name,
            attempts = attempts.len(),
            fallback = %fallback.name(),
            "Using fallback mood source"
        );
        let set = match fallback.suggest(playlist, moods).await {
            Ok(set) => set,
            Err(err) => {
                warn!(
                    fallback = %fallback.name(),
                    error = %err,
                    "Fallback mood source failed"
                );
                SuggestionSet {
                    suggestions: Vec::new(),
                    overall_assessment: err.message,
                }
            }
        };
        SuggestionOutcome {
            set,
            source: fallback.name().to_string(),
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::{PlaylistInfo, Track};
    use crate::suggestions::{Suggestion, SuggestionError, OFFLINE_SOURCE_NAME};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockSource {
        name: &'static str,
        available: bool,
        outcome: Result<&'static str, (FailureKind, &'static str)>,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn ok(name: &'static str, mood: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                available: true,
                outcome: Ok(mood),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str, kind: FailureKind, message: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                available: true,
                outcome: Err((kind, message)),
                calls: AtomicUsize::new(0),
            })
        }

        fn unavailable(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                available: false,
                outcome: Ok("calming"),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SuggestionSource for MockSource {
        fn name(&self) -> &str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn suggest(
            &self,
            _playlist: &Playlist,
            _moods: &MoodCatalog,
        ) -> Result<SuggestionSet, SuggestionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Ok(mood) => Ok(SuggestionSet {
                    suggestions: vec![Suggestion::new(mood, 0.9, "mock")],
                    overall_assessment: format!("from {}", self.name),
                }),
                Err((kind, message)) => Err(SuggestionError::new(kind, message)),
            }
        }
    }

    fn playlist() -> Playlist {
        Playlist::new(
            PlaylistInfo {
                name: "Chill Vibes".into(),
                ..Default::default()
            },
            vec![Track::new("1", "Calm", vec!["Artist".into()])],
        )
    }

    fn chain(preference: ProviderPreference, sources: &[Arc<MockSource>]) -> ProviderChain {
        sources.iter().fold(ProviderChain::new(preference), |chain, s| {
            chain.with_source(s.clone())
        })
    }

    #[test]
    fn parses_preferences() {
        assert_eq!(
            "auto".parse::<ProviderPreference>(),
            Ok(ProviderPreference::Auto)
        );
        assert_eq!(
            " Gemini ".parse::<ProviderPreference>(),
            Ok(ProviderPreference::Named("gemini".into()))
        );
        assert!("".parse::<ProviderPreference>().is_err());
        assert_eq!(ProviderPreference::Named("openai".into()).to_string(), "openai");
    }

    #[tokio::test]
    async fn first_success_wins() {
        let openai = MockSource::ok("openai", "euphoric");
        let gemini = MockSource::ok("gemini", "calming");
        let outcome = chain(ProviderPreference::Auto, &[openai.clone(), gemini.clone()])
            .suggest(&playlist(), &MoodCatalog::builtin())
            .await;

        assert_eq!(outcome.source, "openai");
        assert_eq!(outcome.set.suggestions[0].mood, "euphoric");
        assert_eq!(gemini.calls(), 0);
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.attempts[0].result, AttemptResult::Ok);
    }

    #[tokio::test]
    async fn unavailable_provider_falls_through_to_next() {
        let openai = MockSource::failing("openai", FailureKind::Unavailable, "rate limit exceeded");
        let gemini = MockSource::ok("gemini", "calming");
        let outcome = chain(ProviderPreference::Auto, &[openai, gemini])
            .suggest(&playlist(), &MoodCatalog::builtin())
            .await;

        assert_eq!(outcome.source, "gemini");
        assert_eq!(outcome.attempts[0].result, AttemptResult::Unavailable);
        assert_eq!(outcome.attempts[0].error.as_deref(), Some("rate limit exceeded"));
        assert_eq!(outcome.attempts[1].result, AttemptResult::Ok);
    }

    #[tokio::test]
    async fn other_failures_stop_the_chain() {
        let openai = MockSource::failing("openai", FailureKind::Other, "network timeout");
        let gemini = MockSource::ok("gemini", "calming");
        let outcome = chain(ProviderPreference::Auto, &[openai, gemini.clone()])
            .suggest(&playlist(), &MoodCatalog::builtin())
            .await;

        assert_eq!(gemini.calls(), 0);
        assert_eq!(outcome.source, OFFLINE_SOURCE_NAME);
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.attempts[0].result, AttemptResult::Failed);
        // "chill" and "calm" in the playlist text
        assert_eq!(outcome.set.suggestions[0].mood, "relaxed");
    }

    #[tokio::test]
    async fn protocol_errors_stop_the_chain() {
        let openai = MockSource::failing("openai", FailureKind::Protocol, "No content");
        let gemini = MockSource::ok("gemini", "calming");
        let outcome = chain(ProviderPreference::Auto, &[openai, gemini.clone()])
            .suggest(&playlist(), &MoodCatalog::builtin())
            .await;

        assert_eq!(gemini.calls(), 0);
        assert_eq!(outcome.attempts[0].result, AttemptResult::ProtocolError);
        assert_eq!(outcome.source, OFFLINE_SOURCE_NAME);
    }

    #[tokio::test]
    async fn exhausted_chain_uses_offline_heuristic() {
        let openai = MockSource::failing("openai", FailureKind::Unavailable, "quota");
        let gemini = MockSource::failing("gemini", FailureKind::Unavailable, "invalid api key");
        let outcome = chain(ProviderPreference::Auto, &[openai, gemini])
            .suggest(&playlist(), &MoodCatalog::builtin())
            .await;

        assert_eq!(outcome.source, OFFLINE_SOURCE_NAME);
        assert_eq!(outcome.attempts.len(), 2);
    }

    #[tokio::test]
    async fn fallback_source_terminates_the_chain() {
        let openai = MockSource::failing("openai", FailureKind::Other, "boom");
        let fallback = MockSource::ok("backup", "focus");
        let outcome = chain(ProviderPreference::Auto, &[openai])
            .with_fallback(fallback.clone())
            .suggest(&playlist(), &MoodCatalog::builtin())
            .await;

        assert_eq!(fallback.calls(), 1);
        assert_eq!(outcome.source, "backup");
        assert_eq!(outcome.set.suggestions[0].mood, "focus");
        assert_eq!(outcome.attempts.len(), 1);
    }

    #[tokio::test]
    async fn failing_fallback_yields_empty_suggestions() {
        let fallback = MockSource::failing("backup", FailureKind::Other, "backup down");
        let outcome = ProviderChain::new(ProviderPreference::Auto)
            .with_fallback(fallback)
            .suggest(&playlist(), &MoodCatalog::builtin())
            .await;

        assert_eq!(outcome.source, "backup");
        assert!(outcome.set.suggestions.is_empty());
        assert_eq!(outcome.set.overall_assessment, "backup down");
        assert!(outcome.attempts.is_empty());
    }

    #[tokio::test]
    async fn named_preference_restricts_candidates() {
        let openai = MockSource::ok("openai", "euphoric");
        let gemini = MockSource::ok("gemini", "calming");
        let chain = chain(
            ProviderPreference::Named("gemini".into()),
            &[openai.clone(), gemini],
        );
        let outcome = chain.suggest(&playlist(), &MoodCatalog::builtin()).await;

        assert_eq!(outcome.source, "gemini");
        assert_eq!(openai.calls(), 0);
    }

    #[tokio::test]
    async fn unavailable_named_provider_goes_straight_offline() {
        let openai = MockSource::ok("openai", "euphoric");
        let gemini = MockSource::unavailable("gemini");
        let chain = chain(
            ProviderPreference::Named("gemini".into()),
            &[openai.clone(), gemini.clone()],
        );
        assert!(chain.candidates().is_empty());

        let outcome = chain.suggest(&playlist(), &MoodCatalog::builtin()).await;
        assert_eq!(outcome.source, OFFLINE_SOURCE_NAME);
        assert!(outcome.attempts.is_empty());
        assert_eq!(openai.calls() + gemini.calls(), 0);
    }

    #[tokio::test]
    async fn auto_skips_unavailable_sources() {
        let openai = MockSource::unavailable("openai");
        let gemini = MockSource::ok("gemini", "calming");
        let chain = chain(ProviderPreference::Auto, &[openai, gemini]);

        let statuses = chain.statuses();
        assert!(!statuses[0].available);
        assert!(statuses[1].available);

        let outcome = chain.suggest(&playlist(), &MoodCatalog::builtin()).await;
        assert_eq!(outcome.source, "gemini");
        assert_eq!(outcome.attempts.len(), 1);
    }

    #[tokio::test]
    async fn outcome_serializes_flat() {
        let outcome = ProviderChain::new(ProviderPreference::Auto)
            .suggest(&playlist(), &MoodCatalog::builtin())
            .await;
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["source"], "offline");
        assert!(json["suggestions"].is_array());
        assert!(json["overall_assessment"].is_string());
        assert_eq!(json["attempts"], serde_json::json!([]));
    }
}
