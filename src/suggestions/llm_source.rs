use super::prompt::{build_prompt, parse_reply, SYSTEM_PROMPT};
use super::{SuggestionError, SuggestionSet, SuggestionSource};
use crate::agent::llm::{CompletionOptions, LlmProvider, Message};
use crate::mood::MoodCatalog;
use crate::playlist::Playlist;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Asks a language-model provider for mood suggestions.
pub struct LlmSuggestionSource {
    provider: Arc<dyn LlmProvider>,
    options: CompletionOptions,
    available: bool,
}

impl LlmSuggestionSource {
    /// Credentials are checked here, once; later changes are not picked up.
    pub fn new(provider: Arc<dyn LlmProvider>, options: CompletionOptions) -> Self {
        let available = provider.has_credentials();
        Self {
            provider,
            options,
            available,
        }
    }
}

#[async_trait]
impl SuggestionSource for LlmSuggestionSource {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn suggest(
        &self,
        playlist: &Playlist,
        moods: &MoodCatalog,
    ) -> Result<SuggestionSet, SuggestionError> {
        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(build_prompt(playlist, moods)),
        ];

        let response = self.provider.complete(&messages, &self.options).await?;
        debug!(
            provider = %self.provider.name(),
            model = %self.provider.model(),
            finish_reason = ?response.finish_reason,
            "Parsing mood suggestions"
        );
        parse_reply(&response.message.content)
    }
}
