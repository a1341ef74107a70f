mod file_config;

pub use file_config::{FileConfig, ProviderFileConfig};

use crate::agent::llm::{
    ApiKeySource, CompletionOptions, GeminiProvider, OpenAIProvider, DEFAULT_GEMINI_BASE_URL,
    DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL,
};
use crate::mood::MoodCatalog;
use crate::server::RequestsLoggingLevel;
use crate::suggestions::{LlmSuggestionSource, ProviderChain, ProviderPreference};
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 60;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub moods_file: Option<PathBuf>,
    pub ai_provider: Option<String>,
    pub request_timeout_sec: u64,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub moods_file: Option<PathBuf>,
    pub ai_provider: ProviderPreference,
    pub request_timeout_sec: u64,

    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
}

impl ProviderSettings {
    fn resolve(
        file: Option<ProviderFileConfig>,
        cli_api_key: Option<&String>,
        default_base_url: &str,
        default_model: &str,
    ) -> Self {
        let file = file.unwrap_or_default();
        Self {
            base_url: file
                .base_url
                .unwrap_or_else(|| default_base_url.to_string()),
            model: file.model.unwrap_or_else(|| default_model.to_string()),
            api_key: file.api_key.or_else(|| cli_api_key.cloned()),
            api_key_command: file.api_key_command,
        }
    }

    pub fn api_key_source(&self) -> ApiKeySource {
        ApiKeySource::from_config(self.api_key.clone(), self.api_key_command.clone())
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let moods_file = file
            .moods_file
            .map(PathBuf::from)
            .or_else(|| cli.moods_file.clone());
        if let Some(path) = &moods_file {
            if !path.is_file() {
                bail!("Moods file does not exist: {:?}", path);
            }
        }

        let ai_provider = match file.ai_provider.or_else(|| cli.ai_provider.clone()) {
            Some(value) => value
                .parse::<ProviderPreference>()
                .map_err(|e| anyhow::anyhow!("Invalid ai_provider {:?}: {}", value, e))?,
            None => ProviderPreference::Auto,
        };

        let request_timeout_sec = file
            .request_timeout_sec
            .unwrap_or(cli.request_timeout_sec);
        if request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than zero");
        }

        let openai = ProviderSettings::resolve(
            file.openai,
            cli.openai_api_key.as_ref(),
            DEFAULT_OPENAI_BASE_URL,
            DEFAULT_OPENAI_MODEL,
        );
        let gemini = ProviderSettings::resolve(
            file.gemini,
            cli.gemini_api_key.as_ref(),
            DEFAULT_GEMINI_BASE_URL,
            DEFAULT_GEMINI_MODEL,
        );

        Ok(Self {
            port,
            logging_level,
            moods_file,
            ai_provider,
            request_timeout_sec,
            openai,
            gemini,
        })
    }

    /// The configured mood table, or the built-in one.
    pub fn load_mood_catalog(&self) -> Result<MoodCatalog> {
        match &self.moods_file {
            Some(path) => {
                let catalog = MoodCatalog::from_toml_file(path)
                    .with_context(|| format!("Failed to load moods from {:?}", path))?;
                info!(path = ?path, moods = catalog.len(), "Loaded mood table");
                Ok(catalog)
            }
            None => Ok(MoodCatalog::builtin()),
        }
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            timeout: Duration::from_secs(self.request_timeout_sec),
            ..CompletionOptions::default()
        }
    }

    /// Builds the provider chain: OpenAI first, then Gemini.
    pub fn provider_chain(&self) -> ProviderChain {
        let options = self.completion_options();

        let openai = OpenAIProvider::new(
            self.openai.base_url.clone(),
            self.openai.model.clone(),
            self.openai.api_key_source(),
        );
        let gemini = GeminiProvider::new(
            self.gemini.base_url.clone(),
            self.gemini.model.clone(),
            self.gemini.api_key_source(),
        );

        ProviderChain::new(self.ai_provider.clone())
            .with_source(Arc::new(LlmSuggestionSource::new(
                Arc::new(openai),
                options.clone(),
            )))
            .with_source(Arc::new(LlmSuggestionSource::new(
                Arc::new(gemini),
                options,
            )))
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
