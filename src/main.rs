use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use playlist_mood_server::config::{AppConfig, CliConfig, FileConfig, DEFAULT_REQUEST_TIMEOUT_SEC};
use playlist_mood_server::{run_server, MoodAnalyzer, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 5000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to a TOML mood table. The built-in table is used when omitted.
    #[clap(long, value_parser = parse_path)]
    pub moods: Option<PathBuf>,

    /// Which AI provider to consult: auto, openai or gemini.
    #[clap(long, env = "AI_PROVIDER")]
    pub ai_provider: Option<String>,

    /// Timeout in seconds for AI provider requests.
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SEC)]
    pub request_timeout_sec: u64,

    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[clap(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            port: self.port,
            logging_level: self.logging_level.clone(),
            moods_file: self.moods.clone(),
            ai_provider: self.ai_provider.clone(),
            request_timeout_sec: self.request_timeout_sec,
            openai_api_key: self.openai_api_key.clone(),
            gemini_api_key: self.gemini_api_key.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let catalog = Arc::new(config.load_mood_catalog()?);
    let chain = config.provider_chain();

    for status in chain.statuses() {
        if status.available {
            info!(provider = %status.name, "AI provider configured");
        } else {
            warn!(provider = %status.name, "AI provider has no usable credentials");
        }
    }
    info!(
        preference = %chain.preference(),
        moods = catalog.len(),
        "Mood analyzer ready"
    );

    let analyzer = Arc::new(MoodAnalyzer::new(catalog, chain));

    info!("Starting server on port {}...", config.port);
    run_server(analyzer, config.logging_level, config.port).await
}
