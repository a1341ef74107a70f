use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use playlist_mood_server::config::{AppConfig, CliConfig, FileConfig, DEFAULT_REQUEST_TIMEOUT_SEC};
use playlist_mood_server::analysis::BatchEntry;
use playlist_mood_server::{MoodAnalyzer, Playlist};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Classifies playlists read from JSON files and prints the result.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Playlist JSON files. One file prints a single analysis, several print a batch report.
    #[clap(required = true, value_parser = parse_path)]
    pub playlists: Vec<PathBuf>,

    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

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

    /// Pretty-print the JSON output.
    #[clap(long)]
    pub pretty: bool,
}

fn read_playlist(path: &Path) -> Result<Playlist> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read playlist file: {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse playlist file: {:?}", path))
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // stdout carries the JSON result, logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        moods_file: cli_args.moods.clone(),
        ai_provider: cli_args.ai_provider.clone(),
        request_timeout_sec: cli_args.request_timeout_sec,
        openai_api_key: cli_args.openai_api_key.clone(),
        gemini_api_key: cli_args.gemini_api_key.clone(),
        ..Default::default()
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let analyzer = MoodAnalyzer::new(
        Arc::new(config.load_mood_catalog()?),
        config.provider_chain(),
    );

    info!(count = cli_args.playlists.len(), "Classifying playlists");

    if let [path] = cli_args.playlists.as_slice() {
        let mut playlist = read_playlist(path)?;
        let result = analyzer.analyze(&mut playlist).await?;
        return print_json(&result, cli_args.pretty);
    }

    // An unreadable file becomes a failed item rather than aborting the batch
    let entries: Vec<BatchEntry> = cli_args
        .playlists
        .iter()
        .map(|path| match read_playlist(path) {
            Ok(playlist) => BatchEntry::from(playlist),
            Err(err) => {
                let reason = format!("{:#}", err);
                warn!(path = ?path, error = %reason, "Unreadable playlist file");
                BatchEntry::invalid(path.display().to_string(), reason)
            }
        })
        .collect();
    let report = analyzer.analyze_batch(entries).await;
    print_json(&report, cli_args.pretty)
}
