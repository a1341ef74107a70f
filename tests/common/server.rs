//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own analyzer.

use super::constants::*;
use playlist_mood_server::config::{AppConfig, CliConfig, FileConfig, ProviderFileConfig};
use playlist_mood_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use playlist_mood_server::MoodAnalyzer;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Test server instance
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    #[allow(dead_code)]
    pub port: u16,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server without any usable AI provider, so every analysis
    /// falls back to the offline heuristic.
    pub async fn spawn() -> Self {
        Self::spawn_with_config(FileConfig::default()).await
    }

    /// Spawns a server whose OpenAI provider points at `base_url`.
    #[allow(dead_code)]
    pub async fn spawn_with_openai(base_url: &str) -> Self {
        Self::spawn_with_config(FileConfig {
            openai: Some(ProviderFileConfig {
                base_url: Some(base_url.to_string()),
                api_key: Some("sk-test".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })
        .await
    }

    /// Spawns a server from a TOML-equivalent config, resolved the same way
    /// the binary resolves it.
    ///
    /// # Panics
    ///
    /// Panics if the config is invalid, port binding fails or the server
    /// doesn't become ready within timeout.
    pub async fn spawn_with_config(file_config: FileConfig) -> Self {
        let cli = CliConfig {
            request_timeout_sec: 5,
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, Some(file_config)).expect("Invalid test config");
        let catalog = config
            .load_mood_catalog()
            .expect("Failed to load mood table");
        let analyzer = Arc::new(MoodAnalyzer::new(
            Arc::new(catalog),
            config.provider_chain(),
        ));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let app = make_app(
            ServerConfig {
                port,
                requests_logging_level: RequestsLoggingLevel::None,
            },
            analyzer,
        );

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
