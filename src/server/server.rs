use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};

use tracing::info;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};
use crate::analysis::{AnalysisError, BatchEntry, MoodAnalyzer};
use crate::playlist::Playlist;
use crate::suggestions::{ProviderPreference, ProviderStatus};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
}

#[derive(Serialize)]
struct HealthResponse<'a> {
    status: &'static str,
    providers: Vec<ProviderStatus>,
    ai_provider: &'a ProviderPreference,
    moods: usize,
}

#[derive(Deserialize, Debug)]
struct AnalyzeBody {
    pub playlist: Playlist,
}

/// Items stay raw so one malformed playlist fails alone instead of the request.
#[derive(Deserialize, Debug)]
struct AnalyzeBatchBody {
    #[serde(default)]
    pub playlists: Vec<serde_json::Value>,
}

#[derive(Serialize)]
struct AnalyzeResponse<T: Serialize> {
    success: bool,
    analysis: T,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = match self {
            AnalysisError::EmptyPlaylist | AnalysisError::InvalidPlaylist(_) => {
                StatusCode::BAD_REQUEST
            }
            AnalysisError::MoodNotFound(_) => StatusCode::NOT_FOUND,
        };
        error_response(status, self.to_string())
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    error_response(rejection.status(), rejection.body_text())
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
    };
    Json(stats)
}

async fn health(State(analyzer): State<GuardedMoodAnalyzer>) -> Response {
    Json(HealthResponse {
        status: "healthy",
        providers: analyzer.chain().statuses(),
        ai_provider: analyzer.chain().preference(),
        moods: analyzer.catalog().len(),
    })
    .into_response()
}

async fn analyze(
    State(analyzer): State<GuardedMoodAnalyzer>,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Response {
    let Json(AnalyzeBody { mut playlist }) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };

    match analyzer.analyze(&mut playlist).await {
        Ok(analysis) => Json(AnalyzeResponse {
            success: true,
            analysis,
        })
        .into_response(),
        Err(err) => err.into_response(),
    }
}

async fn analyze_batch(
    State(analyzer): State<GuardedMoodAnalyzer>,
    body: Result<Json<AnalyzeBatchBody>, JsonRejection>,
) -> Response {
    let Json(AnalyzeBatchBody { playlists }) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };

    if playlists.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Playlists are required");
    }

    let entries: Vec<BatchEntry> = playlists
        .into_iter()
        .enumerate()
        .map(|(position, value)| BatchEntry::from_json(value, position))
        .collect();
    Json(analyzer.analyze_batch(entries).await).into_response()
}

async fn list_moods(State(analyzer): State<GuardedMoodAnalyzer>) -> Response {
    Json(analyzer.list_moods()).into_response()
}

async fn get_mood(
    State(analyzer): State<GuardedMoodAnalyzer>,
    Path(mood): Path<String>,
) -> Response {
    match analyzer.explain_mood(&mood) {
        Ok(explanation) => Json(explanation).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn make_app(config: ServerConfig, analyzer: Arc<MoodAnalyzer>) -> Router {
    let state = ServerState::new(config, analyzer);

    let analyze_routes: Router = Router::new()
        .route("/", post(analyze))
        .route("/batch", post(analyze_batch))
        .with_state(state.clone());

    let mood_routes: Router = Router::new()
        .route("/", get(list_moods))
        .route("/{mood}", get(get_mood))
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .route("/v1/health", get(health))
        .with_state(state.clone());

    home_router
        .nest("/v1/analyze", analyze_routes)
        .nest("/v1/moods", mood_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(
    analyzer: Arc<MoodAnalyzer>,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
    };
    let app = make_app(config, analyzer);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app).await?)
}
