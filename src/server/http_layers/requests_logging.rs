//! Request logging middleware

use super::super::state::ServerState;
use axum::extract::State;
use axum::{
    body::Body,
    http::{header::HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::{error, info};

#[derive(PartialEq, PartialOrd, Clone, Debug, Default, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    #[default]
    Path,
    Headers,
    Body,
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Playlist payloads above this size are summarized instead of printed.
const MAX_LOGGABLE_BODY_LENGTH: usize = 4096;

fn content_length(headers: &HeaderMap) -> Result<usize, &'static str> {
    headers
        .get("content-length")
        .ok_or("content-length not set")?
        .to_str()
        .map_err(|_| "content-length is not a string")?
        .parse::<usize>()
        .map_err(|_| "content-length is not a number")
}

fn log_headers(direction: &str, headers: &HeaderMap) {
    for (name, value) in headers.iter() {
        info!(direction, header = %name, value = ?value, "  header");
    }
}

/// Logs a small body and hands back an equivalent one for the next layer.
async fn log_body(
    direction: &str,
    headers: &HeaderMap,
    body: Body,
) -> Result<Body, axum::Error> {
    match content_length(headers) {
        Err(reason) => {
            info!(direction, "  body not logged: {}", reason);
            Ok(body)
        }
        Ok(size) if size >= MAX_LOGGABLE_BODY_LENGTH => {
            info!(
                direction,
                "  body too big to log ({:#})",
                byte_unit::Byte::from(size)
            );
            Ok(body)
        }
        Ok(size) => {
            let bytes = axum::body::to_bytes(body, size).await?;
            info!(direction, "  body:\n{}", String::from_utf8_lossy(&bytes));
            Ok(Body::from(bytes))
        }
    }
}

pub async fn log_requests(
    State(state): State<ServerState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let level = state.config.requests_logging_level.clone();
    if level == RequestsLoggingLevel::None {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    info!(%method, %uri, ">>> request");

    let (parts, body) = request.into_parts();
    if level >= RequestsLoggingLevel::Headers {
        log_headers("request", &parts.headers);
    }
    let body = if level >= RequestsLoggingLevel::Body {
        match log_body("request", &parts.headers, body).await {
            Ok(body) => body,
            Err(err) => {
                error!(%uri, error = ?err, "Failed to read request body");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                    .into_response();
            }
        }
    } else {
        body
    };

    let (parts, body) = next.run(Request::from_parts(parts, body)).await.into_parts();
    if level >= RequestsLoggingLevel::Headers {
        log_headers("response", &parts.headers);
    }
    let body = if level >= RequestsLoggingLevel::Body {
        match log_body("response", &parts.headers, body).await {
            Ok(body) => body,
            Err(err) => {
                error!(%uri, error = ?err, "Failed to read response body");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                    .into_response();
            }
        }
    } else {
        body
    };

    info!(
        %method,
        %uri,
        status = parts.status.as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "<<< response"
    );
    Response::from_parts(parts, body)
}
