//! A local stand-in for the OpenAI chat completions API.
#![allow(dead_code)]

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
pub enum MockReply {
    /// 200 with the given assistant content.
    Content(String),
    /// Error status with a plain text body.
    Status(u16, String),
}

#[derive(Clone)]
struct MockState {
    reply: MockReply,
    calls: Arc<AtomicUsize>,
}

pub struct MockOpenAI {
    pub base_url: String,
    calls: Arc<AtomicUsize>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

async fn chat_completions(State(state): State<MockState>) -> axum::response::Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    match state.reply {
        MockReply::Content(content) => Json(serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        MockReply::Status(status, body) => {
            let status = StatusCode::from_u16(status).expect("Invalid mock status");
            (status, body).into_response()
        }
    }
}

impl MockOpenAI {
    pub async fn spawn(reply: MockReply) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = MockState {
            reply,
            calls: calls.clone(),
        };
        let app = Router::new()
            .route("/chat/completions", post(chat_completions))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock provider port");
        let base_url = format!(
            "http://{}",
            listener.local_addr().expect("Failed to get local address")
        );

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock provider failed");
        });

        Self {
            base_url,
            calls,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Drop for MockOpenAI {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
