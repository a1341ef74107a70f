//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint.
//! When API routes or request formats change, update only this file.
#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Status Endpoints
    // ========================================================================

    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    // ========================================================================
    // Analysis Endpoints
    // ========================================================================

    pub async fn analyze(&self, playlist: Value) -> Response {
        self.client
            .post(format!("{}/v1/analyze", self.base_url))
            .json(&json!({ "playlist": playlist }))
            .send()
            .await
            .expect("Analyze request failed")
    }

    pub async fn analyze_raw(&self, body: &str) -> Response {
        self.client
            .post(format!("{}/v1/analyze", self.base_url))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Analyze request failed")
    }

    pub async fn analyze_batch(&self, playlists: Vec<Value>) -> Response {
        self.client
            .post(format!("{}/v1/analyze/batch", self.base_url))
            .json(&json!({ "playlists": playlists }))
            .send()
            .await
            .expect("Batch analyze request failed")
    }

    // ========================================================================
    // Mood Endpoints
    // ========================================================================

    pub async fn list_moods(&self) -> Response {
        self.client
            .get(format!("{}/v1/moods", self.base_url))
            .send()
            .await
            .expect("List moods request failed")
    }

    pub async fn get_mood(&self, mood: &str) -> Response {
        self.client
            .get(format!("{}/v1/moods/{}", self.base_url, mood))
            .send()
            .await
            .expect("Get mood request failed")
    }
}
