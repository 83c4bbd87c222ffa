//! HTTP client for a running Vox service.
//!
//! The hotkey-facing commands (`toggle`, `complete`, `status`) go through
//! here instead of touching the state machine directly, so the one
//! service process stays the single owner of the state.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// Client for the local control API.
pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
}

/// Response from `POST /toggle`.
#[derive(Debug, Deserialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub state: String,
    pub message: String,
}

/// Response from `GET /status`.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub state: String,
    pub recording: bool,
}

impl ServiceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn for_port(port: u16) -> Self {
        Self::new(&format!("http://127.0.0.1:{port}"))
    }

    pub async fn toggle(&self) -> Result<ToggleResponse> {
        let body = self.post("toggle").await?;
        serde_json::from_str(&body).context("Failed to parse toggle response")
    }

    /// Returns the state reported after completion.
    pub async fn complete(&self) -> Result<String> {
        let body = self.post("complete").await?;
        let value: Value =
            serde_json::from_str(&body).context("Failed to parse complete response")?;
        Ok(value["state"].as_str().unwrap_or("unknown").to_string())
    }

    pub async fn status(&self) -> Result<StatusResponse> {
        let body = self.get("status").await?;
        serde_json::from_str(&body).context("Failed to parse status response")
    }

    pub async fn waybar_status(&self) -> Result<Value> {
        let body = self.get("status?style=waybar").await?;
        serde_json::from_str(&body).context("Failed to parse status response")
    }

    async fn post(&self, path: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach Vox service at {}", self.base_url))?;
        Self::read_body(response).await
    }

    async fn get(&self, path: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach Vox service at {}", self.base_url))?;
        Self::read_body(response).await
    }

    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v["message"].as_str().map(str::to_string))
                .unwrap_or(body);
            return Err(anyhow::anyhow!("Request failed ({}): {}", status, message));
        }

        Ok(body)
    }
}
