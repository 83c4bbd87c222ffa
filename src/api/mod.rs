//! REST API server for Vox.
//!
//! This is the trigger surface: bind a global hotkey to
//! `curl -X POST http://127.0.0.1:3737/toggle` (or `vox toggle`).

pub mod error;
pub mod routes;

use crate::config::Config;
use crate::state::StateMachine;
use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use routes::state::ControlState;

pub struct ApiServer {
    port: u16,
    control_state: ControlState,
}

impl ApiServer {
    pub fn new(machine: Arc<StateMachine>, config: &Config) -> Self {
        Self {
            port: config.api.port,
            control_state: ControlState {
                machine,
                waybar_config: config.ui.waybar.clone(),
            },
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            // Root and version endpoints
            .route("/", get(service_info))
            .route("/version", get(version))
            // State control endpoints
            .merge(routes::state::router(self.control_state.clone()))
    }

    /// Serve until `shutdown` is cancelled.
    pub async fn start(self, shutdown: CancellationToken) -> Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(&format!("127.0.0.1:{}", self.port)).await?;

        info!("API server listening on http://127.0.0.1:{}", self.port);
        info!("Endpoints:");
        info!("  GET  /              - Service info");
        info!("  GET  /version       - Get version info");
        info!("  POST /toggle        - Start/stop recording");
        info!("  POST /complete      - Finish processing");
        info!("  GET  /status        - Get current state");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "vox",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "vox"
    }))
}
