//! State control endpoints.
//!
//! Provides HTTP endpoints for:
//! - Toggling recording (POST /toggle)
//! - Signalling that processing finished (POST /complete)
//! - Getting the current state (GET /status)

use crate::api::error::ApiResult;
use crate::config::WaybarConfig;
use crate::state::{self as machine, StateMachine, ToggleOutcome};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ControlState {
    pub machine: Arc<StateMachine>,
    pub waybar_config: WaybarConfig,
}

/// Creates the router with all state control endpoints.
pub fn router(state: ControlState) -> Router {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/complete", post(complete))
        .route("/status", get(status))
        .with_state(state)
}

/// Advances the recording cycle: Idle → Recording → Processing.
///
/// While processing the toggle is ignored and `success` is false.
async fn toggle(State(state): State<ControlState>) -> ApiResult<Json<Value>> {
    info!("Toggle command received via API");

    match machine::toggle(&state.machine).await? {
        ToggleOutcome::Transitioned { from, to } => Ok(Json(json!({
            "success": true,
            "previous": from,
            "state": to,
            "message": format!("{from} -> {to}"),
        }))),
        ToggleOutcome::Busy(current) => Ok(Json(json!({
            "success": false,
            "state": current,
            "message": format!("Busy: currently {current}"),
        }))),
    }
}

/// Marks processing as finished (Processing → Idle).
async fn complete(State(state): State<ControlState>) -> ApiResult<Json<Value>> {
    info!("Complete command received via API");

    machine::complete(&state.machine).await?;
    Ok(Json(json!({
        "success": true,
        "state": state.machine.state(),
    })))
}

/// Gets the current state.
///
/// # Query Parameters
/// - `style=waybar` - Returns response formatted for Waybar integration
async fn status(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<ControlState>,
) -> Json<Value> {
    let current = state.machine.state();

    if params.get("style").map(String::as_str) == Some("waybar") {
        return Json(generate_waybar_response(current, &state.waybar_config));
    }

    Json(json!({
        "state": current,
        "recording": current == machine::State::Recording,
    }))
}

fn generate_waybar_response(current: machine::State, config: &WaybarConfig) -> Value {
    let (text, tooltip) = match current {
        machine::State::Idle => (&config.idle_text, &config.idle_tooltip),
        machine::State::Recording => (&config.recording_text, &config.recording_tooltip),
        machine::State::Processing => (&config.processing_text, &config.processing_tooltip),
    };

    json!({
        "text": text,
        "class": format!("vox-{}", current.as_str()),
        "tooltip": tooltip,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> (Arc<StateMachine>, Router) {
        let sm = Arc::new(StateMachine::new());
        let router = router(ControlState {
            machine: sm.clone(),
            waybar_config: WaybarConfig::default(),
        });
        (sm, router)
    }

    async fn call(router: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_toggle_cycle_over_http() {
        let (sm, router) = app();

        let (status, body) = call(&router, "POST", "/toggle").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["previous"], "idle");
        assert_eq!(body["state"], "recording");

        let (_, body) = call(&router, "POST", "/toggle").await;
        assert_eq!(body["state"], "processing");

        let (status, body) = call(&router, "POST", "/toggle").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(sm.state(), machine::State::Processing);

        let (status, body) = call(&router, "POST", "/complete").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "idle");
    }

    #[tokio::test]
    async fn test_complete_from_idle_conflicts() {
        let (sm, router) = app();

        let (status, body) = call(&router, "POST", "/complete").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], true);
        assert_eq!(sm.state(), machine::State::Idle);
    }

    #[tokio::test]
    async fn test_status_plain_and_waybar() {
        let (sm, router) = app();
        sm.transition(machine::State::Recording).await.unwrap();

        let (_, body) = call(&router, "GET", "/status").await;
        assert_eq!(body["state"], "recording");
        assert_eq!(body["recording"], true);

        let (_, body) = call(&router, "GET", "/status?style=waybar").await;
        assert_eq!(body["class"], "vox-recording");
        assert_eq!(body["text"], WaybarConfig::default().recording_text);
    }
}
