//! Liveness probe endpoint.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub ok: bool,
    pub message: &'static str,
    pub uptime_seconds: u64,
}

/// GET /
pub async fn liveness(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        ok: true,
        message: "chute is running",
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
