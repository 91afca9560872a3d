//! `GET /api/sessions`

use axum::Json;
use axum::extract::State;
use mc_core::SessionsResponse;
use tracing::warn;

use crate::state::AppState;

/// Live gateway sessions; an empty list with `error` when the gateway fails.
pub async fn list(State(state): State<AppState>) -> Json<SessionsResponse> {
    match state.sessions.list_sessions().await {
        Ok(sessions) => Json(SessionsResponse::ok(sessions)),
        Err(e) => {
            warn!(error = %e, "Sessions lookup failed");
            Json(SessionsResponse::failed(e.to_string()))
        }
    }
}
