//! `GET /api/status`

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use mc_core::StatusResponse;

use crate::state::AppState;

/// Agent summary, heartbeat and activity feed in one document.
///
/// The feed opens with an entry for the last heartbeat, followed by the
/// fixture entries.
pub async fn get(State(state): State<AppState>) -> Json<StatusResponse> {
    let (agent, heartbeat, extras) = tokio::join!(
        state.status.agent_status(),
        state.heartbeat.heartbeat(),
        state.panels.status_extras(),
    );

    let mut recent_activity = Vec::with_capacity(extras.recent_activity.len() + 1);
    recent_activity.push(heartbeat.activity_entry(Utc::now()));
    recent_activity.extend(extras.recent_activity);

    Json(StatusResponse {
        agent,
        heartbeat,
        recent_activity,
        token_usage: extras.token_usage,
    })
}
