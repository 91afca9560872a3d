//! Read-only dashboard panels served from fixture documents.

use axum::Json;
use axum::extract::State;
use mc_core::{AgentRoster, CostReport, ScoutReport, TaskBoard};

use crate::state::AppState;

/// `GET /api/tasks`
pub async fn tasks(State(state): State<AppState>) -> Json<TaskBoard> {
    Json(state.panels.tasks().await)
}

/// `GET /api/costs`
pub async fn costs(State(state): State<AppState>) -> Json<CostReport> {
    Json(state.panels.costs().await)
}

/// `GET /api/scout`
pub async fn scout(State(state): State<AppState>) -> Json<ScoutReport> {
    Json(state.panels.scout().await)
}

/// `GET /api/agents`
pub async fn agents(State(state): State<AppState>) -> Json<AgentRoster> {
    Json(state.panels.agents().await)
}
