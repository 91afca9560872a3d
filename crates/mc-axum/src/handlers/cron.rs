//! `GET /api/cron`

use axum::Json;
use axum::extract::State;
use mc_core::CronResponse;
use tracing::warn;

use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Json<CronResponse> {
    match state.cron.list_jobs().await {
        Ok(jobs) => Json(CronResponse { jobs, error: None }),
        Err(e) => {
            warn!(error = %e, "Cron listing failed");
            Json(CronResponse {
                jobs: Vec::new(),
                error: Some(e.to_string()),
            })
        }
    }
}
