//! Panel documents loaded from JSON fixture files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mc_core::{AgentRoster, CostReport, PanelSourcePort, ScoutReport, StatusExtras, TaskBoard};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const TASKS_FILE: &str = "tasks.json";
pub const COSTS_FILE: &str = "costs.json";
pub const SCOUT_FILE: &str = "scout.json";
pub const AGENTS_FILE: &str = "agents.json";
pub const STATUS_FILE: &str = "status.json";

/// Panel source reading one JSON document per panel from a directory.
///
/// A missing file is the empty document; an unreadable or invalid one is
/// logged and also treated as empty.
#[derive(Debug, Clone)]
pub struct FilePanelSource {
    dir: PathBuf,
}

impl FilePanelSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn load<T>(&self, file: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let path = self.dir.join(file);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Panel fixture missing");
                return T::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Panel fixture unreadable");
                return T::default();
            }
        };
        serde_json::from_slice(&raw).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Panel fixture invalid");
            T::default()
        })
    }
}

#[async_trait]
impl PanelSourcePort for FilePanelSource {
    async fn tasks(&self) -> TaskBoard {
        self.load(TASKS_FILE).await
    }

    async fn costs(&self) -> CostReport {
        self.load(COSTS_FILE).await
    }

    async fn scout(&self) -> ScoutReport {
        self.load(SCOUT_FILE).await
    }

    async fn agents(&self) -> AgentRoster {
        self.load(AGENTS_FILE).await
    }

    async fn status_extras(&self) -> StatusExtras {
        self.load(STATUS_FILE).await
    }
}
