//! Read-only panel documents: task board, costs, scout leads, agent roster.
//!
//! The schemas are fixed; values come from operator-maintained fixture files.
//! Every type deserializes leniently (`#[serde(default)]`) so a partial file
//! still renders.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::status::{ActivityEntry, TokenUsage};

/// A card on the task board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskColumns {
    pub queue: Vec<TaskCard>,
    pub in_progress: Vec<TaskCard>,
    pub done: Vec<TaskCard>,
}

/// `GET /api/tasks` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskBoard {
    pub columns: TaskColumns,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyCost {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub total: f64,
    /// Spend per service for the day, in file order.
    pub breakdown: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostBudget {
    pub monthly: f64,
    pub warning: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostSummary {
    pub today: f64,
    pub this_week: f64,
    pub this_month: f64,
    pub budget: CostBudget,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCost {
    pub name: String,
    pub cost: f64,
    pub percentage: f64,
}

/// `GET /api/costs` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostReport {
    pub daily: Vec<DailyCost>,
    pub summary: CostSummary,
    pub by_service: Vec<ServiceCost>,
}

/// A business lead found by the scout agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub score: u32,
    pub source: String,
    pub found: String,
    pub status: String,
    pub tags: Vec<String>,
}

/// `GET /api/scout` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutReport {
    pub opportunities: Vec<Opportunity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    pub role: String,
    pub avatar: String,
    pub status: String,
    pub model: String,
    pub description: String,
    pub last_active: String,
    pub tasks_completed: u32,
    pub uptime: String,
}

/// A message exchanged between two agents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentMessage {
    pub from: String,
    pub to: String,
    pub message: String,
    pub time: String,
}

/// `GET /api/agents` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentRoster {
    pub agents: Vec<AgentProfile>,
    pub conversations: Vec<AgentMessage>,
}

/// Fixture-provided parts of the status document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusExtras {
    pub recent_activity: Vec<ActivityEntry>,
    pub token_usage: TokenUsage,
}
