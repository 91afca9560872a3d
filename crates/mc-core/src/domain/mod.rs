//! Domain types.
//!
//! Wire names are camelCase to match what the dashboard frontend reads.

pub mod chat;
pub mod cron;
pub mod panels;
pub mod sessions;
pub mod status;

pub use chat::{ChatMessage, ChatRequest, ChatRequestError, GatewayChatPayload};
pub use cron::{CronJob, CronResponse};
pub use panels::{
    AgentMessage, AgentProfile, AgentRoster, CostBudget, CostReport, CostSummary, DailyCost,
    Opportunity, ScoutReport, ServiceCost, StatusExtras, TaskBoard, TaskCard, TaskColumns,
};
pub use sessions::{SessionSummary, SessionsResponse};
pub use status::{
    ActivityEntry, AgentStatus, ChannelStatus, HeartbeatState, StatusResponse, TokenUsage,
};
