//! Core domain types and ports for Mission Control.
//!
//! This crate is pure: it holds the gateway configuration, the JSON shapes
//! served by the dashboard, and the traits that adapters implement. It has no
//! network, process or filesystem code.

#![deny(unsafe_code)]

pub mod config;
pub mod domain;
pub mod ports;

pub use config::{
    DEFAULT_GATEWAY_MODEL, DEFAULT_GATEWAY_URL, DEFAULT_GATEWAY_USER, DEFAULT_REQUEST_TIMEOUT,
    GatewayConfig,
};
pub use domain::{
    ActivityEntry, AgentMessage, AgentProfile, AgentRoster, AgentStatus, ChannelStatus,
    ChatMessage, ChatRequest, ChatRequestError, CostBudget, CostReport, CostSummary, CronJob,
    CronResponse, DailyCost, GatewayChatPayload, HeartbeatState, Opportunity, ScoutReport,
    ServiceCost, SessionSummary, SessionsResponse, StatusExtras, StatusResponse, TaskBoard,
    TaskCard, TaskColumns, TokenUsage,
};
pub use ports::{
    CronProviderPort, FixedStatusProvider, HeartbeatPort, PanelSourcePort, ProviderError,
    SessionsPort, StatusProviderPort,
};
