//! Agent status scraped from `<cli> status`.
//!
//! The CLI prints a human-oriented report with box-drawing tables. Every
//! field is extracted independently; anything that does not match keeps its
//! fallback so a changed layout degrades the dashboard instead of breaking it.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use mc_core::{AgentStatus, ChannelStatus, StatusProviderPort};
use regex::Regex;
use tracing::{debug, warn};

use crate::cli::capture_bounded;
use crate::config::RuntimeConfig;

/// Text used when the CLI could not be run at all.
const UNAVAILABLE_OUTPUT: &str = "Unable to get openclaw status";

/// Compiled patterns for the status report.
#[derive(Debug, Clone)]
pub struct StatusPatterns {
    sessions: Regex,
    model: Regex,
    memory: Regex,
    heartbeat: Regex,
    agents: Regex,
    channel: Regex,
    opus: Regex,
    sonnet: Regex,
}

impl StatusPatterns {
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            sessions: Regex::new(r"(\d+) active")?,
            model: Regex::new(
                r"default\s+(us\.anthropic\.\S+|anthropic\.\S+|[\w./-]+claude[\w./-]*)",
            )?,
            memory: Regex::new(r"(\d+)\s*files.*?(\d+)\s*chunks")?,
            heartbeat: Regex::new(r"Heartbeat\s*│\s*(\w+)")?,
            agents: Regex::new(r"Agents\s*│\s*(\d+)")?,
            channel: Regex::new(
                r"│\s*(Discord|WhatsApp|Telegram)\s*│\s*(ON|OFF)\s*│\s*(OK|OFF|ERROR)\s*│\s*(.+?)\s*│",
            )?,
            opus: Regex::new(r"claude-opus-(\d+)-(\d+).*")?,
            sonnet: Regex::new(r"claude-sonnet-(\d+).*")?,
        })
    }

    /// Turn a provider model id into a display label.
    ///
    /// `us.anthropic.claude-opus-4-6-v1` becomes `Claude Opus 4`.
    pub fn prettify_model(&self, raw: &str) -> String {
        let name = raw.replacen("us.anthropic.", "", 1);
        let name = self.opus.replace(&name, "Claude Opus ${1}");
        let name = self.sonnet.replace(&name, "Claude Sonnet ${1}");
        name.replace('-', " ")
    }

    /// Extract an [`AgentStatus`] from status output.
    pub fn parse(&self, output: &str, agent_name: &str) -> AgentStatus {
        let mut status = AgentStatus::fallback(agent_name);

        if let Some(n) = capture_u32(&self.sessions, output, 1) {
            status.active_sessions = n;
        }
        if let Some(caps) = self.model.captures(output) {
            status.model = self.prettify_model(&caps[1]);
        }
        if let Some(caps) = self.memory.captures(output) {
            if let (Ok(files), Ok(chunks)) = (caps[1].parse(), caps[2].parse()) {
                status.memory_files = files;
                status.memory_chunks = chunks;
            }
        }
        if let Some(caps) = self.heartbeat.captures(output) {
            status.heartbeat_interval = caps[1].to_string();
        }
        if let Some(n) = capture_u32(&self.agents, output, 1) {
            status.total_agents = n;
        }

        status.channels = self
            .channel
            .captures_iter(output)
            .map(|caps| ChannelStatus {
                name: caps[1].to_string(),
                enabled: caps[2].to_string(),
                state: caps[3].to_string(),
                detail: caps[4].trim().to_string(),
            })
            .collect();

        status
    }
}

fn capture_u32(re: &Regex, text: &str, group: usize) -> Option<u32> {
    re.captures(text)?.get(group)?.as_str().parse().ok()
}

/// Status provider that shells out to the agent CLI.
#[derive(Debug, Clone)]
pub struct CliStatusProvider {
    binary: PathBuf,
    agent_name: String,
    timeout: Duration,
    patterns: StatusPatterns,
}

impl CliStatusProvider {
    pub fn new(config: &RuntimeConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            binary: config.cli_binary.clone(),
            agent_name: config.agent_name.clone(),
            timeout: config.status_timeout,
            patterns: StatusPatterns::compile()?,
        })
    }
}

#[async_trait]
impl StatusProviderPort for CliStatusProvider {
    async fn agent_status(&self) -> AgentStatus {
        let output = match capture_bounded(&self.binary, ["status"], self.timeout).await {
            Ok(out) => {
                if out.timed_out {
                    warn!(timeout_secs = self.timeout.as_secs(), "Status command timed out, parsing partial output");
                } else if !out.success {
                    debug!(code = ?out.code, "Status command exited non-zero, parsing its output anyway");
                }
                let text = out.combined();
                if text.trim().is_empty() {
                    UNAVAILABLE_OUTPUT.to_string()
                } else {
                    text
                }
            }
            Err(e) => {
                warn!(error = %e, "Status command unavailable");
                UNAVAILABLE_OUTPUT.to_string()
            }
        };
        self.patterns.parse(&output, &self.agent_name)
    }
}
