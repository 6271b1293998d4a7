use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client-side form behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Action name the proof token is scoped to (default: submit)
    #[serde(default = "default_action")]
    pub action: String,
    /// Cool-down window after an accepted submission, in ms (default: 1000)
    #[serde(default = "default_submit_timeout_ms")]
    pub submit_timeout_ms: u64,
    /// Restore field defaults after each submit event (default: true)
    #[serde(default = "default_true")]
    pub reset: bool,
    /// How long to wait for the anti-bot agent to become ready, in ms (default: 10000)
    #[serde(default = "default_agent_ready_timeout_ms")]
    pub agent_ready_timeout_ms: u64,
    /// Base URL of the verification endpoint as seen by the form
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,
}

fn default_action() -> String {
    "submit".into()
}

fn default_submit_timeout_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_agent_ready_timeout_ms() -> u64 {
    10_000
}

fn default_endpoint_url() -> String {
    "http://127.0.0.1:3000".into()
}

impl FormConfig {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    pub fn agent_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.agent_ready_timeout_ms)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            action: default_action(),
            submit_timeout_ms: default_submit_timeout_ms(),
            reset: true,
            agent_ready_timeout_ms: default_agent_ready_timeout_ms(),
            endpoint_url: default_endpoint_url(),
        }
    }
}
