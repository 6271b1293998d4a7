use crate::config::Config;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Opaque, short-lived token issued by the anti-bot agent for one action.
#[derive(Clone, PartialEq, Eq)]
pub struct ProofToken(String);

impl ProofToken {
    /// `None` for blank input: an empty token is the same as no token.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ProofToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProofToken([REDACTED])")
    }
}

/// Embedded anti-bot agent (e.g. the reCAPTCHA script).
#[async_trait]
pub trait AntiBotAgent: Send + Sync {
    /// Resolves once the agent has loaded. May never resolve.
    async fn ready(&self);

    /// Request a token for `action`. `Ok(None)` means the agent declined.
    async fn execute(&self, site_key: &str, action: &str) -> anyhow::Result<Option<String>>;
}

/// Obtains a fresh proof token scoped to an action name.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// `None` whenever no usable token could be obtained. Never an error.
    async fn acquire(&self, action: &str) -> Option<ProofToken>;
}

/// [`TokenProvider`] backed by an [`AntiBotAgent`], with a bound on how long
/// it waits for the agent's readiness signal.
pub struct AgentTokenProvider {
    agent: Option<Arc<dyn AntiBotAgent>>,
    site_key: String,
    ready_timeout: Duration,
}

impl AgentTokenProvider {
    pub fn new(
        agent: Option<Arc<dyn AntiBotAgent>>,
        site_key: impl Into<String>,
        ready_timeout: Duration,
    ) -> Self {
        Self {
            agent,
            site_key: site_key.into(),
            ready_timeout,
        }
    }

    /// Site key from `[verify]`, readiness bound from `[form]`.
    pub fn from_config(agent: Option<Arc<dyn AntiBotAgent>>, config: &Config) -> Self {
        let site_key = config.verify.site_key.as_deref().unwrap_or_default().trim();
        if site_key.is_empty() {
            tracing::warn!("no site key configured; the anti-bot agent may refuse to issue tokens");
        }
        Self::new(agent, site_key, config.form.agent_ready_timeout())
    }
}

#[async_trait]
impl TokenProvider for AgentTokenProvider {
    async fn acquire(&self, action: &str) -> Option<ProofToken> {
        let Some(agent) = self.agent.as_ref() else {
            tracing::debug!(action, "anti-bot agent unavailable");
            return None;
        };

        if tokio::time::timeout(self.ready_timeout, agent.ready())
            .await
            .is_err()
        {
            tracing::warn!(
                action,
                timeout_ms = u64::try_from(self.ready_timeout.as_millis()).unwrap_or(u64::MAX),
                "anti-bot agent never signalled readiness"
            );
            return None;
        }

        match agent.execute(&self.site_key, action).await {
            Ok(Some(raw)) => ProofToken::new(raw),
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(action, "anti-bot agent failed to issue a token: {error}");
                None
            }
        }
    }
}
