//! Sticky verification gate.
//!
//! `Unverified → (token acquired, endpoint accepts) → Verified`. Once
//! verified the gate stays verified for as long as it is mounted; only
//! [`VerificationGate::reset`] clears it. Each attempt is stamped with the
//! generation it started in, and its result is dropped if the gate was
//! unmounted, reset, or given new dependencies in the meantime. At most one
//! attempt runs per generation.

use super::endpoint::VerifyEndpoint;
use super::token::TokenProvider;
use crate::config::Config;
use crate::verify::TrustDecision;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Inputs that trigger a fresh attempt when they change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDependencies {
    pub action: String,
    pub route: String,
}

impl GateDependencies {
    pub fn new(action: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            route: route.into(),
        }
    }

    /// `form.action` against `gateway.verify_route`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.form.action.trim(), config.gateway.verify_route.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unverified,
    Verified,
}

struct GateInner {
    state: GateState,
    deps: GateDependencies,
    mounted: bool,
    generation: u64,
    /// Id of the attempt running for the current generation.
    pending: Option<u64>,
    attempts: u64,
}

impl GateInner {
    fn next_generation(&mut self) {
        self.generation += 1;
        self.pending = None;
    }
}

struct Shared {
    tokens: Arc<dyn TokenProvider>,
    endpoint: Arc<dyn VerifyEndpoint>,
    inner: Mutex<GateInner>,
}

/// Work order for one acquire→verify run. Dropping it, finished or not,
/// lets the next attempt start.
struct Ticket {
    id: u64,
    generation: u64,
    deps: GateDependencies,
    tokens: Arc<dyn TokenProvider>,
    endpoint: Arc<dyn VerifyEndpoint>,
    shared: Weak<Shared>,
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, GateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `None` when an attempt would be a no-op: already verified, unmounted,
    /// or another attempt for this generation is still running.
    fn ticket(self: &Arc<Self>) -> Option<Ticket> {
        let mut inner = self.lock();
        if inner.state == GateState::Verified || !inner.mounted {
            return None;
        }
        if inner.pending.is_some() {
            tracing::debug!(generation = inner.generation, "verification already in flight");
            return None;
        }
        inner.attempts += 1;
        let id = inner.attempts;
        inner.pending = Some(id);
        Some(Ticket {
            id,
            generation: inner.generation,
            deps: inner.deps.clone(),
            tokens: Arc::clone(&self.tokens),
            endpoint: Arc::clone(&self.endpoint),
            shared: Arc::downgrade(self),
        })
    }

    fn release(&self, id: u64) {
        let mut inner = self.lock();
        if inner.pending == Some(id) {
            inner.pending = None;
        }
    }

    /// Returns whether the decision was applied.
    fn apply(&self, generation: u64, decision: TrustDecision) -> bool {
        let mut inner = self.lock();
        if !inner.mounted || inner.generation != generation {
            tracing::debug!(generation, "dropping stale verification result");
            return false;
        }
        if decision.verified {
            inner.state = GateState::Verified;
            tracing::info!(action = %inner.deps.action, "form verified");
        }
        true
    }
}

impl Ticket {
    async fn run(&self) -> TrustDecision {
        let Some(token) = self.tokens.acquire(&self.deps.action).await else {
            tracing::debug!(action = %self.deps.action, "no proof token; staying unverified");
            return TrustDecision::rejected();
        };
        self.endpoint.verify(&self.deps.route, &token).await
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.release(self.id);
        }
    }
}

/// Handle to a mounted gate. Clones share state; dropping every handle
/// unmounts it.
#[derive(Clone)]
pub struct VerificationGate {
    shared: Arc<Shared>,
}

impl VerificationGate {
    pub fn new(
        tokens: Arc<dyn TokenProvider>,
        endpoint: Arc<dyn VerifyEndpoint>,
        deps: GateDependencies,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                tokens,
                endpoint,
                inner: Mutex::new(GateInner {
                    state: GateState::Unverified,
                    deps,
                    mounted: true,
                    generation: 0,
                    pending: None,
                    attempts: 0,
                }),
            }),
        }
    }

    pub fn state(&self) -> GateState {
        self.shared.lock().state
    }

    pub fn is_verified(&self) -> bool {
        self.state() == GateState::Verified
    }

    pub fn dependencies(&self) -> GateDependencies {
        self.shared.lock().deps.clone()
    }

    /// Run one acquire→verify sequence inline and report the resulting state.
    /// A no-op returning the current state when already verified or while
    /// another attempt is in flight.
    pub async fn attempt(&self) -> GateState {
        if let Some(ticket) = self.shared.ticket() {
            let decision = ticket.run().await;
            self.shared.apply(ticket.generation, decision);
        }
        self.state()
    }

    /// Spawn an attempt in the background. `None` when there is nothing to do,
    /// including while an earlier attempt is still running or when called
    /// outside a tokio runtime.
    ///
    /// The task holds only a weak reference to the gate, so results arriving
    /// after the last handle is dropped are discarded.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("no async runtime; verification not started");
            return None;
        };
        let ticket = self.shared.ticket()?;
        Some(runtime.spawn(async move {
            let decision = ticket.run().await;
            if let Some(shared) = ticket.shared.upgrade() {
                shared.apply(ticket.generation, decision);
            }
        }))
    }

    /// Replace the dependencies. While unverified, a change supersedes any
    /// in-flight attempt and starts a new one.
    pub fn set_dependencies(&self, deps: GateDependencies) -> Option<JoinHandle<()>> {
        {
            let mut inner = self.shared.lock();
            if inner.deps == deps {
                return None;
            }
            inner.deps = deps;
            if inner.state == GateState::Verified {
                return None;
            }
            inner.next_generation();
        }
        self.start()
    }

    /// Forget any established trust. The next [`start`](Self::start) or
    /// [`attempt`](Self::attempt) requests a new token.
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        inner.state = GateState::Unverified;
        inner.next_generation();
    }

    /// Stop accepting results. In-flight attempts finish but are discarded.
    pub fn unmount(&self) {
        let mut inner = self.shared.lock();
        inner.mounted = false;
        inner.state = GateState::Unverified;
        inner.next_generation();
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.lock().mounted
    }
}

impl std::fmt::Debug for VerificationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("VerificationGate")
            .field("state", &inner.state)
            .field("deps", &inner.deps)
            .field("mounted", &inner.mounted)
            .finish_non_exhaustive()
    }
}
