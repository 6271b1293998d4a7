//! Single-flight submission guard.
//!
//! `Idle —(submit)→ InFlight —(timeout)→ Idle`. While in flight every call is
//! absorbed silently. Re-arming is purely time-based: it does not wait for the
//! submit callback to finish, so a callback slower than the window can run
//! again for a later submit. That race is accepted.

use super::data::FormData;
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// What a submit callback hands back to the guard.
pub enum Submission {
    /// The work finished synchronously.
    Complete,
    /// Work continues in the background; the guard spawns it and logs failure.
    Pending(BoxFuture<'static, anyhow::Result<()>>),
}

impl Submission {
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }
}

impl From<()> for Submission {
    fn from((): ()) -> Self {
        Self::Complete
    }
}

/// The downstream action (e.g. sending an email) run once per accepted submit.
pub trait SubmitHandler: Send + Sync {
    fn submit(&self, data: FormData) -> Submission;
}

impl<F> SubmitHandler for F
where
    F: Fn(FormData) -> Submission + Send + Sync,
{
    fn submit(&self, data: FormData) -> Submission {
        self(data)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The callback ran and the window is now open.
    Accepted,
    /// A submission is already in flight; nothing happened.
    Absorbed,
}

struct GuardInner {
    state: SubmissionState,
    until: Option<Instant>,
    rearm: Option<JoinHandle<()>>,
}

impl GuardInner {
    /// Treat an expired window as idle even if the re-arm task has not run.
    fn settle(&mut self, now: Instant) {
        if self.state == SubmissionState::InFlight && self.until.is_none_or(|until| now >= until) {
            self.state = SubmissionState::Idle;
            self.until = None;
        }
    }
}

pub struct SubmissionGuard {
    inner: Arc<Mutex<GuardInner>>,
    in_flight: Arc<watch::Sender<bool>>,
}

fn lock(inner: &Mutex<GuardInner>) -> MutexGuard<'_, GuardInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SubmissionGuard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Mutex::new(GuardInner {
                state: SubmissionState::Idle,
                until: None,
                rearm: None,
            })),
            in_flight: Arc::new(tx),
        }
    }

    pub fn state(&self) -> SubmissionState {
        let mut inner = lock(&self.inner);
        inner.settle(Instant::now());
        inner.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.state() == SubmissionState::InFlight
    }

    /// Follows the in-flight flag, e.g. to disable a submit button.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.in_flight.subscribe()
    }

    /// Run `handler` with `data` unless a submission is already in flight.
    ///
    /// The handler is invoked synchronously before this returns. The guard
    /// re-arms `timeout` after acceptance regardless of how the handler fares.
    pub fn guard(
        &self,
        data: FormData,
        handler: &dyn SubmitHandler,
        timeout: Duration,
    ) -> GuardOutcome {
        let runtime = Handle::try_current().ok();
        {
            let now = Instant::now();
            let mut inner = lock(&self.inner);
            inner.settle(now);
            if inner.state == SubmissionState::InFlight {
                tracing::debug!("duplicate submission absorbed");
                return GuardOutcome::Absorbed;
            }

            let deadline = now + timeout;
            inner.state = SubmissionState::InFlight;
            inner.until = Some(deadline);
            if let Some(previous) = inner.rearm.take() {
                previous.abort();
            }
            inner.rearm = runtime.as_ref().map(|rt| {
                rt.spawn(rearm_at(
                    deadline,
                    Arc::downgrade(&self.inner),
                    Arc::clone(&self.in_flight),
                ))
            });
        }
        self.in_flight.send_replace(true);

        match handler.submit(data) {
            Submission::Complete => {}
            Submission::Pending(work) => match runtime {
                Some(rt) => {
                    rt.spawn(async move {
                        if let Err(error) = work.await {
                            tracing::warn!("submit callback failed: {error:#}");
                        }
                    });
                }
                None => tracing::warn!("no async runtime; pending submission dropped"),
            },
        }

        GuardOutcome::Accepted
    }
}

async fn rearm_at(
    deadline: Instant,
    inner: Weak<Mutex<GuardInner>>,
    in_flight: Arc<watch::Sender<bool>>,
) {
    tokio::time::sleep_until(deadline).await;
    let Some(inner) = inner.upgrade() else {
        return;
    };
    {
        let mut inner = lock(&inner);
        if inner.until != Some(deadline) {
            return;
        }
        inner.state = SubmissionState::Idle;
        inner.until = None;
        inner.rearm = None;
    }
    in_flight.send_replace(false);
}

impl Default for SubmissionGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        if let Some(rearm) = lock(&self.inner).rearm.take() {
            rearm.abort();
        }
    }
}

impl std::fmt::Debug for SubmissionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionGuard")
            .field("state", &lock(&self.inner).state)
            .finish_non_exhaustive()
    }
}
