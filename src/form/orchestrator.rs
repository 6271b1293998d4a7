use super::data::{FormData, trim_strings};
use super::guard::{GuardOutcome, SubmissionGuard, SubmitHandler};
use super::notify::{Notifier, TracingNotifier};
use super::validate::{AcceptAll, FieldError, FieldValidator};
use crate::client::VerificationGate;
use crate::config::FormConfig;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// Shown to the user when a submit is attempted before trust is established.
pub const TRUST_REJECTION_MESSAGE: &str = "Request denied. Trust check failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormOptions {
    /// Restore field defaults after every validated submit.
    pub reset: bool,
    /// How long the submit button stays locked after an accepted submit.
    pub submit_timeout: Duration,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            reset: true,
            submit_timeout: Duration::from_millis(1000),
        }
    }
}

impl From<&FormConfig> for FormOptions {
    fn from(config: &FormConfig) -> Self {
        Self {
            reset: config.reset,
            submit_timeout: config.submit_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Field validation failed; nothing else happened.
    Invalid(Vec<FieldError>),
    /// The gate is not verified; the user was told.
    Rejected,
    /// The submit callback ran.
    Submitted,
    /// A previous submission is still in flight.
    Absorbed,
}

/// Ties a form's fields to its verification gate and submission guard.
///
/// Dropping the orchestrator unmounts the gate.
pub struct FormOrchestrator {
    gate: VerificationGate,
    guard: SubmissionGuard,
    handler: Arc<dyn SubmitHandler>,
    validator: Arc<dyn FieldValidator>,
    notifier: Arc<dyn Notifier>,
    options: FormOptions,
    defaults: FormData,
    fields: Mutex<FormData>,
}

impl FormOrchestrator {
    /// Mount the form. Verification starts in the background right away, so
    /// call this from within a tokio runtime; outside one the host must drive
    /// [`VerificationGate::attempt`] itself.
    pub fn new(
        gate: VerificationGate,
        handler: Arc<dyn SubmitHandler>,
        options: FormOptions,
    ) -> Self {
        gate.start();
        Self {
            gate,
            guard: SubmissionGuard::new(),
            handler,
            validator: Arc::new(AcceptAll),
            notifier: Arc::new(TracingNotifier),
            options,
            defaults: FormData::new(),
            fields: Mutex::new(FormData::new()),
        }
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn FieldValidator>) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Initial field values, also restored on reset.
    #[must_use]
    pub fn with_defaults(mut self, defaults: FormData) -> Self {
        *self
            .fields
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = defaults.clone();
        self.defaults = defaults;
        self
    }

    fn fields_lock(&self) -> MutexGuard<'_, FormData> {
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_field(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields_lock().insert(name.into(), value.into());
    }

    pub fn fields(&self) -> FormData {
        self.fields_lock().clone()
    }

    pub fn gate(&self) -> &VerificationGate {
        &self.gate
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    /// Forget established trust and request a fresh token in the background.
    pub fn reset_trust(&self) {
        self.gate.reset();
        self.gate.start();
    }

    /// Submit the current field values.
    pub fn submit(&self) -> SubmitOutcome {
        let data = self.fields();
        self.submit_with(data)
    }

    /// Submit `data` as if it were the form's current values.
    pub fn submit_with(&self, data: FormData) -> SubmitOutcome {
        if let Err(errors) = self.validator.validate(&data) {
            tracing::debug!(invalid_fields = errors.len(), "form validation failed");
            return SubmitOutcome::Invalid(errors);
        }

        let data = trim_strings(data);
        if self.options.reset {
            *self.fields_lock() = self.defaults.clone();
        }

        if !self.gate.is_verified() {
            self.notifier.error(TRUST_REJECTION_MESSAGE);
            return SubmitOutcome::Rejected;
        }

        match self
            .guard
            .guard(data, self.handler.as_ref(), self.options.submit_timeout)
        {
            GuardOutcome::Accepted => SubmitOutcome::Submitted,
            GuardOutcome::Absorbed => SubmitOutcome::Absorbed,
        }
    }

    /// Whether the submit control should be disabled right now.
    pub fn submit_disabled(&self) -> bool {
        self.guard.is_in_flight()
    }

    pub fn subscribe_disabled(&self) -> watch::Receiver<bool> {
        self.guard.subscribe()
    }
}

impl Drop for FormOrchestrator {
    fn drop(&mut self) {
        self.gate.unmount();
    }
}

impl std::fmt::Debug for FormOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormOrchestrator")
            .field("gate", &self.gate)
            .field("guard", &self.guard)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
