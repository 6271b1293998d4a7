//! Form-side submission flow: value normalization, the single-flight
//! submission guard, and the orchestrator tying them to the verification gate.

mod data;
mod guard;
mod notify;
mod orchestrator;
mod validate;

pub use data::{FormData, trim_strings};
pub use guard::{GuardOutcome, Submission, SubmissionGuard, SubmissionState, SubmitHandler};
pub use notify::{Notifier, TracingNotifier};
pub use orchestrator::{FormOptions, FormOrchestrator, SubmitOutcome, TRUST_REJECTION_MESSAGE};
pub use validate::{AcceptAll, FieldError, FieldValidator};
