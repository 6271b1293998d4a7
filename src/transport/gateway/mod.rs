//! Axum-based HTTP gateway serving the verification endpoint.
//!
//! - `GET|POST <verify_route>` exchanges the `token` header for `{"verified": bool}`
//! - Every outcome, including malformed input and provider failure, answers 200
//! - Request body size limits (64KB max) and request timeouts (30s)
//! - Optional CORS allow-list for browser callers

mod handlers;
mod server;

pub use server::{build_app, run_gateway, run_gateway_with_listener};

use crate::verify::ScoreVerifier;
use std::sync::Arc;
use std::time::Duration;

/// Maximum request body size (64KB) -- the endpoint reads headers only
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s) -- prevents slow-loris attacks
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Request header carrying the proof token
pub const TOKEN_HEADER: &str = "token";

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn ScoreVerifier>,
    /// Upper bound on a single verifier call; expiry counts as untrusted
    pub verify_timeout: Duration,
}

/// Longest verifier call allowed, kept under the request timeout so the
/// handler always answers first.
pub const MAX_VERIFY_TIMEOUT: Duration = Duration::from_secs(REQUEST_TIMEOUT_SECS - 1);

impl AppState {
    /// `verify_timeout` is capped at [`MAX_VERIFY_TIMEOUT`].
    pub fn new(verifier: Arc<dyn ScoreVerifier>, verify_timeout: Duration) -> Self {
        Self {
            verifier,
            verify_timeout: verify_timeout.min(MAX_VERIFY_TIMEOUT),
        }
    }
}
