//! Threshold decision applied to scoring provider responses.

use crate::error::VerifyError;
use serde::Deserialize;

/// Default exclusive lower bound on trusted scores.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;

/// Response body of the provider's `siteverify` call.
///
/// Only `success` and `score` take part in the decision; the remaining fields
/// are kept for server-side diagnostics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteVerifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePolicy {
    threshold: f64,
}

impl ScorePolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// `success` must be true and the score strictly above the threshold.
    /// A missing score never passes.
    pub fn accepts(&self, response: &SiteVerifyResponse) -> bool {
        response.success && response.score.is_some_and(|score| score > self.threshold)
    }

    pub fn evaluate(&self, response: &SiteVerifyResponse) -> Result<(), VerifyError> {
        if self.accepts(response) {
            Ok(())
        } else {
            Err(VerifyError::LowTrust {
                success: response.success,
                score: response.score,
            })
        }
    }
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SCORE_THRESHOLD)
    }
}
