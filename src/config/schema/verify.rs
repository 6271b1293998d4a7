use serde::{Deserialize, Serialize};

/// Google reCAPTCHA v3 verification endpoint.
pub const DEFAULT_SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Server-side scoring provider settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Scoring provider `siteverify` URL
    #[serde(default = "default_siteverify_url")]
    pub siteverify_url: String,
    /// Scores must be strictly greater than this to be trusted (default: 0.5)
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,
    /// Upper bound on the provider round-trip, in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Server-held secret. Prefer `FORMGUARD_SECRET_KEY` over writing it here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Client-exposed site key handed to the anti-bot agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_key: Option<String>,
}

fn default_siteverify_url() -> String {
    DEFAULT_SITEVERIFY_URL.into()
}

fn default_score_threshold() -> f64 {
    0.5
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            siteverify_url: default_siteverify_url(),
            score_threshold: default_score_threshold(),
            timeout_secs: default_timeout_secs(),
            secret: None,
            site_key: None,
        }
    }
}

impl std::fmt::Debug for VerifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyConfig")
            .field("siteverify_url", &self.siteverify_url)
            .field("score_threshold", &self.score_threshold)
            .field("timeout_secs", &self.timeout_secs)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("site_key", &self.site_key)
            .finish()
    }
}
