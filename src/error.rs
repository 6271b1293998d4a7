use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `formguard`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; the binary and server startup continue to
/// use `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum GuardError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Score verification ──────────────────────────────────────────────
    #[error("verify: {0}")]
    Verify(#[from] VerifyError),

    // ── Gateway ─────────────────────────────────────────────────────────
    #[error("gateway: {0}")]
    Gateway(#[from] GatewayError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Verification errors ────────────────────────────────────────────────────

/// Reasons a proof token did not yield trust.
///
/// These never reach the client: the verification endpoint folds every
/// variant into `{"verified": false}` and only logs the reason.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("no usable proof token on the request")]
    MissingProof,

    #[error("scoring provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("scoring provider rejected token (success={success}, score={score:?})")]
    LowTrust { success: bool, score: Option<f64> },

    #[error("no verification secret configured")]
    MissingSecret,
}

impl VerifyError {
    /// Short machine-readable reason for structured log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingProof => "missing_proof",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::LowTrust { .. } => "low_trust",
            Self::MissingSecret => "missing_secret",
        }
    }
}

// ─── Gateway errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("refusing public bind on {host} without allow_public_bind")]
    PublicBind { host: String },

    #[error("invalid verify route {0:?}: must start with '/'")]
    Route(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, GuardError>;
