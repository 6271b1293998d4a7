use crate::error::VerifyError;
use async_trait::async_trait;

/// Exchanges a proof token for a trust decision.
#[async_trait]
pub trait ScoreVerifier: Send + Sync {
    /// `Ok(())` when the token is trusted; the error carries the reason it
    /// was not, for server-side logging only.
    async fn assess(&self, token: &str) -> Result<(), VerifyError>;

    async fn check(&self, token: &str) -> bool {
        self.assess(token).await.is_ok()
    }
}
