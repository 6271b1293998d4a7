//! reCAPTCHA-style `siteverify` client.
//!
//! Posts `secret=<SECRET>&response=<token>` as a form body and applies the
//! [`ScorePolicy`] to the JSON reply. Every transport, status or decode
//! failure becomes [`VerifyError::ProviderUnavailable`].

use super::http_client::build_provider_client;
use super::policy::{ScorePolicy, SiteVerifyResponse};
use super::traits::ScoreVerifier;
use crate::config::VerifyConfig;
use crate::error::VerifyError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use zeroize::Zeroizing;

pub struct SiteVerifyClient {
    url: String,
    secret: Option<Zeroizing<String>>,
    policy: ScorePolicy,
    client: Client,
}

impl SiteVerifyClient {
    pub fn new(url: &str, secret: Option<&str>, policy: ScorePolicy, timeout: Duration) -> Self {
        Self {
            url: url.to_string(),
            secret: secret
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Zeroizing::new(s.to_string())),
            policy,
            client: build_provider_client(timeout),
        }
    }

    pub fn from_config(config: &VerifyConfig) -> Self {
        Self::new(
            &config.siteverify_url,
            config.secret.as_deref(),
            ScorePolicy::new(config.score_threshold),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    pub fn policy(&self) -> ScorePolicy {
        self.policy
    }

    /// Raw provider reply, without the threshold decision.
    pub async fn fetch(&self, token: &str) -> Result<SiteVerifyResponse, VerifyError> {
        let Some(secret) = self.secret.as_ref() else {
            return Err(VerifyError::MissingSecret);
        };

        let response = self
            .client
            .post(&self.url)
            .form(&[("secret", secret.as_str()), ("response", token)])
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timeout" } else { "request" };
                VerifyError::ProviderUnavailable(format!("{kind} failed"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::ProviderUnavailable(format!("status {status}")));
        }

        response
            .json::<SiteVerifyResponse>()
            .await
            .map_err(|_| VerifyError::ProviderUnavailable("malformed response body".into()))
    }
}

#[async_trait]
impl ScoreVerifier for SiteVerifyClient {
    async fn assess(&self, token: &str) -> Result<(), VerifyError> {
        let reply = self.fetch(token).await?;
        if !reply.error_codes.is_empty() {
            tracing::debug!(error_codes = ?reply.error_codes, "siteverify reported error codes");
        }
        self.policy.evaluate(&reply)
    }
}

impl std::fmt::Debug for SiteVerifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteVerifyClient")
            .field("url", &self.url)
            .field("policy", &self.policy)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}
