use super::token::ProofToken;
use crate::config::Config;
use crate::transport::gateway::TOKEN_HEADER;
use crate::verify::TrustDecision;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// The verification endpoint as seen from the form.
#[async_trait]
pub trait VerifyEndpoint: Send + Sync {
    /// Any failure reaching or decoding the endpoint is `verified: false`.
    async fn verify(&self, route: &str, token: &ProofToken) -> TrustDecision;
}

/// Calls a running verification gateway over HTTP.
pub struct HttpVerifyEndpoint {
    base: Url,
    client: Client,
}

impl HttpVerifyEndpoint {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = Url::parse(base_url).context("parse verification endpoint URL")?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build verification endpoint client")?;
        Ok(Self { base, client })
    }

    /// `form.endpoint_url`, bounded by `verify.timeout_secs`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            &config.form.endpoint_url,
            Duration::from_secs(config.verify.timeout_secs),
        )
    }

    fn route_url(&self, route: &str) -> Option<Url> {
        self.base.join(route).ok()
    }
}

#[async_trait]
impl VerifyEndpoint for HttpVerifyEndpoint {
    async fn verify(&self, route: &str, token: &ProofToken) -> TrustDecision {
        let Some(url) = self.route_url(route) else {
            tracing::warn!(route, "verification route does not form a valid URL");
            return TrustDecision::rejected();
        };

        let response = match self
            .client
            .get(url)
            .header(TOKEN_HEADER, token.as_str())
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!("verification endpoint unreachable: {error}");
                return TrustDecision::rejected();
            }
        };

        response
            .json::<TrustDecision>()
            .await
            .unwrap_or_else(|error| {
                tracing::debug!("verification endpoint reply unreadable: {error}");
                TrustDecision::rejected()
            })
    }
}
