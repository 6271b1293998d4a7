use reqwest::Client;
use std::time::Duration;

/// Shared client for the scoring provider. The overall timeout bounds the
/// whole round-trip so a stalled provider fails closed.
pub fn build_provider_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|error| {
            tracing::warn!("provider client build failed, using defaults without timeout: {error}");
            Client::new()
        })
}
