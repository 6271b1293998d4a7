use crate::app::status::render_status;
use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result, bail};
use formguard::Config;
use formguard::client::{HttpVerifyEndpoint, ProofToken, VerifyEndpoint};
use formguard::verify::SiteVerifyClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Query the scoring provider directly. Prints the verdict and exits 0 even
/// when the token is rejected.
async fn run_check(config: &Config, token: &str) -> Result<()> {
    let client = SiteVerifyClient::from_config(&config.verify);
    if !client.has_secret() {
        bail!("no verification secret configured; set FORMGUARD_SECRET_KEY");
    }

    let policy = client.policy();
    match client.fetch(token).await {
        Ok(response) => {
            let score = response
                .score
                .map_or_else(|| "(none)".to_string(), |score| format!("{score:.2}"));
            println!("success:   {}", response.success);
            println!("score:     {score}");
            println!("threshold: {}", policy.threshold());
            if let Some(action) = response.action.as_deref() {
                println!("action:    {action}");
            }
            if !response.error_codes.is_empty() {
                println!("errors:    {}", response.error_codes.join(", "));
            }
            println!("verified:  {}", policy.accepts(&response));
        }
        Err(error) => {
            println!("provider error: {error}");
            println!("verified:  false");
        }
    }
    Ok(())
}

/// Call a running endpoint exactly as a form would.
async fn run_probe(config: &Config, url: Option<String>, token: &str) -> Result<()> {
    let base = url.unwrap_or_else(|| config.form.endpoint_url.clone());
    let Some(token) = ProofToken::new(token) else {
        bail!("--token cannot be empty");
    };

    let timeout = Duration::from_secs(config.verify.timeout_secs);
    let endpoint = HttpVerifyEndpoint::new(&base, timeout)?;
    let decision = endpoint.verify(&config.gateway.verify_route, &token).await;
    println!(
        "{}",
        serde_json::to_string(&decision).context("encode trust decision")?
    );
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Arc<Config>) -> Result<()> {
    match cli.command {
        Commands::Serve { port, host } => {
            let mut config = config.as_ref().clone();
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if config.gateway.port == 0 {
                info!(
                    "Starting verification gateway on {} (random port)",
                    config.gateway.host
                );
            } else {
                info!(
                    "Starting verification gateway on {}:{}",
                    config.gateway.host, config.gateway.port
                );
            }
            formguard::transport::gateway::run_gateway(Arc::new(config)).await
        }

        Commands::Check { token } => run_check(&config, &token).await,

        Commands::Probe { url, token } => run_probe(&config, url, &token).await,

        Commands::Status => {
            println!("{}", render_status(&config));
            Ok(())
        }
    }
}
