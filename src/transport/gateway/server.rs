use super::handlers::{fail_closed, handle_health, handle_verify};
use super::{AppState, MAX_BODY_SIZE, REQUEST_TIMEOUT_SECS, TOKEN_HEADER};

use crate::config::Config;
use crate::error::GatewayError;
use crate::verify::{ScoreVerifier, SiteVerifyClient};
use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderName, Method, StatusCode, header},
    middleware,
    routing::get,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};

/// Returns true when the bind address is not a loopback address.
fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM.
pub async fn run_gateway(config: Arc<Config>) -> Result<()> {
    let host = config.gateway.host.as_str();
    if is_public_bind(host) && !config.gateway.allow_public_bind {
        return Err(GatewayError::PublicBind {
            host: host.to_string(),
        })
        .context("set [gateway] allow_public_bind = true to expose the endpoint");
    }

    let addr: SocketAddr = format!("{host}:{}", config.gateway.port)
        .parse()
        .context("parse gateway bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    let verifier = build_verifier(&config);
    let app = prepare_app(&listener, &config, verifier)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP gateway")?;

    info!("gateway shut down");
    Ok(())
}

/// Serve on a pre-bound listener with a caller-supplied verifier.
pub async fn run_gateway_with_listener(
    listener: TcpListener,
    config: Arc<Config>,
    verifier: Arc<dyn ScoreVerifier>,
) -> Result<()> {
    let app = prepare_app(&listener, &config, verifier)?;
    axum::serve(listener, app)
        .await
        .context("serve HTTP gateway")?;
    Ok(())
}

fn build_verifier(config: &Config) -> Arc<dyn ScoreVerifier> {
    let client = SiteVerifyClient::from_config(&config.verify);
    if !client.has_secret() {
        warn!("no verification secret configured; every token will be rejected");
    }
    Arc::new(client)
}

fn prepare_app(
    listener: &TcpListener,
    config: &Config,
    verifier: Arc<dyn ScoreVerifier>,
) -> Result<Router> {
    let route = config.gateway.verify_route.as_str();
    if !route.starts_with('/') {
        return Err(GatewayError::Route(route.to_string()).into());
    }

    let local = listener
        .local_addr()
        .context("get gateway listener local address")?;
    print_gateway_banner(&local.to_string(), route);

    let state = AppState::new(
        verifier,
        Duration::from_secs(config.verify.timeout_secs),
    );
    Ok(build_app(state, route, &config.gateway.cors_origins))
}

fn print_gateway_banner(display_addr: &str, route: &str) {
    println!("Verification gateway listening on {display_addr}");
    println!("  GET  {route}");
    println!("  POST {route}");
    println!("  GET  /health");
    info!(addr = display_addr, route, "gateway started");
}

pub fn build_app(state: AppState, verify_route: &str, cors_origins: &[String]) -> Router {
    let verify = Router::new()
        .route(verify_route, get(handle_verify).post(handle_verify))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(request_timeout())
        .layer(middleware::map_response(fail_closed));

    let mut app = Router::new()
        .route("/health", get(handle_health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(request_timeout())
        .merge(verify)
        .with_state(state);

    if !cors_origins.is_empty() {
        let origins: Vec<_> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(TOKEN_HEADER)])
                .max_age(Duration::from_secs(60 * 60)),
        );
    }

    app
}

fn request_timeout() -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(REQUEST_TIMEOUT_SECS),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(error) => {
                warn!("failed to install SIGTERM handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
