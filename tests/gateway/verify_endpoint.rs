use formguard::config::Config;
use formguard::transport::gateway::run_gateway_with_listener;
use formguard::verify::{ScorePolicy, SiteVerifyClient};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "test-secret";

struct GatewayTestServer {
    port: u16,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl GatewayTestServer {
    async fn start(provider: &MockServer) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let config = Arc::new(Config::default());
        let verifier = Arc::new(SiteVerifyClient::new(
            &format!("{}/siteverify", provider.uri()),
            Some(SECRET),
            ScorePolicy::default(),
            Duration::from_secs(2),
        ));

        let handle =
            tokio::spawn(async move { run_gateway_with_listener(listener, config, verifier).await });

        wait_until_gateway_ready(port).await;

        Self { port, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..80 {
        let health = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await;
        if matches!(health, Ok(resp) if resp.status() == StatusCode::OK) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("gateway did not become ready on port {port}");
}

async fn mount_score(provider: &MockServer, token: &str, score: f64) {
    Mock::given(method("POST"))
        .and(path("/siteverify"))
        .and(body_string_contains(format!("response={token}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "score": score})),
        )
        .expect(1)
        .mount(provider)
        .await;
}

async fn decision(response: reqwest::Response) -> Value {
    assert_eq!(response.status(), StatusCode::OK);
    response
        .json()
        .await
        .expect("verification response should be json")
}

#[tokio::test]
async fn high_score_token_is_verified() {
    let provider = MockServer::start().await;
    mount_score(&provider, "good-token", 0.9).await;
    let server = GatewayTestServer::start(&provider).await;

    let response = reqwest::Client::new()
        .get(server.url("/api/verify"))
        .header("token", "good-token")
        .send()
        .await
        .expect("verification request should complete");

    assert_eq!(decision(response).await, json!({"verified": true}));
}

#[tokio::test]
async fn low_score_token_is_not_verified() {
    let provider = MockServer::start().await;
    mount_score(&provider, "bad-token", 0.3).await;
    let server = GatewayTestServer::start(&provider).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/verify"))
        .header("token", "bad-token")
        .send()
        .await
        .expect("verification request should complete");

    assert_eq!(decision(response).await, json!({"verified": false}));
}

#[tokio::test]
async fn missing_token_header_skips_provider() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "score": 1.0})),
        )
        .expect(0)
        .mount(&provider)
        .await;
    let server = GatewayTestServer::start(&provider).await;

    let response = reqwest::Client::new()
        .get(server.url("/api/verify"))
        .send()
        .await
        .expect("verification request should complete");

    assert_eq!(decision(response).await, json!({"verified": false}));
}

#[tokio::test]
async fn provider_outage_fails_closed() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/siteverify"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&provider)
        .await;
    let server = GatewayTestServer::start(&provider).await;

    let response = reqwest::Client::new()
        .get(server.url("/api/verify"))
        .header("token", "any-token")
        .send()
        .await
        .expect("verification request should complete");

    assert_eq!(decision(response).await, json!({"verified": false}));
}

#[tokio::test]
async fn provider_details_are_not_forwarded() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/siteverify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error-codes": ["invalid-input-secret"],
            "hostname": "example.com"
        })))
        .mount(&provider)
        .await;
    let server = GatewayTestServer::start(&provider).await;

    let response = reqwest::Client::new()
        .get(server.url("/api/verify"))
        .header("token", "some-token")
        .send()
        .await
        .expect("verification request should complete");

    let body = response.text().await.expect("body should be text");
    assert_eq!(body, r#"{"verified":false}"#);
}

#[tokio::test]
async fn oversized_body_still_answers_unverified() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "score": 1.0})),
        )
        .expect(0)
        .mount(&provider)
        .await;
    let server = GatewayTestServer::start(&provider).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/verify"))
        .header("token", "good-token")
        .body(vec![b'x'; 70_000])
        .send()
        .await
        .expect("verification request should complete");

    assert_eq!(decision(response).await, json!({"verified": false}));
}

#[tokio::test]
async fn unsupported_method_answers_unverified() {
    let provider = MockServer::start().await;
    let server = GatewayTestServer::start(&provider).await;

    let response = reqwest::Client::new()
        .put(server.url("/api/verify"))
        .header("token", "good-token")
        .send()
        .await
        .expect("verification request should complete");

    assert_eq!(decision(response).await, json!({"verified": false}));
}
