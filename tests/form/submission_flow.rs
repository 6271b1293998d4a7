use async_trait::async_trait;
use formguard::client::{
    AgentTokenProvider, AntiBotAgent, GateDependencies, GateState, HttpVerifyEndpoint, Readiness,
    VerificationGate,
};
use formguard::config::Config;
use formguard::form::{
    FormData, FormOptions, FormOrchestrator, GuardOutcome, Submission, SubmissionGuard,
    SubmitHandler, SubmitOutcome,
};
use formguard::transport::gateway::run_gateway_with_listener;
use formguard::verify::{ScorePolicy, SiteVerifyClient};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Agent that is ready immediately and always issues the same token.
struct StaticAgent {
    readiness: Readiness,
    token: &'static str,
}

impl StaticAgent {
    fn new(token: &'static str) -> Arc<dyn AntiBotAgent> {
        let readiness = Readiness::new();
        readiness.signal();
        Arc::new(Self { readiness, token })
    }
}

#[async_trait]
impl AntiBotAgent for StaticAgent {
    async fn ready(&self) {
        self.readiness.wait().await;
    }

    async fn execute(&self, _site_key: &str, _action: &str) -> anyhow::Result<Option<String>> {
        Ok(Some(self.token.to_string()))
    }
}

#[derive(Default)]
struct Outbox(Mutex<Vec<FormData>>);

impl SubmitHandler for Outbox {
    fn submit(&self, data: FormData) -> Submission {
        self.0
            .lock()
            .expect("outbox lock should not be poisoned")
            .push(data);
        Submission::Complete
    }
}

struct Stack {
    gateway: tokio::task::JoinHandle<anyhow::Result<()>>,
    base_url: String,
    _provider: MockServer,
}

impl Drop for Stack {
    fn drop(&mut self) {
        self.gateway.abort();
    }
}

async fn start_stack() -> Stack {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("response=good-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "score": 0.9})),
        )
        .mount(&provider)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("response=bad-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "score": 0.3})),
        )
        .mount(&provider)
        .await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral gateway listener should bind");
    let port = listener
        .local_addr()
        .expect("ephemeral gateway listener should expose local address")
        .port();
    let verifier = Arc::new(SiteVerifyClient::new(
        &format!("{}/siteverify", provider.uri()),
        Some("test-secret"),
        ScorePolicy::default(),
        Duration::from_secs(2),
    ));
    let config = Arc::new(Config::default());
    let gateway =
        tokio::spawn(async move { run_gateway_with_listener(listener, config, verifier).await });

    Stack {
        gateway,
        base_url: format!("http://127.0.0.1:{port}"),
        _provider: provider,
    }
}

fn client_config(stack: &Stack) -> Config {
    let mut config = Config::default();
    config.verify.site_key = Some("site-key".into());
    config.verify.timeout_secs = 2;
    config.form.endpoint_url = stack.base_url.clone();
    config.form.action = "submit".into();
    config.form.agent_ready_timeout_ms = 1000;
    config
}

fn gate_for(stack: &Stack, token: &'static str) -> VerificationGate {
    let config = client_config(stack);
    let tokens = AgentTokenProvider::from_config(Some(StaticAgent::new(token)), &config);
    let endpoint = HttpVerifyEndpoint::from_config(&config).expect("endpoint URL should parse");
    VerificationGate::new(
        Arc::new(tokens),
        Arc::new(endpoint),
        GateDependencies::from_config(&config),
    )
}

async fn attempt_until_settled(gate: &VerificationGate) -> GateState {
    // The gateway task may still be starting; retry briefly on refusal.
    for _ in 0..50 {
        if gate.attempt().await == GateState::Verified {
            return GateState::Verified;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    gate.state()
}

#[tokio::test(start_paused = true)]
async fn guard_fires_once_per_window() {
    let guard = SubmissionGuard::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let handler = move |_data: FormData| {
        counter.fetch_add(1, Ordering::SeqCst);
        Submission::Complete
    };
    let timeout = Duration::from_millis(1000);

    assert_eq!(
        guard.guard(FormData::new(), &handler, timeout),
        GuardOutcome::Accepted
    );

    tokio::time::advance(Duration::from_millis(500)).await;
    assert_eq!(
        guard.guard(FormData::new(), &handler, timeout),
        GuardOutcome::Absorbed
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_millis(1000)).await;
    assert_eq!(
        guard.guard(FormData::new(), &handler, timeout),
        GuardOutcome::Accepted
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn trusted_visitor_submits_through_full_stack() {
    let stack = start_stack().await;
    let gate = gate_for(&stack, "good-token");
    assert_eq!(attempt_until_settled(&gate).await, GateState::Verified);

    let outbox = Arc::new(Outbox::default());
    let options = FormOptions {
        reset: true,
        submit_timeout: Duration::from_millis(100),
    };
    let form = FormOrchestrator::new(gate, outbox.clone(), options);
    form.set_field("name", "  Ada Lovelace ");
    form.set_field("email", "ada@example.com");

    assert_eq!(form.submit(), SubmitOutcome::Submitted);
    assert!(form.fields().is_empty());

    let sent = outbox.0.lock().expect("outbox lock should not be poisoned");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["name"], json!("Ada Lovelace"));
}

#[tokio::test]
async fn low_score_visitor_is_turned_away() {
    let stack = start_stack().await;
    let gate = gate_for(&stack, "bad-token");
    assert_eq!(attempt_until_settled(&gate).await, GateState::Unverified);

    let outbox = Arc::new(Outbox::default());
    let form = FormOrchestrator::new(gate, outbox.clone(), FormOptions::default());
    form.set_field("name", "Mallory");

    assert_eq!(form.submit(), SubmitOutcome::Rejected);
    assert!(
        outbox
            .0
            .lock()
            .expect("outbox lock should not be poisoned")
            .is_empty()
    );
}

#[tokio::test]
async fn cooldown_window_reopens_in_real_time() {
    let stack = start_stack().await;
    let gate = gate_for(&stack, "good-token");
    assert_eq!(attempt_until_settled(&gate).await, GateState::Verified);

    let outbox = Arc::new(Outbox::default());
    let options = FormOptions {
        reset: false,
        submit_timeout: Duration::from_millis(50),
    };
    let form = FormOrchestrator::new(gate, outbox.clone(), options);
    form.set_field("message", "hello");
    let mut disabled = form.subscribe_disabled();

    assert_eq!(form.submit(), SubmitOutcome::Submitted);
    assert_eq!(form.submit(), SubmitOutcome::Absorbed);

    tokio::time::timeout(Duration::from_secs(2), disabled.wait_for(|flag| !*flag))
        .await
        .expect("submit control should re-enable")
        .expect("guard should still be alive");

    assert_eq!(form.submit(), SubmitOutcome::Submitted);
    assert_eq!(
        outbox
            .0
            .lock()
            .expect("outbox lock should not be poisoned")
            .len(),
        2
    );
}
