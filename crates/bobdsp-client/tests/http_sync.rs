#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::expect_used, reason = "panics are the assertion mechanism in integration tests")]

use bobdsp_client::{BobDspClient, ClientMirror, HttpTransport, SyncConfig, SyncSession, UpdateCoalescer};
use bobdsp_types::ControlEdit;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn clients_body(control_version: i64, gain: f64) -> serde_json::Value {
    serde_json::json!({
        "clientVersion": 3,
        "controlVersion": control_version,
        "sessionId": "s1",
        "clients": [{
            "name": "eq",
            "instances": 1,
            "controls": [
                {"name": "gain", "value": gain, "lowerbound": -12.0, "upperbound": 12.0}
            ]
        }]
    })
}

fn short_config() -> SyncConfig {
    SyncConfig {
        fetch_timeout: Duration::from_secs(2),
        wait_timeout: Duration::from_millis(300),
        wait_margin: Duration::from_millis(200),
        backoff: Duration::from_millis(50),
        ..SyncConfig::default()
    }
}

async fn setup_server() -> (MockServer, Arc<BobDspClient>) {
    let server = MockServer::start().await;
    let transport = HttpTransport::new(&server.uri()).expect("valid url");
    let api = Arc::new(BobDspClient::new(transport, short_config()));
    (server, api)
}

async fn eventually(what: &str, check: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while !check() {
        assert!(tokio::time::Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_session_follows_control_changes() {
    let (server, api) = setup_server().await;
    Mock::given(method("GET"))
        .and(path("/clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(clients_body(7, 0.0)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/clients"))
        .and(body_partial_json(serde_json::json!({
            "action": "wait",
            "timeout": 300,
            "controlVersion": 7,
            "sessionId": "s1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(clients_body(8, -3.0)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/clients"))
        .and(body_partial_json(serde_json::json!({"action": "wait", "controlVersion": 8})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"clientVersion": 3, "controlVersion": 8, "sessionId": "s1"}))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let mirror = ClientMirror::new();
    let handle = SyncSession::new(api, mirror.clone()).spawn();

    let gain = || mirror.with_clients(|c| c.control("eq", "gain").map(|g| g.value()));
    eventually("merged gain", || gain() == Some(-3.0)).await;
    assert_eq!(mirror.versions().control_version, 8);

    handle.stop();
}

#[tokio::test]
async fn test_session_recovers_from_server_error() {
    let (server, api) = setup_server().await;
    Mock::given(method("GET"))
        .and(path("/clients"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(clients_body(7, 1.0)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/clients"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(clients_body(7, 1.0))
                .set_delay(Duration::from_secs(1)),
        )
        .mount(&server)
        .await;

    let mirror = ClientMirror::new();
    let handle = SyncSession::new(api, mirror.clone()).spawn();

    eventually("first successful fetch", || !mirror.clients().is_empty()).await;
    let fetches = server
        .received_requests()
        .await
        .expect("recording enabled")
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(fetches, 3);

    handle.stop();
}

#[tokio::test]
async fn test_coalescer_sends_one_update() {
    let (server, api) = setup_server().await;
    Mock::given(method("GET"))
        .and(path("/clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(clients_body(7, 0.0)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/clients"))
        .and(body_json(serde_json::json!({"clients": [{
            "action": "update",
            "name": "eq",
            "instances": 2,
            "controls": [{"name": "gain", "value": 6.0}]
        }]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(clients_body(8, 6.0)))
        .expect(1)
        .mount(&server)
        .await;

    let mirror = ClientMirror::new();
    let snapshot = api.fetch_clients().await.expect("fetch clients");
    mirror.apply_response(&snapshot).expect("valid snapshot");

    let updates = UpdateCoalescer::new(api, mirror.clone());
    for value in [2.0, 4.0, 6.0] {
        updates
            .edit("eq", "gain", ControlEdit::Value(value))
            .expect("known control");
    }
    updates
        .edit("eq", "instances", ControlEdit::Value(2.0))
        .expect("known control");
    updates.flush().await.expect("flush");

    assert!(!mirror.has_dirty());
    assert_eq!(mirror.versions().control_version, 8);
    server.verify().await;
}
