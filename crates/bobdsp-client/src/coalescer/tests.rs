use super::*;
use crate::config::SyncConfig;
use crate::testing::{clients_doc, Method, Reply, ScriptedTransport};
use crate::transport::Endpoint;
use bobdsp_types::protocol::ClientsResponse;
use serde_json::json;

fn seeded_mirror() -> ClientMirror {
    let mirror = ClientMirror::new();
    let response: ClientsResponse = serde_json::from_value(clients_doc(3, 7, "s1", 0.0)).unwrap();
    mirror.apply_response(&response).unwrap();
    mirror
}

fn coalescer(transport: &Arc<ScriptedTransport>, config: SyncConfig) -> (UpdateCoalescer<Arc<ScriptedTransport>>, ClientMirror) {
    let mirror = seeded_mirror();
    let api = Arc::new(BobDspClient::new(transport.clone(), config));
    (UpdateCoalescer::new(api, mirror.clone()), mirror)
}

fn gain(mirror: &ClientMirror) -> f64 {
    mirror.with_clients(|c| c.control("eq", "gain").unwrap().value())
}

fn sent_controls(body: &serde_json::Value) -> serde_json::Value {
    body["clients"][0]["controls"].clone()
}

#[tokio::test(start_paused = true)]
async fn test_burst_sends_final_value_once() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on_post(Endpoint::Clients, Reply::json(clients_doc(3, 8, "s1", -3.0)));
    let (updates, mirror) = coalescer(&transport, SyncConfig::default());

    for value in [-1.0, -2.0, -3.0] {
        assert!(updates.edit("eq", "gain", ControlEdit::Value(value)).unwrap());
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    let posts = transport.posts(Endpoint::Clients);
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0],
        json!({"clients": [{
            "action": "update",
            "name": "eq",
            "controls": [{"name": "gain", "value": -3.0}]
        }]})
    );
    assert_eq!(gain(&mirror), -3.0);
    assert!(!mirror.has_dirty());
    assert!(!updates.is_sending());
    assert_eq!(mirror.versions().control_version, 8);
}

#[tokio::test(start_paused = true)]
async fn test_edits_inside_debounce_window_wait_for_it() {
    let start = Instant::now();
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .on_post(Endpoint::Clients, Reply::json(clients_doc(3, 8, "s1", -1.0)))
        .on_post(Endpoint::Clients, Reply::json(clients_doc(3, 9, "s1", -6.0)));
    let (updates, mirror) = coalescer(&transport, SyncConfig::default());

    updates.edit("eq", "gain", ControlEdit::Value(-1.0)).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    updates.edit("eq", "gain", ControlEdit::Value(-5.0)).unwrap();
    updates.edit("eq", "gain", ControlEdit::Value(-6.0)).unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(transport.count(Method::Post, Endpoint::Clients), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].at - requests[0].at >= Duration::from_millis(50));
    assert!(requests[0].at - start < Duration::from_millis(5));
    assert_eq!(
        sent_controls(requests[1].body.as_ref().unwrap()),
        json!([{"name": "gain", "value": -6.0}])
    );
    assert_eq!(gain(&mirror), -6.0);
}

#[tokio::test(start_paused = true)]
async fn test_edit_during_send_goes_out_next_and_wins_locally() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .on_post(
            Endpoint::Clients,
            Reply::json(clients_doc(3, 8, "s1", -1.0)).after(Duration::from_millis(200)),
        )
        .on_post(Endpoint::Clients, Reply::json(clients_doc(3, 9, "s1", -8.0)));
    let (updates, mirror) = coalescer(&transport, SyncConfig::default());

    updates.edit("eq", "gain", ControlEdit::Value(-1.0)).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(updates.is_sending());
    updates.edit("eq", "gain", ControlEdit::Value(-7.0)).unwrap();
    updates.edit("eq", "gain", ControlEdit::Value(-8.0)).unwrap();
    assert_eq!(transport.count(Method::Post, Endpoint::Clients), 1);

    // first response echoes -1 while -8 is still pending
    tokio::time::sleep(Duration::from_millis(101)).await;
    assert_eq!(gain(&mirror), -8.0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let posts = transport.posts(Endpoint::Clients);
    assert_eq!(posts.len(), 2);
    assert_eq!(sent_controls(&posts[1]), json!([{"name": "gain", "value": -8.0}]));
    assert_eq!(gain(&mirror), -8.0);
    assert!(!mirror.has_dirty());
}

#[tokio::test(start_paused = true)]
async fn test_nothing_dirty_sends_nothing() {
    let transport = Arc::new(ScriptedTransport::new());
    let (updates, mirror) = coalescer(&transport, SyncConfig::default());

    updates.request_send();
    assert!(!updates.edit("eq", "gain", ControlEdit::Value(0.0)).unwrap());
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(transport.requests().is_empty());
    assert!(!updates.is_sending());
    assert!(!mirror.has_dirty());
    updates.flush().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_unknown_control_is_rejected() {
    let transport = Arc::new(ScriptedTransport::new());
    let (updates, _mirror) = coalescer(&transport, SyncConfig::default());

    assert_eq!(
        updates.edit("nope", "gain", ControlEdit::Value(1.0)),
        Err(ProtocolError::UnknownClient("nope".to_string()))
    );
    assert!(matches!(
        updates.edit("eq", "nope", ControlEdit::Value(1.0)),
        Err(ProtocolError::UnknownControl { .. })
    ));
    assert!(!updates.is_sending());
}

#[tokio::test(start_paused = true)]
async fn test_failed_send_is_dropped() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on_post(Endpoint::Clients, Reply::fail());
    let (updates, mirror) = coalescer(&transport, SyncConfig::default());

    updates.edit("eq", "gain", ControlEdit::Value(-4.0)).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(transport.count(Method::Post, Endpoint::Clients), 1);
    assert!(!mirror.has_dirty());
    assert_eq!(gain(&mirror), -4.0);
    assert!(!updates.is_sending());
}

#[tokio::test(start_paused = true)]
async fn test_failed_send_is_rearmed() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .on_post(Endpoint::Clients, Reply::fail())
        .on_post(Endpoint::Clients, Reply::json(clients_doc(3, 8, "s1", -4.0)));
    let config = SyncConfig {
        send_failure: SendFailurePolicy::Rearm,
        ..SyncConfig::default()
    };
    let (updates, mirror) = coalescer(&transport, config);

    updates.edit("eq", "gain", ControlEdit::Value(-4.0)).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(transport.count(Method::Post, Endpoint::Clients), 1);
    assert!(mirror.has_dirty());

    updates.edit("eq", "bypass", ControlEdit::Toggle(true)).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let posts = transport.posts(Endpoint::Clients);
    assert_eq!(posts.len(), 2);
    assert_eq!(
        sent_controls(&posts[1]),
        json!([{"name": "gain", "value": -4.0}, {"name": "bypass", "value": 1.0}])
    );
}

#[tokio::test(start_paused = true)]
async fn test_flush_waits_for_delivery() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on_post(
        Endpoint::Clients,
        Reply::json(clients_doc(3, 8, "s1", 2.0)).after(Duration::from_millis(300)),
    );
    let (updates, mirror) = coalescer(&transport, SyncConfig::default());

    updates.edit("eq", "gain", ControlEdit::Value(2.0)).unwrap();
    updates.flush().await.unwrap();

    assert_eq!(transport.count(Method::Post, Endpoint::Clients), 1);
    assert!(!mirror.has_dirty());
    assert!(!updates.is_sending());
}

#[tokio::test(start_paused = true)]
async fn test_flush_reports_failure() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on_post(Endpoint::Clients, Reply::fail());
    let (updates, _mirror) = coalescer(&transport, SyncConfig::default());

    updates.edit("eq", "gain", ControlEdit::Value(2.0)).unwrap();
    assert!(matches!(updates.flush().await, Err(ClientError::SendFailed(_))));
}
