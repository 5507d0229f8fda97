//! Ports long poll.

use async_trait::async_trait;
use bobdsp_types::protocol::PortsResponse;
use bobdsp_types::{Port, PortList};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::client::BobDspClient;
use crate::error::ClientError;
use crate::poll::{self, PollHandle, PollLane};
use crate::transport::Transport;

/// Mirrors the host's port list with the same fetch/wait/backoff cycle as
/// [`crate::SyncSession`], keyed by `index`/`uuid` instead of versions.
pub struct PortWatcher<T: Transport> {
    api: Arc<BobDspClient<T>>,
    ports: Arc<Mutex<PortList>>,
}

impl<T: Transport> PortWatcher<T> {
    pub fn new(api: Arc<BobDspClient<T>>) -> Self {
        Self {
            api,
            ports: Arc::new(Mutex::new(PortList::new())),
        }
    }

    /// Shared handle to the mirrored list; stays valid after [`Self::spawn`].
    pub fn port_list(&self) -> Arc<Mutex<PortList>> {
        self.ports.clone()
    }

    pub fn ports(&self) -> Vec<Port> {
        self.ports.lock().ports().to_vec()
    }

    pub fn select_output(&self, name: &str) -> bool {
        self.ports.lock().select_output(name)
    }

    pub fn select_input(&self, name: &str) -> bool {
        self.ports.lock().select_input(name)
    }

    pub fn selected(&self) -> (Option<String>, Option<String>) {
        let ports = self.ports.lock();
        (
            ports.selected_output().map(str::to_string),
            ports.selected_input().map(str::to_string),
        )
    }

    pub fn spawn(self) -> PollHandle {
        let backoff = self.api.config().backoff;
        poll::spawn(Arc::new(self), backoff)
    }
}

#[async_trait]
impl<T: Transport> PollLane for PortWatcher<T> {
    type Payload = PortsResponse;

    fn name(&self) -> &'static str {
        "ports"
    }

    async fn fetch(&self) -> Result<PortsResponse, ClientError> {
        self.api.fetch_ports().await
    }

    async fn wait(&self) -> Result<PortsResponse, ClientError> {
        let (index, uuid) = {
            let ports = self.ports.lock();
            (ports.index(), ports.uuid().to_string())
        };
        self.api.wait_ports(index, &uuid).await
    }

    fn apply(&self, payload: PortsResponse) -> Result<(), ClientError> {
        let index = payload.index;
        let mut ports = self.ports.lock();
        if ports.apply(payload)? {
            tracing::info!("Port list {} now has {} ports", index, ports.ports().len());
        }
        Ok(())
    }

    fn reset(&self) {
        self.ports.lock().reset();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::testing::{Method, Reply, ScriptedTransport};
    use crate::transport::Endpoint;
    use serde_json::json;
    use std::time::Duration;

    fn ports_doc(index: i64, uuid: &str, names: &[(&str, &str)]) -> serde_json::Value {
        let ports: Vec<_> = names
            .iter()
            .map(|(name, direction)| json!({"name": name, "direction": direction}))
            .collect();
        json!({"index": index, "uuid": uuid, "ports": ports})
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_then_wait_with_stamps() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on_get(
            Endpoint::Ports,
            Reply::json(ports_doc(
                4,
                "u1",
                &[("system:capture_1", "output"), ("system:playback_1", "input")],
            )),
        );
        transport.on_post(
            Endpoint::Ports,
            Reply::json(ports_doc(5, "u1", &[("system:capture_1", "output")])).after(Duration::from_secs(2)),
        );

        let api = Arc::new(BobDspClient::new(transport.clone(), SyncConfig::default()));
        let watcher = PortWatcher::new(api);
        assert!(!watcher.select_output("system:capture_1"));
        let list = watcher.port_list();
        let handle = watcher.spawn();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(list.lock().ports().len(), 2);
        assert!(list.lock().select_output("system:capture_1"));
        assert!(list.lock().select_input("system:playback_1"));

        tokio::time::sleep(Duration::from_secs(3)).await;
        let posts = transport.posts(Endpoint::Ports);
        assert_eq!(posts[0], json!({"timeout": 60000, "index": 4, "uuid": "u1"}));
        assert_eq!(posts[1], json!({"timeout": 60000, "index": 5, "uuid": "u1"}));

        let list = list.lock();
        assert_eq!(list.ports().len(), 1);
        assert_eq!(list.selected_output(), Some("system:capture_1"));
        assert_eq!(list.selected_input(), None);
        drop(list);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_resets_and_refetches() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .on_get(Endpoint::Ports, Reply::json(ports_doc(1, "u1", &[("a:out", "output")])))
            .on_get(Endpoint::Ports, Reply::json(ports_doc(1, "u2", &[("b:out", "output")])));
        transport.on_post(Endpoint::Ports, Reply::fail());

        let api = Arc::new(BobDspClient::new(transport.clone(), SyncConfig::default()));
        let watcher = PortWatcher::new(api);
        let list = watcher.port_list();
        let handle = watcher.spawn();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(list.lock().ports().is_empty());
        assert_eq!(list.lock().index(), -1);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(transport.count(Method::Get, Endpoint::Ports), 2);
        assert_eq!(list.lock().uuid(), "u2");
        assert_eq!(list.lock().ports()[0].name, "b:out");
        handle.shutdown().await;
    }
}
