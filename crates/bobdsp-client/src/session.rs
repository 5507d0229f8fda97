//! Clients long poll.

use async_trait::async_trait;
use bobdsp_types::protocol::ClientsResponse;
use bobdsp_types::ApplyOutcome;
use std::sync::Arc;

use crate::client::BobDspClient;
use crate::error::ClientError;
use crate::mirror::ClientMirror;
use crate::plugins::PluginCatalog;
use crate::poll::{self, PollHandle, PollLane};
use crate::transport::Transport;

/// Keeps a [`ClientMirror`] in step with the host.
///
/// Fetches the full client list, then long-polls with the held stamps for as
/// long as the session runs. Any failure or timeout clears the mirror and
/// resyncs after the configured backoff.
pub struct SyncSession<T: Transport> {
    api: Arc<BobDspClient<T>>,
    mirror: ClientMirror,
    catalog: Option<Arc<PluginCatalog<T>>>,
}

impl<T: Transport> SyncSession<T> {
    pub fn new(api: Arc<BobDspClient<T>>, mirror: ClientMirror) -> Self {
        Self {
            api,
            mirror,
            catalog: None,
        }
    }

    /// Drops the catalog's cache whenever the host restarts.
    pub fn with_plugin_catalog(mut self, catalog: Arc<PluginCatalog<T>>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn mirror(&self) -> &ClientMirror {
        &self.mirror
    }

    /// Starts the poll loop on the current runtime.
    pub fn spawn(self) -> PollHandle {
        let backoff = self.api.config().backoff;
        poll::spawn(Arc::new(self), backoff)
    }
}

#[async_trait]
impl<T: Transport> PollLane for SyncSession<T> {
    type Payload = ClientsResponse;

    fn name(&self) -> &'static str {
        "clients"
    }

    async fn fetch(&self) -> Result<ClientsResponse, ClientError> {
        self.api.fetch_clients().await
    }

    async fn wait(&self) -> Result<ClientsResponse, ClientError> {
        let versions = self.mirror.versions();
        self.api.wait_clients(&versions).await
    }

    fn apply(&self, payload: ClientsResponse) -> Result<(), ClientError> {
        let outcome = self.mirror.apply_response(&payload)?;
        if let ApplyOutcome::Replaced {
            session_changed: true,
        } = outcome
        {
            tracing::info!("Host session changed to {:?}", payload.session_id);
            if let Some(catalog) = &self.catalog {
                catalog.invalidate();
            }
        }
        Ok(())
    }

    fn reset(&self) {
        self.mirror.reset();
    }
}
