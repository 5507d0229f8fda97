use bobdsp_types::protocol::{
    AddClient, ClientCommand, ClientUpdate, ClientsCommand, ClientsMutation, ClientsResponse,
    ConnectionsAction, ConnectionsRequest, ConnectionsResponse, PluginsResponse, PortsResponse,
    PortsWaitRequest,
};
use bobdsp_types::{ConnectionRule, PluginInfo, SyncVersions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

use crate::config::{ClientConfig, SyncConfig};
use crate::error::ClientError;
use crate::transport::{Endpoint, HttpTransport, Transport};

/// Typed access to the host's endpoints.
///
/// Every call carries a deadline; fetches and mutations use
/// `SyncConfig::fetch_timeout`, waits use the deadline passed in.
pub struct BobDspClient<T: Transport = HttpTransport> {
    transport: T,
    config: SyncConfig,
}

impl BobDspClient<HttpTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&config.base_url)?;
        tracing::debug!("Using BobDSP host at {}", transport.base_url());
        Ok(Self::new(transport, config.sync.clone()))
    }
}

impl<T: Transport> BobDspClient<T> {
    pub fn new(transport: T, config: SyncConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn fetch_clients(&self) -> Result<ClientsResponse, ClientError> {
        self.get_doc(Endpoint::Clients, self.config.fetch_timeout).await
    }

    /// Long poll on the clients endpoint with the given stamps.
    pub async fn wait_clients(&self, versions: &SyncVersions) -> Result<ClientsResponse, ClientError> {
        let command = versions.wait_command(self.config.wait_timeout_ms());
        self.post_doc(Endpoint::Clients, &command, self.config.wait_deadline())
            .await
    }

    /// Sends one batch of control updates; the host answers with a full
    /// snapshot.
    pub async fn update_clients(&self, updates: Vec<ClientUpdate>) -> Result<ClientsResponse, ClientError> {
        let body = ClientsMutation {
            clients: updates.into_iter().map(ClientCommand::Update).collect(),
        };
        self.post_doc(Endpoint::Clients, &body, self.config.fetch_timeout)
            .await
    }

    /// Structural mutations are observed through the long poll, so their
    /// response bodies are discarded.
    pub async fn add_client(&self, add: AddClient) -> Result<(), ClientError> {
        let body = ClientsMutation {
            clients: vec![ClientCommand::Add(add)],
        };
        self.post_ignored(Endpoint::Clients, &body).await
    }

    pub async fn delete_client(&self, name: &str) -> Result<(), ClientError> {
        let body = ClientsMutation {
            clients: vec![ClientCommand::Delete {
                name: name.to_string(),
            }],
        };
        self.post_ignored(Endpoint::Clients, &body).await
    }

    pub async fn reload_clients(&self) -> Result<(), ClientError> {
        self.post_ignored(Endpoint::Clients, &ClientsCommand::Reload)
            .await
    }

    pub async fn save_clients(&self) -> Result<(), ClientError> {
        self.post_ignored(Endpoint::Clients, &ClientsCommand::Save)
            .await
    }

    pub async fn fetch_connections(&self) -> Result<Vec<ConnectionRule>, ClientError> {
        let resp: ConnectionsResponse = self
            .get_doc(Endpoint::Connections, self.config.fetch_timeout)
            .await?;
        Ok(resp.connections)
    }

    /// Replaces the host's rule list, optionally followed by `action`, and
    /// returns the list the host ended up with.
    pub async fn post_connections(
        &self,
        rules: Option<&[ConnectionRule]>,
        action: Option<ConnectionsAction>,
    ) -> Result<Vec<ConnectionRule>, ClientError> {
        let body = ConnectionsRequest {
            connections: rules.map(<[ConnectionRule]>::to_vec),
            action,
        };
        let resp: ConnectionsResponse = self
            .post_doc(Endpoint::Connections, &body, self.config.fetch_timeout)
            .await?;
        Ok(resp.connections)
    }

    pub async fn fetch_ports(&self) -> Result<PortsResponse, ClientError> {
        self.get_doc(Endpoint::Ports, self.config.fetch_timeout).await
    }

    /// Long poll on the ports endpoint.
    pub async fn wait_ports(&self, index: i64, uuid: &str) -> Result<PortsResponse, ClientError> {
        let body = PortsWaitRequest {
            timeout: self.config.wait_timeout_ms(),
            index,
            uuid: uuid.to_string(),
        };
        self.post_doc(Endpoint::Ports, &body, self.config.wait_deadline())
            .await
    }

    pub async fn fetch_plugins(&self) -> Result<Vec<PluginInfo>, ClientError> {
        let resp: PluginsResponse = self
            .get_doc(Endpoint::Plugins, self.config.fetch_timeout)
            .await?;
        Ok(resp.plugins)
    }

    async fn get_doc<R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        deadline: Duration,
    ) -> Result<R, ClientError> {
        let value = with_deadline(deadline, self.transport.get(endpoint)).await?;
        decode(value)
    }

    async fn post_doc<B: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: &B,
        deadline: Duration,
    ) -> Result<R, ClientError> {
        let body =
            serde_json::to_value(body).map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let value = with_deadline(deadline, self.transport.post(endpoint, body)).await?;
        decode(value)
    }

    async fn post_ignored<B: Serialize>(&self, endpoint: Endpoint, body: &B) -> Result<(), ClientError> {
        let body =
            serde_json::to_value(body).map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        with_deadline(self.config.fetch_timeout, self.transport.post(endpoint, body)).await?;
        Ok(())
    }
}

async fn with_deadline<F>(deadline: Duration, request: F) -> Result<serde_json::Value, ClientError>
where
    F: Future<Output = Result<serde_json::Value, ClientError>>,
{
    tokio::time::timeout(deadline, request)
        .await
        .map_err(|_| ClientError::Timeout(deadline))?
}

fn decode<R: DeserializeOwned>(value: serde_json::Value) -> Result<R, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}
