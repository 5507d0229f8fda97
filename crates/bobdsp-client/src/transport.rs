//! Request/response transport to the host.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use crate::error::ClientError;

/// The host's JSON endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Clients,
    Connections,
    Ports,
    Plugins,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Clients => "clients",
            Endpoint::Connections => "connections",
            Endpoint::Ports => "ports",
            Endpoint::Plugins => "plugins",
        }
    }
}

/// Moves JSON documents to and from the host.
///
/// Implementations do not enforce timeouts; callers wrap each request in the
/// deadline that fits it.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn get(&self, endpoint: Endpoint) -> Result<Value, ClientError>;

    async fn post(&self, endpoint: Endpoint, body: Value) -> Result<Value, ClientError>;
}

#[async_trait]
impl<S: Transport> Transport for Arc<S> {
    async fn get(&self, endpoint: Endpoint) -> Result<Value, ClientError> {
        (**self).get(endpoint).await
    }

    async fn post(&self, endpoint: Endpoint, body: Value) -> Result<Value, ClientError> {
        (**self).post(endpoint, body).await
    }
}

/// [`Transport`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        // endpoints are relative, so the base must end in a slash to keep its path
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder().build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> Result<Url, ClientError> {
        self.base_url
            .join(endpoint.path())
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    async fn read(resp: reqwest::Response) -> Result<Value, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, endpoint: Endpoint) -> Result<Value, ClientError> {
        let url = self.url(endpoint)?;
        tracing::debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        Self::read(resp).await
    }

    async fn post(&self, endpoint: Endpoint, body: Value) -> Result<Value, ClientError> {
        let url = self.url(endpoint)?;
        tracing::debug!("POST {} {}", url, body);
        let resp = self.client.post(url).json(&body).send().await?;
        Self::read(resp).await
    }
}
