//! # BobDSP Client
//!
//! Async client that keeps a local mirror of a remote BobDSP host.
//!
//! - **`client`** - Typed requests against the `clients`, `connections`,
//!   `ports` and `plugins` endpoints
//! - **`session`** - Clients long poll driving a [`ClientMirror`]
//! - **`coalescer`** - Debounced, single-flight control updates
//! - **`ports`** - Ports long poll with output/input selection
//! - **`connections`** - Local editing of the ordered connection rules
//! - **`plugins`** - Plugin catalog cached per host session
//!
//! ## Example
//!
//! ```no_run
//! use bobdsp_client::{BobDspClient, ClientConfig, ClientMirror, SyncSession, UpdateCoalescer};
//! use bobdsp_types::ControlEdit;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), bobdsp_client::ClientError> {
//! let api = Arc::new(BobDspClient::from_config(&ClientConfig::from_env())?);
//! let mirror = ClientMirror::new();
//! let poll = SyncSession::new(api.clone(), mirror.clone()).spawn();
//!
//! let updates = UpdateCoalescer::new(api, mirror);
//! updates.edit("eq", "gain", ControlEdit::Value(-3.0))?;
//! updates.flush().await?;
//! poll.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod coalescer;
pub mod config;
pub mod connections;
pub mod error;
pub mod mirror;
pub mod plugins;
pub mod poll;
pub mod ports;
pub mod session;
pub mod transport;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing;

pub use client::BobDspClient;
pub use coalescer::UpdateCoalescer;
pub use config::{ClientConfig, SendFailurePolicy, SyncConfig, DEFAULT_BASE_URL};
pub use connections::ConnectionEditor;
pub use error::ClientError;
pub use mirror::{ClientMirror, SyncEvent};
pub use plugins::PluginCatalog;
pub use poll::{PollHandle, PollPhase};
pub use ports::PortWatcher;
pub use session::SyncSession;
pub use transport::{Endpoint, HttpTransport, Transport};
