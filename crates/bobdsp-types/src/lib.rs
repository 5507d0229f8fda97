//! # BobDSP Types
//!
//! Data model, wire documents and pure transforms for mirroring a remote
//! BobDSP host.
//!
//! - **`error`** - Validation and store errors
//! - **`models`** - Clients, controls, connection rules, ports, plugins and the
//!   version state machine that applies server responses
//! - **`protocol`** - JSON request/response documents for the `clients`,
//!   `connections`, `ports` and `plugins` endpoints
//! - **`transform`** - Slider position <-> control value mapping
//! - **`pattern`** - Connection rule patterns built from concrete port names
//!
//! ## Architecture Role
//!
//! Nothing in this crate performs I/O; `bobdsp-client` drives it:
//!
//! ```text
//!        bobdsp-types (this crate)
//!               │
//!               ▼
//!        bobdsp-client  (transport, long polls, coalescer)
//!               │
//!               ▼
//!        bobdsp-remote  (CLI)
//! ```

pub mod error;
pub mod models;
pub mod pattern;
pub mod protocol;
pub mod transform;

pub use error::{ProtocolError, Result};

pub use models::{
    ApplyOutcome, ClientSet, ClientSnapshot, ConnectionRule, ControlEdit, ControlKind,
    ControlState, PendingUpdate, PluginInfo, PluginRef, Port, PortDirection, PortList,
    SyncVersions,
};
