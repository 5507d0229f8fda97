//! Mirrored host state: clients and their controls, connection rules, ports,
//! plugins, and the version stamps that decide how a response is applied.

pub mod client;
mod connection;
mod control;
mod plugin;
mod port;
pub mod sync;

pub use client::{ClientSet, ClientSnapshot, ControlValue, PendingUpdate};
pub use connection::ConnectionRule;
pub use control::{ControlEdit, ControlKind, ControlState};
pub use plugin::{PluginControl, PluginInfo, PluginPort, PluginRef};
pub use port::{Port, PortDirection, PortList};
pub use sync::{ApplyOutcome, SyncVersions};
