//! JSON documents exchanged with the host.
//!
//! GET is a plain fetch; POST carries either a long-poll wait or a mutation.
//! Every response is validated before it touches the mirrored state.

mod clients;
mod connections;
mod plugins;
mod ports;

pub use clients::{
    AddClient, ClientCommand, ClientUpdate, ClientsCommand, ClientsMutation, ClientsResponse,
    WireClient, WireControl,
};
pub use connections::{ConnectionsAction, ConnectionsRequest, ConnectionsResponse};
pub use plugins::PluginsResponse;
pub use ports::{PortsResponse, PortsWaitRequest};
