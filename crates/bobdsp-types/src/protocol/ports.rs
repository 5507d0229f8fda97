use serde::{Deserialize, Serialize};

use crate::models::Port;

/// Port list stamped with `index`/`uuid`. `ports` is omitted when the host
/// answers a wait whose stamps did not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortsResponse {
    pub index: i64,
    #[serde(default)]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<Port>>,
}

/// Body of the ports long poll. `timeout` is in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortsWaitRequest {
    pub timeout: u64,
    pub index: i64,
    pub uuid: String,
}
