use serde::{Deserialize, Serialize};

use crate::models::ConnectionRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionsAction {
    /// Persist the current rule list on the host
    Save,
    /// Discard the current rule list and reload the persisted one
    Reload,
}

/// Body of `POST connections`. A present rule list replaces the host's list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<ConnectionRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ConnectionsAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionsResponse {
    #[serde(default)]
    pub connections: Vec<ConnectionRule>,
}
