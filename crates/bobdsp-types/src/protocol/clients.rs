use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ProtocolError, Result};
use crate::models::client::{ControlValue, PendingUpdate, INSTANCES, POSTGAIN, PREGAIN};
use crate::models::{ClientSnapshot, ControlKind, ControlState, PluginInfo, PluginRef};

fn unity() -> f64 {
    1.0
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Response to every `clients` request: version stamps plus, when anything
/// changed, the full client list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientsResponse {
    pub client_version: i64,
    pub control_version: i64,
    #[serde(default)]
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<WireClient>>,
}

impl ClientsResponse {
    /// Validates the client list into snapshots.
    pub fn snapshots(&self) -> Result<Vec<ClientSnapshot>> {
        let clients = self.clients.as_ref().ok_or(ProtocolError::MissingClients)?;

        let mut seen = HashSet::with_capacity(clients.len());
        let mut snapshots = Vec::with_capacity(clients.len());
        for client in clients {
            if !seen.insert(client.name.as_str()) {
                return Err(ProtocolError::DuplicateClient(client.name.clone()));
            }
            snapshots.push(client.to_snapshot()?);
        }
        Ok(snapshots)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireClient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<PluginRef>,
    #[serde(default = "unity")]
    pub instances: f64,
    #[serde(default = "unity")]
    pub pregain: f64,
    #[serde(default = "unity")]
    pub postgain: f64,
    #[serde(default)]
    pub controls: Vec<WireControl>,
}

impl WireClient {
    pub fn to_snapshot(&self) -> Result<ClientSnapshot> {
        if self.name.is_empty() {
            return Err(ProtocolError::MissingName {
                context: "client".to_string(),
            });
        }

        for (name, value) in [
            (INSTANCES, self.instances),
            (PREGAIN, self.pregain),
            (POSTGAIN, self.postgain),
        ] {
            check_finite(&self.name, name, value)?;
        }

        let controls = self
            .controls
            .iter()
            .map(|c| c.to_state(&self.name))
            .collect::<Result<Vec<_>>>()?;

        Ok(ClientSnapshot::new(
            self.name.clone(),
            self.plugin.clone(),
            self.instances,
            self.pregain,
            self.postgain,
            controls,
        ))
    }

    /// Wire form of a mirrored client.
    pub fn from_snapshot(snapshot: &ClientSnapshot) -> Self {
        let value_of = |name: &str| snapshot.control(name).map(ControlState::value).unwrap_or(1.0);
        Self {
            name: snapshot.name.clone(),
            plugin: snapshot.plugin.clone(),
            instances: value_of(INSTANCES),
            pregain: value_of(PREGAIN),
            postgain: value_of(POSTGAIN),
            controls: snapshot
                .plugin_controls()
                .iter()
                .map(WireControl::from_state)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireControl {
    pub name: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub integer: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub toggled: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub logarithmic: bool,
    #[serde(rename = "lowerbound", default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    #[serde(rename = "upperbound", default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

impl WireControl {
    fn to_state(&self, client: &str) -> Result<ControlState> {
        if self.name.is_empty() {
            return Err(ProtocolError::MissingName {
                context: format!("control of client \"{client}\""),
            });
        }
        check_finite(client, &self.name, self.value)?;
        for bound in [self.lower_bound, self.upper_bound].into_iter().flatten() {
            check_finite(client, &self.name, bound)?;
        }
        if let (Some(lower), Some(upper)) = (self.lower_bound, self.upper_bound) {
            if lower > upper {
                return Err(ProtocolError::InvertedBounds {
                    client: client.to_string(),
                    control: self.name.clone(),
                    lower,
                    upper,
                });
            }
        }

        let kind = ControlKind::from_flags(self.integer, self.toggled, self.logarithmic);
        Ok(ControlState::new(self.name.clone(), self.value, kind)
            .with_bounds(self.lower_bound, self.upper_bound))
    }

    fn from_state(state: &ControlState) -> Self {
        Self {
            name: state.name.clone(),
            value: state.value(),
            integer: state.kind.is_integer(),
            toggled: state.kind.is_toggled(),
            logarithmic: state.kind.is_logarithmic(),
            lower_bound: state.lower_bound,
            upper_bound: state.upper_bound,
        }
    }
}

fn check_finite(client: &str, control: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ProtocolError::NonFiniteValue {
            client: client.to_string(),
            control: control.to_string(),
            value,
        })
    }
}

/// `POST clients` bodies that carry a top-level action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClientsCommand {
    /// Long poll; `timeout` is in milliseconds
    #[serde(rename_all = "camelCase")]
    Wait {
        timeout: u64,
        client_version: i64,
        control_version: i64,
        session_id: String,
    },
    Reload,
    Save,
}

/// `POST clients` body carrying per-client mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientsMutation {
    pub clients: Vec<ClientCommand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClientCommand {
    Update(ClientUpdate),
    Delete { name: String },
    Add(AddClient),
}

/// Changed values of one client. Builtin controls travel as top-level
/// fields, plugin controls in `controls`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pregain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgain: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<ControlValue>,
}

impl From<PendingUpdate> for ClientUpdate {
    fn from(pending: PendingUpdate) -> Self {
        let mut update = ClientUpdate {
            name: pending.client,
            instances: None,
            pregain: None,
            postgain: None,
            controls: Vec::new(),
        };
        for control in pending.controls {
            match control.name.as_str() {
                #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
                INSTANCES => update.instances = Some(control.value.round() as i64),
                PREGAIN => update.pregain = Some(control.value),
                POSTGAIN => update.postgain = Some(control.value),
                _ => update.controls.push(control),
            }
        }
        update
    }
}

/// Request to start a new client running `plugin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddClient {
    pub name: String,
    pub plugin: PluginRef,
    pub instances: i64,
    pub pregain: f64,
    pub postgain: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<ControlValue>,
}

impl AddClient {
    /// One instance at unity gain with the plugin's default control values.
    pub fn for_plugin(name: impl Into<String>, plugin: &PluginInfo) -> Self {
        Self {
            name: name.into(),
            plugin: plugin.plugin.clone(),
            instances: 1,
            pregain: 1.0,
            postgain: 1.0,
            controls: plugin.default_controls(),
        }
    }
}
