use serde::{Deserialize, Serialize};

use super::control::{ControlEdit, ControlKind, ControlState};
use super::plugin::PluginRef;
use crate::error::{ProtocolError, Result};

/// Name of the leading instance-count control.
pub const INSTANCES: &str = "instances";
/// Name of the gain applied before the plugin.
pub const PREGAIN: &str = "pregain";
/// Name of the gain applied after the plugin.
pub const POSTGAIN: &str = "postgain";

/// Number of builtin controls that precede the plugin controls.
pub const BUILTIN_CONTROLS: usize = 3;

pub const MAX_INSTANCES: f64 = 20.0;
pub const MAX_GAIN: f64 = 4.0;

/// A control value queued for the next update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlValue {
    pub name: String,
    pub value: f64,
}

/// Everything one client has waiting to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    pub client: String,
    pub controls: Vec<ControlValue>,
}

/// One remote processing client.
///
/// The control list always starts with `instances`, `pregain` and `postgain`,
/// followed by the plugin's own controls in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSnapshot {
    pub name: String,
    pub plugin: Option<PluginRef>,
    controls: Vec<ControlState>,
}

impl ClientSnapshot {
    pub fn new(
        name: impl Into<String>,
        plugin: Option<PluginRef>,
        instances: f64,
        pregain: f64,
        postgain: f64,
        plugin_controls: Vec<ControlState>,
    ) -> Self {
        let mut controls = Vec::with_capacity(BUILTIN_CONTROLS + plugin_controls.len());
        controls.push(
            ControlState::new(INSTANCES, instances, ControlKind::Integer)
                .with_bounds(Some(1.0), Some(MAX_INSTANCES)),
        );
        controls.push(
            ControlState::new(PREGAIN, pregain, ControlKind::Logarithmic)
                .with_bounds(Some(0.0), Some(MAX_GAIN)),
        );
        controls.push(
            ControlState::new(POSTGAIN, postgain, ControlKind::Logarithmic)
                .with_bounds(Some(0.0), Some(MAX_GAIN)),
        );
        controls.extend(plugin_controls);

        Self {
            name: name.into(),
            plugin,
            controls,
        }
    }

    pub fn controls(&self) -> &[ControlState] {
        &self.controls
    }

    /// Controls that belong to the plugin, without the builtin ones.
    pub fn plugin_controls(&self) -> &[ControlState] {
        self.controls.get(BUILTIN_CONTROLS..).unwrap_or(&[])
    }

    pub fn control(&self, name: &str) -> Option<&ControlState> {
        self.controls.iter().find(|c| c.name == name)
    }

    pub fn control_mut(&mut self, name: &str) -> Option<&mut ControlState> {
        self.controls.iter_mut().find(|c| c.name == name)
    }

    pub fn instances(&self) -> f64 {
        self.control(INSTANCES).map(ControlState::value).unwrap_or(1.0)
    }

    pub fn has_dirty(&self) -> bool {
        self.controls.iter().any(ControlState::is_dirty)
    }

    /// Clears every dirty bit and returns the values that were pending.
    pub fn take_update(&mut self) -> Option<PendingUpdate> {
        let controls: Vec<ControlValue> = self
            .controls
            .iter_mut()
            .filter_map(|c| {
                c.take_dirty().map(|value| ControlValue {
                    name: c.name.clone(),
                    value,
                })
            })
            .collect();

        if controls.is_empty() {
            None
        } else {
            Some(PendingUpdate {
                client: self.name.clone(),
                controls,
            })
        }
    }

    /// Adopts the server's values for every control of `remote` that is not
    /// dirty locally. Returns how many values changed.
    pub fn apply_remote(&mut self, remote: &ClientSnapshot) -> usize {
        let mut adopted = 0;
        for remote_control in &remote.controls {
            if let Some(local) = self.control_mut(&remote_control.name) {
                if local.apply_remote(remote_control.value()) {
                    adopted += 1;
                }
            }
        }
        adopted
    }
}

/// The mirrored client list, keyed by name and kept in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientSet {
    clients: Vec<ClientSnapshot>,
    generation: u64,
}

impl ClientSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clients(&self) -> &[ClientSnapshot] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Bumped every time the list is replaced wholesale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn client(&self, name: &str) -> Option<&ClientSnapshot> {
        self.clients.iter().find(|c| c.name == name)
    }

    pub fn control(&self, client: &str, control: &str) -> Option<&ControlState> {
        self.client(client)?.control(control)
    }

    /// Structural change: drops every local control, dirty or not.
    pub fn replace(&mut self, clients: Vec<ClientSnapshot>) {
        self.clients = clients;
        self.generation += 1;
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    /// Value-only change: merges by client and control name.
    pub fn apply_values(&mut self, remote: &[ClientSnapshot]) -> usize {
        let mut adopted = 0;
        for remote_client in remote {
            if let Some(local) = self.clients.iter_mut().find(|c| c.name == remote_client.name) {
                adopted += local.apply_remote(remote_client);
            }
        }
        adopted
    }

    /// Records a local edit; see [`ControlState::edit`].
    pub fn edit(&mut self, client: &str, control: &str, edit: ControlEdit) -> Result<bool> {
        let snapshot = self
            .clients
            .iter_mut()
            .find(|c| c.name == client)
            .ok_or_else(|| ProtocolError::UnknownClient(client.to_string()))?;
        let state = snapshot
            .control_mut(control)
            .ok_or_else(|| ProtocolError::UnknownControl {
                client: client.to_string(),
                control: control.to_string(),
            })?;
        state.edit(edit)
    }

    pub fn has_dirty(&self) -> bool {
        self.clients.iter().any(ClientSnapshot::has_dirty)
    }

    /// Collects and clears every pending edit, one entry per client that had
    /// any.
    pub fn take_dirty(&mut self) -> Vec<PendingUpdate> {
        self.clients
            .iter_mut()
            .filter_map(ClientSnapshot::take_update)
            .collect()
    }

    /// Marks the controls of a batch dirty again. Controls that disappeared in
    /// the meantime are skipped.
    pub fn rearm(&mut self, batch: &[PendingUpdate]) {
        for pending in batch {
            let Some(client) = self.clients.iter_mut().find(|c| c.name == pending.client) else {
                continue;
            };
            for sent in &pending.controls {
                if let Some(control) = client.control_mut(&sent.name) {
                    control.mark_dirty();
                }
            }
        }
    }
}
