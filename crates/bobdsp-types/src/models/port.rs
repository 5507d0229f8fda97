use serde::{Deserialize, Serialize};

use super::sync::{UNKNOWN_SESSION, UNKNOWN_VERSION};
use crate::error::{ProtocolError, Result};
use crate::protocol::PortsResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

/// A port on the host's audio graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub direction: PortDirection,
}

/// Mirrored port list with the `index`/`uuid` pair the host stamps it with,
/// plus the user's current output/input selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortList {
    index: i64,
    uuid: String,
    ports: Vec<Port>,
    selected_output: Option<String>,
    selected_input: Option<String>,
}

impl Default for PortList {
    fn default() -> Self {
        Self {
            index: UNKNOWN_VERSION,
            uuid: UNKNOWN_SESSION.to_string(),
            ports: Vec::new(),
            selected_output: None,
            selected_input: None,
        }
    }
}

impl PortList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> i64 {
        self.index
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter().filter(|p| p.direction == PortDirection::Output)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter().filter(|p| p.direction == PortDirection::Input)
    }

    /// Applies a ports response. The list is replaced only when the index or
    /// uuid moved; returns whether it was.
    pub fn apply(&mut self, response: PortsResponse) -> Result<bool> {
        if response.index == self.index && response.uuid == self.uuid {
            return Ok(false);
        }

        let ports = response.ports.ok_or(ProtocolError::MissingPorts)?;
        self.index = response.index;
        self.uuid = response.uuid;
        self.ports = ports;

        let keep_output = self
            .selected_output
            .as_deref()
            .is_some_and(|name| self.has_port(name, PortDirection::Output));
        if !keep_output {
            self.selected_output = None;
        }
        let keep_input = self
            .selected_input
            .as_deref()
            .is_some_and(|name| self.has_port(name, PortDirection::Input));
        if !keep_input {
            self.selected_input = None;
        }
        Ok(true)
    }

    /// Forgets the list, its stamps and the selection; the next response
    /// always replaces.
    pub fn reset(&mut self) {
        self.index = UNKNOWN_VERSION;
        self.uuid = UNKNOWN_SESSION.to_string();
        self.ports.clear();
        self.selected_output = None;
        self.selected_input = None;
    }

    fn has_port(&self, name: &str, direction: PortDirection) -> bool {
        self.ports
            .iter()
            .any(|p| p.direction == direction && p.name == name)
    }

    /// Selects an output port by name; unknown names clear the selection.
    pub fn select_output(&mut self, name: &str) -> bool {
        let found = self.has_port(name, PortDirection::Output);
        self.selected_output = found.then(|| name.to_string());
        found
    }

    pub fn select_input(&mut self, name: &str) -> bool {
        let found = self.has_port(name, PortDirection::Input);
        self.selected_input = found.then(|| name.to_string());
        found
    }

    pub fn selected_output(&self) -> Option<&str> {
        self.selected_output.as_deref()
    }

    pub fn selected_input(&self) -> Option<&str> {
        self.selected_input.as_deref()
    }
}
