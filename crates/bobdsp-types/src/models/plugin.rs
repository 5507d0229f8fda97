use serde::{Deserialize, Serialize};

use super::client::ControlValue;
use super::control::ControlKind;

/// Identifies a LADSPA plugin on the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginRef {
    pub label: String,
    #[serde(rename = "uniqueid")]
    pub unique_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginPort {
    /// "audio" or "control"
    #[serde(rename = "type")]
    pub port_type: String,
    pub direction: String,
    pub name: String,
}

/// Description of one control port of a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginControl {
    pub name: String,
    #[serde(rename = "lowerbound", default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    #[serde(rename = "upperbound", default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
    #[serde(default)]
    pub integer: bool,
    #[serde(default)]
    pub toggled: bool,
    #[serde(default)]
    pub logarithmic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<f64>,
}

impl PluginControl {
    pub fn kind(&self) -> ControlKind {
        ControlKind::from_flags(self.integer, self.toggled, self.logarithmic)
    }

    /// Starting value for a new client: the declared default, else the lower
    /// bound, else zero.
    pub fn initial_value(&self) -> f64 {
        self.default.or(self.lower_bound).unwrap_or(0.0)
    }
}

/// An entry of the host's plugin catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub plugin: PluginRef,
    #[serde(default)]
    pub ports: Vec<PluginPort>,
    #[serde(default)]
    pub controls: Vec<PluginControl>,
}

impl PluginInfo {
    /// Control values to send when adding a client running this plugin.
    pub fn default_controls(&self) -> Vec<ControlValue> {
        self.controls
            .iter()
            .map(|c| ControlValue {
                name: c.name.clone(),
                value: c.initial_value(),
            })
            .collect()
    }
}
