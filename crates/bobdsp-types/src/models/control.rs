use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};
use crate::transform::{self, Curve};

/// How a control's value is presented and edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Linear,
    Logarithmic,
    Integer,
    Boolean,
}

impl ControlKind {
    /// Derives the kind from the wire flags; `integer` beats `toggled` beats
    /// `logarithmic`.
    pub fn from_flags(integer: bool, toggled: bool, logarithmic: bool) -> Self {
        if integer {
            ControlKind::Integer
        } else if toggled {
            ControlKind::Boolean
        } else if logarithmic {
            ControlKind::Logarithmic
        } else {
            ControlKind::Linear
        }
    }

    pub fn curve(self) -> Curve {
        match self {
            ControlKind::Logarithmic => Curve::Logarithmic,
            _ => Curve::Linear,
        }
    }

    pub fn is_integer(self) -> bool {
        self == ControlKind::Integer
    }

    pub fn is_toggled(self) -> bool {
        self == ControlKind::Boolean
    }

    pub fn is_logarithmic(self) -> bool {
        self == ControlKind::Logarithmic
    }
}

/// A local edit, as produced by a slider drag, a spinner/text stop or a toggle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEdit {
    /// A typed or spun value
    Value(f64),
    /// A slider position inside the control's `[min, max]`
    Slider(f64),
    /// A checkbox state
    Toggle(bool),
}

/// One parameter of a client, with local dirty tracking.
///
/// While the control is dirty, values arriving from the server are ignored so
/// a round trip can never overwrite a value the user is still changing.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    pub name: String,
    pub kind: ControlKind,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    value: f64,
    dirty: bool,
}

impl ControlState {
    pub fn new(name: impl Into<String>, value: f64, kind: ControlKind) -> Self {
        Self {
            name: name.into(),
            kind,
            lower_bound: None,
            upper_bound: None,
            value,
            dirty: false,
        }
    }

    pub fn with_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Both bounds, when declared.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.lower_bound.zip(self.upper_bound)
    }

    /// Continuous controls with both bounds get a slider; everything else is
    /// edited as a number field, spinner or checkbox.
    pub fn has_slider(&self) -> bool {
        matches!(self.kind, ControlKind::Linear | ControlKind::Logarithmic) && self.bounds().is_some()
    }

    /// On/off reading of a boolean control.
    pub fn is_on(&self) -> bool {
        self.value.round() != 0.0
    }

    /// Where the slider should sit for the current value.
    pub fn slider_position(&self) -> Option<f64> {
        if !self.has_slider() {
            return None;
        }
        let (min, max) = self.bounds()?;
        Some(transform::to_slider(self.kind.curve(), self.value, min, max))
    }

    /// Applies a local edit. Returns `false` when the value did not change, in
    /// which case the dirty bit is left alone.
    pub fn edit(&mut self, edit: ControlEdit) -> Result<bool> {
        let value = match edit {
            ControlEdit::Value(value) => value,
            ControlEdit::Toggle(on) => {
                if on {
                    1.0
                } else {
                    0.0
                }
            }
            ControlEdit::Slider(position) => {
                let (min, max) = self.bounds().ok_or_else(|| ProtocolError::InvalidEdit {
                    control: self.name.clone(),
                    value: position,
                })?;
                transform::to_value(self.kind.curve(), position, min, max)
            }
        };

        if !value.is_finite() {
            return Err(ProtocolError::InvalidEdit {
                control: self.name.clone(),
                value,
            });
        }

        if value == self.value {
            return Ok(false);
        }

        self.value = value;
        self.dirty = true;
        Ok(true)
    }

    /// Merges a value from the server. Ignored while a local edit is pending.
    pub fn apply_remote(&mut self, remote: f64) -> bool {
        if self.dirty || self.value == remote {
            return false;
        }
        self.value = remote;
        true
    }

    /// Clears the dirty bit and hands back the value to send, if any.
    pub fn take_dirty(&mut self) -> Option<f64> {
        if self.dirty {
            self.dirty = false;
            Some(self.value)
        } else {
            None
        }
    }

    /// Marks the control as needing another send.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
