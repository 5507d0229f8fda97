//! Errors raised while validating server payloads or editing the control store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by payload validation and store edits.
///
/// A payload that fails validation is handled by the poll loops exactly like a
/// transport failure.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum ProtocolError {
    /// A client or control arrived without a name
    #[error("{context} has an empty name")]
    MissingName {
        /// Where the nameless entry was found
        context: String,
    },

    /// The same client name appeared twice in one payload
    #[error("duplicate client \"{0}\"")]
    DuplicateClient(String),

    /// A value was NaN or infinite
    #[error("non-finite value {value} for {client}/{control}")]
    NonFiniteValue {
        client: String,
        control: String,
        value: f64,
    },

    /// Lower bound above upper bound
    #[error("inverted bounds [{lower}, {upper}] for {client}/{control}")]
    InvertedBounds {
        client: String,
        control: String,
        lower: f64,
        upper: f64,
    },

    /// Version stamps advanced but the client list was not included
    #[error("response advanced versions without a client list")]
    MissingClients,

    /// Port index changed but the port list was not included
    #[error("response advanced the port index without a port list")]
    MissingPorts,

    /// Edit addressed a client that is not in the store
    #[error("unknown client \"{0}\"")]
    UnknownClient(String),

    /// Edit addressed a control the client does not have
    #[error("client \"{client}\" has no control \"{control}\"")]
    UnknownControl { client: String, control: String },

    /// Edit value rejected before touching the store
    #[error("invalid value {value} for control \"{control}\"")]
    InvalidEdit { control: String, value: f64 },
}

/// Result alias for validation and store operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = ProtocolError::UnknownControl {
            client: "eq".to_string(),
            control: "gain".to_string(),
        };

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("UnknownControl"));
        assert!(json.contains("gain"));

        let back: ProtocolError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }

    #[test]
    fn test_error_display() {
        let err = ProtocolError::DuplicateClient("eq".to_string());
        assert_eq!(err.to_string(), "duplicate client \"eq\"");
    }
}
