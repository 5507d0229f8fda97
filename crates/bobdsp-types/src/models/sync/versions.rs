use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::ClientSet;
use crate::protocol::{ClientsCommand, ClientsResponse};

/// Counter value meaning "nothing known yet".
pub const UNKNOWN_VERSION: i64 = -1;
/// Session id meaning "nothing known yet".
pub const UNKNOWN_SESSION: &str = "";

/// What applying a response did to the mirrored clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Client list replaced wholesale
    Replaced {
        /// The host restarted; anything cached against the old session is stale
        session_changed: bool,
    },
    /// Values merged into the existing clients
    ValuesUpdated {
        /// Controls whose value actually changed
        adopted: usize,
    },
    /// Stale or duplicate notification
    Unchanged,
}

/// The stamps of the last applied `clients` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncVersions {
    pub client_version: i64,
    pub control_version: i64,
    pub session_id: String,
}

impl Default for SyncVersions {
    fn default() -> Self {
        Self {
            client_version: UNKNOWN_VERSION,
            control_version: UNKNOWN_VERSION,
            session_id: UNKNOWN_SESSION.to_string(),
        }
    }
}

impl SyncVersions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_known(&self) -> bool {
        self.client_version != UNKNOWN_VERSION
    }

    /// Forgets all three stamps together.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Long-poll request carrying these stamps.
    pub fn wait_command(&self, timeout_ms: u64) -> ClientsCommand {
        ClientsCommand::Wait {
            timeout: timeout_ms,
            client_version: self.client_version,
            control_version: self.control_version,
            session_id: self.session_id.clone(),
        }
    }

    /// Applies `response` to `clients`.
    ///
    /// The payload is validated before anything is touched; on error neither
    /// the stamps nor the clients change. Older stamps fall into the
    /// `Unchanged` branch so state is never rolled back.
    pub fn apply(&mut self, response: &ClientsResponse, clients: &mut ClientSet) -> Result<ApplyOutcome> {
        let session_changed = response.session_id != self.session_id;

        if session_changed || response.client_version > self.client_version {
            let snapshots = response.snapshots()?;
            clients.replace(snapshots);

            // a first fetch is not a restart
            let restarted = session_changed && self.session_id != UNKNOWN_SESSION;
            self.client_version = response.client_version;
            self.control_version = response.control_version;
            self.session_id = response.session_id.clone();
            return Ok(ApplyOutcome::Replaced {
                session_changed: restarted,
            });
        }

        if response.control_version > self.control_version {
            let snapshots = response.snapshots()?;
            let adopted = clients.apply_values(&snapshots);
            self.control_version = response.control_version;
            return Ok(ApplyOutcome::ValuesUpdated { adopted });
        }

        Ok(ApplyOutcome::Unchanged)
    }
}
