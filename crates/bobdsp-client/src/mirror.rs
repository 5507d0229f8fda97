//! The mirrored client list shared by the long poll and the update coalescer.

use bobdsp_types::models::PendingUpdate;
use bobdsp_types::protocol::ClientsResponse;
use bobdsp_types::{
    ApplyOutcome, ClientSet, ClientSnapshot, ControlEdit, ProtocolError, SyncVersions,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Change notifications for a rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// Client list rebuilt; redraw everything
    Replaced { session_changed: bool },
    /// Some control values changed in place
    ValuesChanged,
    /// Connection lost; the list is empty until the next fetch succeeds
    Reset,
}

#[derive(Debug, Default)]
struct MirrorState {
    versions: SyncVersions,
    clients: ClientSet,
}

/// Clients plus the stamps they were applied under, behind one lock.
///
/// Cloning is cheap and every clone sees the same state. The lock is never
/// held across an await.
#[derive(Clone)]
pub struct ClientMirror {
    state: Arc<Mutex<MirrorState>>,
    events: broadcast::Sender<SyncEvent>,
}

impl Default for ClientMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientMirror {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(MirrorState::default())),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn versions(&self) -> SyncVersions {
        self.state.lock().versions.clone()
    }

    pub fn session_id(&self) -> String {
        self.state.lock().versions.session_id.clone()
    }

    /// Copy of the current client list.
    pub fn clients(&self) -> Vec<ClientSnapshot> {
        self.state.lock().clients.clients().to_vec()
    }

    /// Runs `f` against the client set without copying it.
    pub fn with_clients<R>(&self, f: impl FnOnce(&ClientSet) -> R) -> R {
        f(&self.state.lock().clients)
    }

    /// Applies a `clients` response from either lane.
    pub fn apply_response(&self, response: &ClientsResponse) -> Result<ApplyOutcome, ProtocolError> {
        let outcome = {
            let mut state = self.state.lock();
            let MirrorState { versions, clients } = &mut *state;
            versions.apply(response, clients)?
        };

        match outcome {
            ApplyOutcome::Replaced { session_changed } => {
                tracing::info!(
                    "Client list replaced (clientVersion {}, controlVersion {}, session {:?})",
                    response.client_version,
                    response.control_version,
                    response.session_id
                );
                self.publish(SyncEvent::Replaced { session_changed });
            }
            ApplyOutcome::ValuesUpdated { adopted } => {
                tracing::debug!(
                    "controlVersion {}: {} values adopted",
                    response.control_version,
                    adopted
                );
                if adopted > 0 {
                    self.publish(SyncEvent::ValuesChanged);
                }
            }
            ApplyOutcome::Unchanged => {}
        }
        Ok(outcome)
    }

    /// Drops the client list and all stamps.
    pub fn reset(&self) {
        {
            let mut state = self.state.lock();
            state.versions.reset();
            state.clients.clear();
        }
        self.publish(SyncEvent::Reset);
    }

    /// Records a local edit. Returns whether the value changed.
    pub fn edit(&self, client: &str, control: &str, edit: ControlEdit) -> Result<bool, ProtocolError> {
        let changed = self.state.lock().clients.edit(client, control, edit)?;
        if changed {
            self.publish(SyncEvent::ValuesChanged);
        }
        Ok(changed)
    }

    pub fn has_dirty(&self) -> bool {
        self.state.lock().clients.has_dirty()
    }

    pub(crate) fn take_dirty(&self) -> Vec<PendingUpdate> {
        self.state.lock().clients.take_dirty()
    }

    pub(crate) fn rearm(&self, batch: &[PendingUpdate]) {
        self.state.lock().clients.rearm(batch);
    }

    fn publish(&self, event: SyncEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}
