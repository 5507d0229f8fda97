//! Debounced, single-flight control updates.
//!
//! Edits only mark controls dirty. [`UpdateCoalescer::request_send`] then
//! makes sure exactly one update request for the whole client set is in
//! flight at a time, spaced at least `debounce` apart, and that edits made
//! while a request was in flight go out in the next one.

use bobdsp_types::protocol::ClientUpdate;
use bobdsp_types::{ControlEdit, ProtocolError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::client::BobDspClient;
use crate::config::SendFailurePolicy;
use crate::error::ClientError;
use crate::mirror::ClientMirror;
use crate::transport::Transport;

#[derive(Debug, Default)]
struct SendState {
    sending: bool,
    last_send: Option<Instant>,
    failures: u64,
    last_error: Option<String>,
}

enum SendOutcome {
    Nothing,
    Delivered,
    Failed(String),
}

struct Inner<T: Transport> {
    api: Arc<BobDspClient<T>>,
    mirror: ClientMirror,
    debounce: Duration,
    policy: SendFailurePolicy,
    state: Mutex<SendState>,
    idle: Notify,
}

/// Batches dirty controls of a [`ClientMirror`] into update requests.
pub struct UpdateCoalescer<T: Transport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for UpdateCoalescer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> UpdateCoalescer<T> {
    pub fn new(api: Arc<BobDspClient<T>>, mirror: ClientMirror) -> Self {
        let debounce = api.config().debounce;
        let policy = api.config().send_failure;
        Self {
            inner: Arc::new(Inner {
                api,
                mirror,
                debounce,
                policy,
                state: Mutex::new(SendState::default()),
                idle: Notify::new(),
            }),
        }
    }

    /// Records a local edit and schedules a send when the value changed.
    pub fn edit(&self, client: &str, control: &str, edit: ControlEdit) -> Result<bool, ProtocolError> {
        let changed = self.inner.mirror.edit(client, control, edit)?;
        if changed {
            self.request_send();
        }
        Ok(changed)
    }

    /// Schedules a send of everything dirty. Does nothing while a request is
    /// in flight; its completion checks again.
    pub fn request_send(&self) {
        self.inner.request_send();
    }

    pub fn is_sending(&self) -> bool {
        self.inner.state.lock().sending
    }

    /// Waits until every pending edit has been sent.
    ///
    /// Fails if a send fails while waiting.
    pub async fn flush(&self) -> Result<(), ClientError> {
        let failures_at_start = self.inner.state.lock().failures;

        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let (sending, failures, last_error) = {
                let state = self.inner.state.lock();
                (state.sending, state.failures, state.last_error.clone())
            };
            if failures != failures_at_start {
                return Err(ClientError::SendFailed(last_error.unwrap_or_default()));
            }
            if !sending {
                if !self.inner.mirror.has_dirty() {
                    return Ok(());
                }
                self.request_send();
            }

            notified.await;
        }
    }
}

impl<T: Transport> Inner<T> {
    fn request_send(self: &Arc<Self>) {
        let delay = {
            let mut state = self.state.lock();
            if state.sending {
                return;
            }
            state.sending = true;

            match state.last_send {
                Some(last) => self.debounce.saturating_sub(last.elapsed()),
                None => Duration::ZERO,
            }
        };

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            inner.perform_send().await;
        });
    }

    async fn perform_send(self: Arc<Self>) {
        let batch = self.mirror.take_dirty();
        if batch.is_empty() {
            self.finish(SendOutcome::Nothing);
            return;
        }

        self.state.lock().last_send = Some(Instant::now());
        let updates: Vec<ClientUpdate> = batch.iter().cloned().map(ClientUpdate::from).collect();
        tracing::debug!(
            "Sending {} control updates for {} clients",
            batch.iter().map(|p| p.controls.len()).sum::<usize>(),
            batch.len()
        );

        match self.api.update_clients(updates).await {
            Ok(response) => {
                if let Err(e) = self.mirror.apply_response(&response) {
                    tracing::warn!("Ignoring invalid update response: {}", e);
                }
                self.finish(SendOutcome::Delivered);
                // edits made while the request was in flight
                self.request_send();
            }
            Err(e) => {
                match self.policy {
                    SendFailurePolicy::Drop => {
                        tracing::warn!("Control update failed, dropping {} clients' edits: {}", batch.len(), e);
                    }
                    SendFailurePolicy::Rearm => {
                        tracing::warn!("Control update failed, keeping edits for the next send: {}", e);
                        self.mirror.rearm(&batch);
                    }
                }
                self.finish(SendOutcome::Failed(e.to_string()));
            }
        }
    }

    fn finish(&self, outcome: SendOutcome) {
        {
            let mut state = self.state.lock();
            state.sending = false;
            match outcome {
                SendOutcome::Nothing => {}
                SendOutcome::Delivered => state.last_error = None,
                SendOutcome::Failed(message) => {
                    state.failures += 1;
                    state.last_error = Some(message);
                }
            }
        }
        self.idle.notify_waiters();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests;
