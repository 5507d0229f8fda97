//! Generic long-poll driver shared by the clients and ports lanes.
//!
//! ```text
//!   ┌──────────┐  ok   ┌─────────┐  ok
//!   │ FETCHING │──────▶│ WAITING │──────┐
//!   └──────────┘       └─────────┘◀─────┘
//!        ▲   │ err          │ err
//!        │   ▼              ▼
//!        │  ┌─────────────────┐
//!        └──│ BACKOFF (reset) │
//!           └─────────────────┘
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Fetching,
    Waiting,
    Backoff,
}

/// One long-poll lane: how to fetch, how to wait, how to apply and how to
/// forget.
#[async_trait]
pub(crate) trait PollLane: Send + Sync + 'static {
    type Payload: Send;

    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Self::Payload, ClientError>;

    async fn wait(&self) -> Result<Self::Payload, ClientError>;

    fn apply(&self, payload: Self::Payload) -> Result<(), ClientError>;

    /// Forget all stamps and held data after a failure.
    fn reset(&self);
}

/// Handle to a running long-poll task.
pub struct PollHandle {
    stop: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stops scheduling further requests. A request already in flight is
    /// allowed to finish and its response is ignored.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops and waits for the task to wind down.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            tracing::warn!("Poll task ended abnormally: {}", e);
        }
    }
}

pub(crate) fn spawn<L: PollLane>(lane: Arc<L>, backoff: Duration) -> PollHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let task = tokio::spawn(run(lane, backoff, stop.clone()));
    PollHandle { stop, task }
}

async fn run<L: PollLane>(lane: Arc<L>, backoff: Duration, stop: Arc<AtomicBool>) {
    let mut phase = PollPhase::Fetching;

    while !stop.load(Ordering::SeqCst) {
        phase = match phase {
            PollPhase::Fetching | PollPhase::Waiting => {
                let result = if phase == PollPhase::Fetching {
                    lane.fetch().await
                } else {
                    lane.wait().await
                };

                if stop.load(Ordering::SeqCst) {
                    break;
                }

                match result.and_then(|payload| lane.apply(payload)) {
                    Ok(()) => PollPhase::Waiting,
                    Err(e) => {
                        tracing::warn!("{} poll failed, resyncing in {:?}: {}", lane.name(), backoff, e);
                        lane.reset();
                        PollPhase::Backoff
                    }
                }
            }
            PollPhase::Backoff => {
                tokio::time::sleep(backoff).await;
                PollPhase::Fetching
            }
        };
    }

    tracing::debug!("{} poll stopped", lane.name());
}
