//! Client configuration.

use std::time::Duration;

/// Host address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// What to do with a control update batch whose request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendFailurePolicy {
    /// Forget the batch; the host only sees those controls again once the
    /// user edits them again.
    #[default]
    Drop,
    /// Mark the batch's controls dirty again so the next send carries them.
    Rearm,
}

/// Timing of the long polls and the update coalescer.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Timeout for plain fetches and mutations.
    pub fetch_timeout: Duration,
    /// How long the host may hold a wait request open.
    pub wait_timeout: Duration,
    /// Added to `wait_timeout` before a wait is considered lost.
    pub wait_margin: Duration,
    /// Pause between a failed request and the resync.
    pub backoff: Duration,
    /// Minimum spacing between control update requests.
    pub debounce: Duration,
    pub send_failure: SendFailurePolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            wait_timeout: Duration::from_secs(60),
            wait_margin: Duration::from_secs(10),
            backoff: Duration::from_secs(1),
            debounce: Duration::from_millis(50),
            send_failure: SendFailurePolicy::Drop,
        }
    }
}

impl SyncConfig {
    /// Response deadline for a wait request.
    pub fn wait_deadline(&self) -> Duration {
        self.wait_timeout + self.wait_margin
    }

    /// The `timeout` field sent with a wait request, in milliseconds.
    pub fn wait_timeout_ms(&self) -> u64 {
        u64::try_from(self.wait_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub sync: SyncConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            sync: SyncConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Reads `BOBDSP_URL`, falling back to [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Self {
        match std::env::var("BOBDSP_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }
}
