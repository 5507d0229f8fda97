//! Version stamps for the clients long poll.
//!
//! The host stamps every `clients` response with two counters and a session
//! id:
//! - `clientVersion` advances on structural change (clients added, removed,
//!   restarted) and triggers a wholesale replace
//! - `controlVersion` advances when only values changed and triggers a
//!   per-control merge that never overwrites a pending local edit
//! - `sessionId` changes when the host process restarts; a new id forces a
//!   replace even if the counters happen to match

mod versions;


pub use versions::{ApplyOutcome, SyncVersions, UNKNOWN_SESSION, UNKNOWN_VERSION};
