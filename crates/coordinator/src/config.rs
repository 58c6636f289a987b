use std::time::Duration;

use bridge::TransportKind;
use serde::{Deserialize, Serialize};

/// Behaviour of a [`crate::Coordinator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Transport active at startup.
    pub default_mode: TransportKind,
    /// Upper bound on one `execute`, connect included. On elapse the active
    /// transport is disconnected.
    pub request_timeout_ms: u64,
    /// Optional command sent as a round-trip liveness probe before each
    /// command on an already-connected transport. Costs one extra round trip.
    pub probe_command: Option<String>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_mode: TransportKind::Stream,
            request_timeout_ms: 30_000,
            probe_command: None,
        }
    }
}

impl CoordinatorConfig {
    /// [`Self::request_timeout_ms`] as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
