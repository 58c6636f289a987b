use bridge::{Timestamp, TransportInfo, TransportKind};
use serde::Serialize;

/// Result of [`crate::Coordinator::switch`].
///
/// `success` reports that the selection now points at `mode`. Whether the new
/// transport actually connected is reported separately in `connected`; a
/// failed connect is retried on the next command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchOutcome {
    pub success: bool,
    pub mode: TransportKind,
    pub previous: TransportKind,
    pub connected: bool,
    pub message: String,
}

/// Snapshot returned by [`crate::Coordinator::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CoordinatorStatus {
    /// `start` has not been called, or `shutdown` has.
    NotInitialized,
    Ready {
        mode: TransportKind,
        transport: TransportInfo,
        #[serde(skip_serializing_if = "Option::is_none")]
        switched_at: Option<Timestamp>,
    },
}

impl CoordinatorStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}
