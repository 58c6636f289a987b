//! Error taxonomy for command dispatch.
//!
//! [`BridgeError`] covers every expected runtime failure of a transport. None
//! of them escape to the caller as a Rust error: each transport converts them
//! into a failed [`crate::CommandResult`] at its boundary, tagging the result
//! with the matching [`ErrorKind`].
//!
//! Adapter-specific errors (socket I/O, gRPC status codes) are defined in
//! their own crates and mapped into [`BridgeError`] there.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TransportKind;

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Machine-readable tag carried by failed results.
///
/// Lets callers tell a framing failure from an application failure without
/// parsing the human-readable error string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// An operation needed a live connection and none existed.
    NotConnected,
    /// A connect attempt did not establish a channel.
    ConnectionFailed,
    /// The peer closed the connection, or a read/write failed mid-session.
    ConnectionLost,
    /// Stream bytes never resolved into one complete JSON document.
    FramingError,
    /// No response arrived within the configured bound.
    Timeout,
    /// The structured transport has no method for the command name.
    UnknownCommand,
    /// The remote application itself reported failure.
    ApplicationError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotConnected => "not_connected",
            Self::ConnectionFailed => "connection_failed",
            Self::ConnectionLost => "connection_lost",
            Self::FramingError => "framing_error",
            Self::Timeout => "timeout",
            Self::UnknownCommand => "unknown_command",
            Self::ApplicationError => "application_error",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

/// Every failure a transport can hit while connecting or exchanging a command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    /// `send_command` was called without a live connection; no I/O was attempted.
    #[error("not connected")]
    NotConnected,

    /// A connect attempt failed (refused, unreachable, timed out, probe failed).
    #[error("failed to connect using {kind} transport to {endpoint}")]
    ConnectionFailed {
        /// Transport that attempted the connection.
        kind: TransportKind,
        /// Endpoint that could not be reached.
        endpoint: String,
    },

    /// The connection dropped mid-session.
    #[error("connection lost: {reason}")]
    ConnectionLost {
        /// Human-readable cause (I/O error text, "peer closed the connection").
        reason: String,
    },

    /// The response bytes never formed a complete JSON document.
    #[error("framing error: {reason}")]
    Framing {
        /// What was wrong with the accumulated bytes.
        reason: String,
    },

    /// No response within the bound.
    #[error("timed out after {}ms waiting for response", after.as_millis())]
    Timeout {
        /// The bound that elapsed.
        after: Duration,
    },

    /// The command name is outside the structured transport's method set.
    #[error("unknown command: {name}")]
    UnknownCommand {
        /// The rejected command name.
        name: String,
    },

    /// The remote application reported failure; the message is passed through
    /// verbatim.
    #[error("{message}")]
    Application {
        /// The application's own error text.
        message: String,
    },
}

impl BridgeError {
    /// Returns the [`ErrorKind`] tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConnected => ErrorKind::NotConnected,
            Self::ConnectionFailed { .. } => ErrorKind::ConnectionFailed,
            Self::ConnectionLost { .. } => ErrorKind::ConnectionLost,
            Self::Framing { .. } => ErrorKind::FramingError,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            Self::Application { .. } => ErrorKind::ApplicationError,
        }
    }

    /// Returns `true` if the transport must drop its connection after this
    /// error, so the next call re-establishes instead of reusing a bad handle.
    ///
    /// Framing errors count: the unread remainder of a broken response would
    /// otherwise be read as the start of the next one.
    pub fn forces_disconnect(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::ConnectionLost { .. }
                | Self::Timeout { .. }
                | Self::Framing { .. }
        )
    }

    /// Shorthand for [`BridgeError::ConnectionLost`].
    pub fn connection_lost(reason: impl Into<String>) -> Self {
        Self::ConnectionLost {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`BridgeError::Framing`].
    pub fn framing(reason: impl Into<String>) -> Self {
        Self::Framing {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`BridgeError::Application`].
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            message: message.into(),
        }
    }
}
