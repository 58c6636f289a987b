use std::io;
use std::time::Duration;

use bridge::{BridgeError, TransportKind};
use thiserror::Error;

/// Failures of the socket layer, before they are folded into [`BridgeError`].
#[derive(Debug, Error)]
pub enum SocketError {
    #[error("connect to {endpoint} timed out after {}ms", after.as_millis())]
    ConnectTimeout { endpoint: String, after: Duration },

    #[error("connect to {endpoint} failed: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("peer closed the connection after {received} response bytes")]
    PeerClosed { received: usize },

    #[error("socket I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no response within {}ms", after.as_millis())]
    NoResponse { after: Duration },

    #[error("incomplete JSON response: {received} bytes received before read timeout")]
    Incomplete { received: usize },

    #[error("response exceeded {limit} bytes without forming a complete JSON document")]
    TooLarge { limit: usize },

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<SocketError> for BridgeError {
    fn from(err: SocketError) -> Self {
        match err {
            SocketError::NoResponse { .. }
            | SocketError::Incomplete { .. }
            | SocketError::TooLarge { .. }
            | SocketError::Encode(_) => BridgeError::framing(err.to_string()),
            SocketError::ConnectTimeout { endpoint, .. } | SocketError::Connect { endpoint, .. } => {
                BridgeError::ConnectionFailed {
                    kind: TransportKind::Stream,
                    endpoint,
                }
            }
            SocketError::PeerClosed { .. } | SocketError::Io(_) => {
                BridgeError::connection_lost(err.to_string())
            }
        }
    }
}
