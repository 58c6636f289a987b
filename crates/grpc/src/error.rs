use std::time::Duration;

use bridge::{BridgeError, TransportKind};
use thiserror::Error;
use tonic::{Code, Status};

/// Failures of the RPC layer, before they are folded into [`BridgeError`].
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid RPC address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("failed to open RPC channel to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("no RPC response within {}ms", after.as_millis())]
    Deadline { after: Duration },

    #[error("RPC failed with {}: {}", .0.code(), .0.message())]
    Status(#[from] Status),
}

impl RpcError {
    /// Classifies a call status, treating a server-side deadline like a local one.
    pub fn from_status(status: Status, deadline: Duration) -> Self {
        if status.code() == Code::DeadlineExceeded {
            Self::Deadline { after: deadline }
        } else {
            Self::Status(status)
        }
    }
}

impl From<RpcError> for BridgeError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::InvalidAddress { address, .. } | RpcError::Connect { address, .. } => {
                BridgeError::ConnectionFailed {
                    kind: TransportKind::Structured,
                    endpoint: address,
                }
            }
            RpcError::Deadline { after } => BridgeError::Timeout { after },
            RpcError::Status(status) => match status.code() {
                Code::Unavailable | Code::Cancelled => {
                    BridgeError::connection_lost(status.message().to_string())
                }
                Code::DeadlineExceeded => BridgeError::Timeout {
                    after: Duration::ZERO,
                },
                code if status.message().is_empty() => {
                    BridgeError::application(code.description().to_string())
                }
                _ => BridgeError::application(status.message().to_string()),
            },
        }
    }
}
