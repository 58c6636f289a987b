//! The transport port.
//!
//! Every channel to the remote application implements [`Transport`]. The
//! coordinator holds transports as `Arc<dyn Transport>` and never reaches past
//! this trait into a transport's connection handle.
//!
//! ## Contract
//!
//! - `connect` and `disconnect` are idempotent and never fail loudly: failures
//!   are logged by the implementation and surface as `false`.
//! - `send_command` requires a live connection; without one it returns a
//!   `not connected` failure and performs no I/O.
//! - `is_connected` is cheap and never touches the network.
//! - `execute` (provided) connects on demand, so callers never manage
//!   connection state by hand. Transports that guard their channel with a
//!   lock override it to make the connect check under that lock, so a caller
//!   queued behind a failed command reconnects instead of finding no channel.
//! - Implementations serialise their own send/receive path: one command in
//!   flight per transport.

use async_trait::async_trait;
use tracing::warn;

use crate::{BridgeError, Command, CommandResult, TransportInfo, TransportKind};

/// A connection-oriented channel implementing the uniform command contract.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Which kind of transport this is.
    fn kind(&self) -> TransportKind;

    /// Attempts to establish the underlying channel.
    ///
    /// Returns `true` immediately when already connected.
    async fn connect(&self) -> bool;

    /// Releases the underlying channel. Safe to call when never connected.
    async fn disconnect(&self) -> bool;

    /// Sends one command and awaits its response.
    async fn send_command(&self, command: &Command) -> CommandResult;

    /// Cheap, non-blocking liveness flag. Never probes the network.
    fn is_connected(&self) -> bool;

    /// Snapshot of this transport's kind, endpoint, and connection state.
    fn info(&self) -> TransportInfo;

    /// Explicit liveness check, distinct from command execution.
    ///
    /// Must not send a command to the application. The default trusts the
    /// connection flag; transports with a cheap passive probe override it.
    async fn check_health(&self) -> bool {
        self.is_connected()
    }

    /// Connects if needed, then sends the command.
    ///
    /// A failed connect yields a `ConnectionFailed` result and no
    /// `send_command` I/O.
    async fn execute(&self, command: &Command) -> CommandResult {
        if !self.is_connected() && !self.connect().await {
            let info = self.info();
            warn!(
                transport = %info.kind,
                endpoint = %info.endpoint,
                command = %command.name(),
                "Cannot execute command: connection failed"
            );
            return BridgeError::ConnectionFailed {
                kind: info.kind,
                endpoint: info.endpoint,
            }
            .into();
        }
        self.send_command(command).await
    }
}
