use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use async_trait::async_trait;
use bridge::{
    BridgeError, Command, CommandResult, Timestamp, Transport, TransportInfo, TransportKind,
};
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::timeout;
use tracing::{debug, error, info, warn, Instrument};

use crate::client::TonicConnector;
use crate::proto::GetSoftwareStatusRequest;
use crate::service::{ServiceConnector, SoftwareService};
use crate::{GrpcConfig, RpcError, RpcMethod};

/// Structured-RPC transport to the application's `mcp.MCPService`.
///
/// Commands resolve to one of the fixed [`RpcMethod`]s; anything else is
/// rejected before the channel is touched. Calls are serialised through an
/// async mutex, matching the stream transport's one-in-flight contract.
pub struct GrpcTransport {
    config: GrpcConfig,
    connector: Arc<dyn ServiceConnector>,
    service: Mutex<Option<Arc<dyn SoftwareService>>>,
    link: StdMutex<Option<Timestamp>>,
}

impl GrpcTransport {
    /// Transport that dials real tonic channels.
    pub fn new(config: GrpcConfig) -> Self {
        Self::with_connector(config, Arc::new(TonicConnector))
    }

    /// Transport that obtains its service from `connector`.
    pub fn with_connector(config: GrpcConfig, connector: Arc<dyn ServiceConnector>) -> Self {
        info!(address = %config.address, "Initialized RPC transport");
        Self {
            config,
            connector,
            service: Mutex::new(None),
            link: StdMutex::new(None),
        }
    }

    /// The configuration this transport was built with.
    pub fn config(&self) -> &GrpcConfig {
        &self.config
    }

    fn connected_since(&self) -> Option<Timestamp> {
        *self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_link(&self, since: Option<Timestamp>) {
        *self.link.lock().unwrap_or_else(PoisonError::into_inner) = since;
    }

    /// Opens the channel and proves it with one status call.
    async fn open(&self) -> Result<Arc<dyn SoftwareService>, RpcError> {
        let service = self.connector.connect(&self.config).await?;
        let deadline = self.config.request_timeout();
        match timeout(deadline, service.get_software_status(GetSoftwareStatusRequest {})).await {
            Ok(Ok(_)) => Ok(service),
            Ok(Err(status)) => Err(RpcError::from_status(status, deadline)),
            Err(_) => Err(RpcError::Deadline { after: deadline }),
        }
    }

    /// Fills `slot` with a proven service unless it already holds one.
    async fn establish(&self, slot: &mut Option<Arc<dyn SoftwareService>>) -> bool {
        if slot.is_some() && self.is_connected() {
            return true;
        }

        info!(address = %self.config.address, "Attempting RPC connection");
        match self.open().await {
            Ok(service) => {
                *slot = Some(service);
                self.set_link(Some(Timestamp::now()));
                info!(address = %self.config.address, "RPC connection established");
                true
            }
            Err(e) => {
                *slot = None;
                self.set_link(None);
                error!(address = %self.config.address, error = %e, "RPC connection failed");
                false
            }
        }
    }

    /// Calls `method` on the service held in `slot`, under the request deadline.
    async fn call(
        &self,
        mut slot: MutexGuard<'_, Option<Arc<dyn SoftwareService>>>,
        method: RpcMethod,
        command: &Command,
    ) -> CommandResult {
        let Some(service) = slot.take() else {
            return BridgeError::NotConnected.into();
        };
        let guard = InFlight::new(self);

        let deadline = self.config.request_timeout();
        let outcome = match timeout(deadline, method.invoke(service.as_ref(), command.params())).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(status)) => Err(BridgeError::from(RpcError::from_status(status, deadline))),
            Err(_) => Err(BridgeError::Timeout { after: deadline }),
        };

        match outcome {
            Ok(result) => {
                *slot = Some(service);
                guard.complete();
                debug!(success = result.is_success(), "RPC command completed");
                result
            }
            Err(err) if err.forces_disconnect() => {
                drop(service);
                drop(guard);
                warn!(error = %err, kind = %err.kind(), "RPC command failed; channel dropped");
                err.into()
            }
            Err(err) => {
                *slot = Some(service);
                guard.complete();
                warn!(error = %err, kind = %err.kind(), "RPC command failed");
                err.into()
            }
        }
    }
}

fn command_span(command: &Command) -> tracing::Span {
    tracing::debug_span!(
        "rpc_command",
        command = %command.name(),
        request_id = %command.id(),
    )
}

fn resolve(command: &Command) -> Result<RpcMethod, BridgeError> {
    RpcMethod::from_name(command.name().as_str()).ok_or_else(|| {
        warn!("Command has no RPC method");
        BridgeError::UnknownCommand {
            name: command.name().to_string(),
        }
    })
}

/// Clears the link unless the call completes; see the stream transport's
/// guard of the same name.
struct InFlight<'a> {
    transport: &'a GrpcTransport,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(transport: &'a GrpcTransport) -> Self {
        Self {
            transport,
            armed: true,
        }
    }

    fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.transport.set_link(None);
        }
    }
}

#[async_trait]
impl Transport for GrpcTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Structured
    }

    async fn connect(&self) -> bool {
        let mut slot = self.service.lock().await;
        self.establish(&mut slot).await
    }

    async fn disconnect(&self) -> bool {
        let mut slot = self.service.lock().await;
        if slot.take().is_some() {
            info!(address = %self.config.address, "RPC channel closed");
        }
        self.set_link(None);
        true
    }

    async fn send_command(&self, command: &Command) -> CommandResult {
        async move {
            let method = match resolve(command) {
                Ok(method) => method,
                Err(err) => return err.into(),
            };
            let slot = self.service.lock().await;
            self.call(slot, method, command).await
        }
        .instrument(command_span(command))
        .await
    }

    /// Rejects unknown names before dialling, then connects under the
    /// service lock and calls the method.
    async fn execute(&self, command: &Command) -> CommandResult {
        async move {
            let method = match resolve(command) {
                Ok(method) => method,
                Err(err) => return err.into(),
            };
            let mut slot = self.service.lock().await;
            if !self.establish(&mut slot).await {
                warn!("Cannot execute command: connection failed");
                return BridgeError::ConnectionFailed {
                    kind: TransportKind::Structured,
                    endpoint: self.config.address.clone(),
                }
                .into();
            }
            self.call(slot, method, command).await
        }
        .instrument(command_span(command))
        .await
    }

    fn is_connected(&self) -> bool {
        self.connected_since().is_some()
    }

    fn info(&self) -> TransportInfo {
        let since = self.connected_since();
        TransportInfo {
            kind: TransportKind::Structured,
            endpoint: self.config.address.clone(),
            connected: since.is_some(),
            connected_since: since,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_transport_starts_disconnected() {
        let transport = GrpcTransport::new(GrpcConfig::default());
        assert!(!transport.is_connected());
        let info = transport.info();
        assert_eq!(info.kind, TransportKind::Structured);
        assert_eq!(info.endpoint, "localhost:50051");
        assert!(info.connected_since.is_none());
        assert!(transport.disconnect().await);
    }
}
