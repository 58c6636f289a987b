use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bridge::{BridgeError, Command, CommandResult, ErrorKind, Params, Timestamp, Transport, TransportKind};
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn, Instrument};

use crate::{CoordinatorConfig, CoordinatorStatus, SwitchOutcome};

/// Which transport is active, and since when.
#[derive(Debug, Clone, Copy)]
struct Selection {
    mode: TransportKind,
    switched_at: Option<Timestamp>,
}

/// Routes commands to the active transport and manages switching between the
/// stream and structured transports.
///
/// Commands hold the selection read lock for their whole duration; a switch
/// takes the write lock, so it waits for in-flight commands and never
/// overlaps one.
pub struct Coordinator {
    config: CoordinatorConfig,
    stream: Arc<dyn Transport>,
    structured: Arc<dyn Transport>,
    selection: RwLock<Selection>,
    started: AtomicBool,
}

impl Coordinator {
    /// Builds a coordinator over two pre-built transports.
    ///
    /// Nothing connects until [`Coordinator::start`] or the first command.
    pub fn new(
        config: CoordinatorConfig,
        stream: Arc<dyn Transport>,
        structured: Arc<dyn Transport>,
    ) -> Self {
        let selection = Selection {
            mode: config.default_mode,
            switched_at: None,
        };
        Self {
            config,
            stream,
            structured,
            selection: RwLock::new(selection),
            started: AtomicBool::new(false),
        }
    }

    /// The configuration this coordinator was built with.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    fn transport(&self, kind: TransportKind) -> &Arc<dyn Transport> {
        match kind {
            TransportKind::Stream => &self.stream,
            TransportKind::Structured => &self.structured,
        }
    }

    /// The currently selected transport kind.
    pub async fn mode(&self) -> TransportKind {
        self.selection.read().await.mode
    }

    /// Marks the coordinator initialised and tries to connect the active
    /// transport. A failed connect is not fatal; commands retry it.
    pub async fn start(&self) -> bool {
        let selection = self.selection.read().await;
        self.started.store(true, Ordering::SeqCst);

        let active = self.transport(selection.mode);
        info!(mode = %selection.mode, endpoint = %active.info().endpoint, "Starting coordinator");
        let connected = active.connect().await;
        if connected {
            info!(mode = %selection.mode, "Connected to application");
        } else {
            warn!(
                mode = %selection.mode,
                endpoint = %active.info().endpoint,
                "Could not connect to application on startup; make sure the application is running"
            );
        }
        connected
    }

    /// Disconnects both transports and returns to the uninitialised state.
    pub async fn shutdown(&self) {
        let _selection = self.selection.write().await;
        for kind in TransportKind::ALL {
            if !self.transport(kind).disconnect().await {
                warn!(transport = %kind, "Disconnect reported failure during shutdown");
            }
        }
        self.started.store(false, Ordering::SeqCst);
        info!("Coordinator shut down");
    }

    /// Makes `target` the active transport.
    ///
    /// Selecting the already-active transport changes nothing. Otherwise the
    /// old transport is disconnected before the new one connects, so at most
    /// one is connected at a time.
    pub async fn switch(&self, target: TransportKind) -> SwitchOutcome {
        let mut selection = self.selection.write().await;
        let previous = selection.mode;

        if previous == target {
            let connected = self.transport(target).is_connected();
            debug!(mode = %target, "Switch requested to the active transport");
            return SwitchOutcome {
                success: true,
                mode: target,
                previous,
                connected,
                message: format!("already using {target} transport"),
            };
        }

        info!(from = %previous, to = %target, "Switching transport");
        if !self.transport(previous).disconnect().await {
            warn!(transport = %previous, "Failed to disconnect previous transport; continuing");
        }

        selection.mode = target;
        selection.switched_at = Some(Timestamp::now());

        let connected = self.transport(target).connect().await;
        let message = if connected {
            format!("switched from {previous} to {target} transport")
        } else {
            warn!(
                mode = %target,
                endpoint = %self.transport(target).info().endpoint,
                "Switched transport but could not connect; will retry on next command"
            );
            format!("switched from {previous} to {target} transport; connection will be retried on the next command")
        };

        SwitchOutcome {
            success: true,
            mode: target,
            previous,
            connected,
            message,
        }
    }

    /// Snapshot of the selection and the active transport.
    pub async fn status(&self) -> CoordinatorStatus {
        if !self.started.load(Ordering::SeqCst) {
            return CoordinatorStatus::NotInitialized;
        }
        let selection = *self.selection.read().await;
        CoordinatorStatus::Ready {
            mode: selection.mode,
            transport: self.transport(selection.mode).info(),
            switched_at: selection.switched_at,
        }
    }

    /// Runs `command` on the active transport.
    ///
    /// A transport that claims to be connected is health-checked first and
    /// replaced with a fresh connection if the check fails. The whole call is
    /// bounded by the configured request timeout.
    pub async fn execute(&self, command: &Command) -> CommandResult {
        let selection = self.selection.read().await;
        let mode = selection.mode;
        let span = tracing::info_span!(
            "execute",
            command = %command.name(),
            request_id = %command.id(),
            transport = %mode,
        );

        async {
            let active = self.transport(mode);

            if active.is_connected() && !self.is_healthy(active.as_ref()).await {
                info!("Active connection failed its health check; reconnecting");
                active.disconnect().await;
            }

            let deadline = self.config.request_timeout();
            let result = match timeout(deadline, active.execute(command)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout_ms = deadline.as_millis() as u64, "Command exceeded request timeout; disconnecting");
                    active.disconnect().await;
                    BridgeError::Timeout { after: deadline }.into()
                }
            };

            match result.error_kind() {
                None => debug!("Command succeeded"),
                Some(kind) => debug!(error_kind = %kind, error = result.error().unwrap_or_default(), "Command failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Passive check, then the optional round-trip probe.
    async fn is_healthy(&self, transport: &dyn Transport) -> bool {
        if !transport.check_health().await {
            return false;
        }
        let Some(probe) = self
            .config
            .probe_command
            .as_deref()
            .and_then(|name| Command::named(name, Params::new()))
        else {
            return true;
        };

        let deadline = self.config.request_timeout();
        match timeout(deadline, transport.send_command(&probe)).await {
            Ok(result) => match result.error_kind() {
                // The application answered, even if it disliked the probe.
                None | Some(ErrorKind::ApplicationError | ErrorKind::UnknownCommand) => true,
                Some(kind) => {
                    debug!(error_kind = %kind, "Probe command failed");
                    false
                }
            },
            Err(_) => false,
        }
    }
}
