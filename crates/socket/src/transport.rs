use std::sync::{Mutex as StdMutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bridge::response::normalize;
use bridge::{
    BridgeError, Command, CommandResult, Timestamp, Transport, TransportInfo, TransportKind,
};
use futures::FutureExt;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::timeout;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, error, info, trace, warn, Instrument};

use crate::{JsonDocumentCodec, SocketConfig, SocketError};

/// Stream transport to the application's TCP socket server.
///
/// One socket, one command in flight: the socket sits behind an async mutex
/// for the whole write-then-read round trip. While a round trip runs the
/// socket is taken out of its slot; if the round trip fails or the caller
/// abandons it, the socket is dropped and the transport reads as disconnected.
pub struct SocketTransport {
    config: SocketConfig,
    stream: Mutex<Option<TcpStream>>,
    /// `Some(connected_at)` while connected. Kept outside the async mutex so
    /// `is_connected` and `info` never wait on an in-flight command.
    link: StdMutex<Option<Timestamp>>,
}

impl SocketTransport {
    /// Creates a disconnected transport; nothing is dialled until `connect`.
    pub fn new(config: SocketConfig) -> Self {
        info!(endpoint = %config.endpoint(), "Initialized socket transport");
        Self {
            config,
            stream: Mutex::new(None),
            link: StdMutex::new(None),
        }
    }

    /// The configuration this transport was built with.
    pub fn config(&self) -> &SocketConfig {
        &self.config
    }

    fn connected_since(&self) -> Option<Timestamp> {
        *self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_link(&self, since: Option<Timestamp>) {
        *self.link.lock().unwrap_or_else(PoisonError::into_inner) = since;
    }

    async fn open(&self) -> Result<TcpStream, SocketError> {
        let endpoint = self.config.endpoint();
        let after = self.config.connect_timeout();
        let stream = timeout(
            after,
            TcpStream::connect((self.config.host.as_str(), self.config.port)),
        )
        .await
        .map_err(|_| SocketError::ConnectTimeout {
            endpoint: endpoint.clone(),
            after,
        })?
        .map_err(|source| SocketError::Connect { endpoint, source })?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    /// Fills `slot` with a fresh socket unless it already holds a live one.
    async fn establish(&self, slot: &mut Option<TcpStream>) -> bool {
        if slot.is_some() && self.is_connected() {
            return true;
        }

        info!(endpoint = %self.config.endpoint(), "Attempting socket connection");
        match self.open().await {
            Ok(stream) => {
                *slot = Some(stream);
                self.set_link(Some(Timestamp::now()));
                info!(endpoint = %self.config.endpoint(), "Socket connection established");
                true
            }
            Err(e) => {
                *slot = None;
                self.set_link(None);
                error!(endpoint = %self.config.endpoint(), error = %e, "Socket connection failed");
                false
            }
        }
    }

    /// One round trip on the socket held in `slot`.
    ///
    /// The socket goes back into the slot unless the failure forces a
    /// disconnect.
    async fn exchange(
        &self,
        mut slot: MutexGuard<'_, Option<TcpStream>>,
        command: &Command,
    ) -> CommandResult {
        let Some(mut stream) = slot.take() else {
            return BridgeError::NotConnected.into();
        };
        let guard = InFlight::new(self);

        match self.round_trip(&mut stream, command).await {
            Ok(document) => {
                *slot = Some(stream);
                guard.complete();
                normalize(document)
            }
            Err(e) => {
                let err = BridgeError::from(e);
                if err.forces_disconnect() {
                    // Dropping the socket closes it; the guard clears the link.
                    drop(stream);
                    drop(guard);
                    warn!(error = %err, kind = %err.kind(), "Socket command failed; disconnected");
                } else {
                    *slot = Some(stream);
                    guard.complete();
                    warn!(error = %err, kind = %err.kind(), "Socket command failed");
                }
                err.into()
            }
        }
    }

    async fn round_trip(
        &self,
        stream: &mut TcpStream,
        command: &Command,
    ) -> Result<Value, SocketError> {
        let mut codec = JsonDocumentCodec::new(
            self.config.command_key,
            self.config.max_response_bytes,
        );
        let mut request = BytesMut::new();
        codec.encode(command, &mut request)?;
        stream.write_all(&request).await?;
        stream.flush().await?;
        debug!(request_bytes = request.len(), "Command sent, waiting for response");

        let document = read_document(
            stream,
            &mut codec,
            self.config.read_timeout(),
            self.config.read_chunk_bytes,
        )
        .await?;
        Ok(document)
    }
}

fn command_span(command: &Command) -> tracing::Span {
    tracing::debug_span!(
        "socket_command",
        command = %command.name(),
        request_id = %command.id(),
    )
}

/// Reads until `codec` yields one complete document.
///
/// Each read is bounded by `idle`. When a read times out the buffer decides
/// which framing failure is reported: nothing received is a
/// [`SocketError::NoResponse`], a partial document is
/// [`SocketError::Incomplete`]. A zero-byte read means the peer closed the
/// connection.
pub(crate) async fn read_document<R>(
    reader: &mut R,
    codec: &mut JsonDocumentCodec,
    idle: Duration,
    chunk_bytes: usize,
) -> Result<Value, SocketError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(chunk_bytes);
    loop {
        buffer.reserve(chunk_bytes);
        let read = match timeout(idle, reader.read_buf(&mut buffer)).await {
            Ok(read) => read?,
            Err(_) => {
                warn!(buffered = buffer.len(), "Socket timeout during receive");
                break;
            }
        };
        if read == 0 {
            return Err(SocketError::PeerClosed {
                received: buffer.len(),
            });
        }
        trace!(chunk = read, buffered = buffer.len(), "Received response chunk");
        if let Some(document) = codec.decode(&mut buffer)? {
            if !buffer.is_empty() {
                debug!(trailing = buffer.len(), "Ignoring bytes after response document");
            }
            return Ok(document);
        }
    }

    if buffer.is_empty() {
        Err(SocketError::NoResponse { after: idle })
    } else {
        Err(SocketError::Incomplete {
            received: buffer.len(),
        })
    }
}

/// Marks the transport disconnected unless the round trip completes.
///
/// Covers the caller dropping the future mid-read: the taken socket is
/// dropped with the future and this guard clears the link.
struct InFlight<'a> {
    transport: &'a SocketTransport,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(transport: &'a SocketTransport) -> Self {
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
impl Transport for SocketTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Stream
    }

    async fn connect(&self) -> bool {
        let mut slot = self.stream.lock().await;
        self.establish(&mut slot).await
    }

    async fn disconnect(&self) -> bool {
        let mut slot = self.stream.lock().await;
        if let Some(mut stream) = slot.take() {
            if let Err(e) = stream.shutdown().await {
                debug!(error = %e, "Socket shutdown reported an error; dropping anyway");
            }
            info!(endpoint = %self.config.endpoint(), "Socket disconnected");
        }
        self.set_link(None);
        true
    }

    async fn send_command(&self, command: &Command) -> CommandResult {
        async move {
            let slot = self.stream.lock().await;
            self.exchange(slot, command).await
        }
        .instrument(command_span(command))
        .await
    }

    /// Connects under the stream lock, then runs the round trip.
    ///
    /// A caller queued behind a round trip that dropped the socket finds the
    /// slot empty once it gets the lock, and reconnects instead of failing
    /// with `not connected`.
    async fn execute(&self, command: &Command) -> CommandResult {
        async move {
            let mut slot = self.stream.lock().await;
            if !self.establish(&mut slot).await {
                warn!("Cannot execute command: connection failed");
                return BridgeError::ConnectionFailed {
                    kind: TransportKind::Stream,
                    endpoint: self.config.endpoint(),
                }
                .into();
            }
            self.exchange(slot, command).await
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
            kind: TransportKind::Stream,
            endpoint: self.config.endpoint(),
            connected: since.is_some(),
            connected_since: since,
        }
    }

    /// Passive probe: a non-blocking peek at the socket.
    ///
    /// Nothing readable means an idle, healthy connection. End-of-stream, an
    /// error, or unsolicited bytes waiting ahead of the next response all mean
    /// the socket must be replaced. A socket busy with a round trip is alive.
    async fn check_health(&self) -> bool {
        let Ok(slot) = self.stream.try_lock() else {
            return self.is_connected();
        };
        let Some(stream) = slot.as_ref() else {
            return false;
        };

        let mut probe = [0u8; 1];
        match stream.peek(&mut probe).now_or_never() {
            None => true,
            Some(Ok(0)) => {
                debug!(endpoint = %self.config.endpoint(), "Health check: peer closed the connection");
                false
            }
            Some(Ok(_)) => {
                warn!(endpoint = %self.config.endpoint(), "Health check: unsolicited bytes on idle socket");
                false
            }
            Some(Err(e)) => {
                debug!(endpoint = %self.config.endpoint(), error = %e, "Health check: socket error");
                false
            }
        }
    }
}
