//! Shared value types for command dispatch.
//!
//! [`Command`] goes down to a transport, [`CommandResult`] comes back up.
//! Both transports must produce the same [`CommandResult`] shape regardless of
//! their wire format; that shape is the only thing the tool layer above the
//! coordinator depends on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{BridgeError, CommandName, ErrorKind, RequestId};

/// Parameter map of a command: string keys, string or primitive values.
pub type Params = Map<String, Value>;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// One command addressed to the remote application.
///
/// Immutable once built. The name and parameters are carried to the
/// application as-is; the [`RequestId`] is local only.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: CommandName,
    params: Params,
    id: RequestId,
}

impl Command {
    /// Creates a command with a fresh request id.
    pub fn new(name: CommandName, params: Params) -> Self {
        Self {
            name,
            params,
            id: RequestId::new_random(),
        }
    }

    /// Creates a command from a raw name, returning `None` if the name is empty.
    pub fn named(name: impl Into<String>, params: Params) -> Option<Self> {
        CommandName::new(name).map(|n| Self::new(n, params))
    }

    /// Returns the command name.
    pub fn name(&self) -> &CommandName {
        &self.name
    }

    /// Returns the parameter map.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the local correlation id.
    pub fn id(&self) -> RequestId {
        self.id
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Keys owned by the result envelope; never allowed inside the payload.
const RESERVED_KEYS: [&str; 3] = ["success", "error", "error_kind"];

/// Uniform outcome of a command, independent of the transport that carried it.
///
/// Invariant: `success == false` exactly when `error` is present. The fields
/// are private so the invariant can only be established through the
/// constructors.
///
/// Serialises as `{"success": .., "error": .., "error_kind": .., ...payload}`
/// with the payload keys flattened to the top level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

impl CommandResult {
    /// A successful result carrying `payload`.
    ///
    /// Envelope keys (`success`, `error`, `error_kind`) are dropped from the
    /// payload so they cannot shadow the envelope when flattened.
    pub fn ok(mut payload: Map<String, Value>) -> Self {
        for key in RESERVED_KEYS {
            payload.remove(key);
        }
        Self {
            success: true,
            error: None,
            error_kind: None,
            payload,
        }
    }

    /// A successful result with an empty payload.
    pub fn ok_empty() -> Self {
        Self::ok(Map::new())
    }

    /// A failed result tagged with `kind`.
    pub fn failure(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            error_kind: Some(kind),
            payload: Map::new(),
        }
    }

    /// Returns `true` if the command succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the error text of a failed result.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the error tag of a failed result.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    /// Returns the payload fields.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Returns one payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Renders the result as its wire JSON object.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("success".to_string(), Value::Bool(self.success));
        if let Some(error) = &self.error {
            object.insert("error".to_string(), Value::String(error.clone()));
        }
        if let Some(kind) = self.error_kind {
            object.insert("error_kind".to_string(), Value::String(kind.to_string()));
        }
        object.extend(self.payload.clone());
        Value::Object(object)
    }
}

impl From<BridgeError> for CommandResult {
    fn from(err: BridgeError) -> Self {
        Self::failure(err.kind(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Transport metadata
// ---------------------------------------------------------------------------

/// Which of the two transports a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// TCP socket carrying JSON documents.
    #[serde(alias = "socket")]
    Stream,
    /// gRPC channel with the fixed method schema.
    #[serde(alias = "grpc")]
    Structured,
}

impl TransportKind {
    /// Both kinds, in a stable order.
    pub const ALL: [TransportKind; 2] = [TransportKind::Stream, TransportKind::Structured];

    /// Returns the lowercase name used in configuration and status output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stream => "stream",
            Self::Structured => "structured",
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a transport name is neither a kind nor a known alias.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transport '{0}' (expected 'stream' or 'structured')")]
pub struct UnknownTransportKind(pub String);

impl std::str::FromStr for TransportKind {
    type Err = UnknownTransportKind;

    /// Case-insensitive; accepts `socket` and `grpc` as aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stream" | "socket" => Ok(Self::Stream),
            "structured" | "grpc" => Ok(Self::Structured),
            _ => Err(UnknownTransportKind(s.to_string())),
        }
    }
}

/// Connection state owned by each transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No live channel; the next `execute` dials a new one.
    Disconnected,
    /// A channel is open and was last seen working.
    Connected,
}

impl ConnectionState {
    /// Maps a liveness flag onto a state.
    pub fn from_connected(connected: bool) -> Self {
        if connected {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }
}

/// Point-in-time description of a transport.
///
/// A snapshot, not a handle: it never exposes the connection itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportInfo {
    /// Which transport this is.
    pub kind: TransportKind,
    /// `host:port` for the stream transport, the service address for gRPC.
    pub endpoint: String,
    /// Whether the transport held a live connection when the snapshot was taken.
    pub connected: bool,
    /// When the current connection was established; `None` while disconnected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_since: Option<Timestamp>,
}

impl TransportInfo {
    /// Returns the connection state described by this snapshot.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_connected(self.connected)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
