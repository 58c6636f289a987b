use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Key under which the command name travels in the request document.
///
/// The application accepts either convention; which one a deployment uses is
/// fixed by whoever wrote its dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKey {
    /// `{"command": "<name>", "params": {..}}`
    #[default]
    Command,
    /// `{"type": "<name>", "params": {..}}`
    Type,
}

impl CommandKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Type => "type",
        }
    }
}

/// Endpoint and timing configuration for [`crate::SocketTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketConfig {
    /// Host name or address of the application's socket server.
    pub host: String,
    /// TCP port of the application's socket server.
    pub port: u16,
    /// Bound on establishing the TCP connection.
    pub connect_timeout_ms: u64,
    /// Bound on each read while waiting for (more of) a response.
    pub read_timeout_ms: u64,
    /// Largest response accepted before the read is abandoned as a framing error.
    pub max_response_bytes: usize,
    /// Size of each socket read.
    pub read_chunk_bytes: usize,
    /// Request key carrying the command name.
    pub command_key: CommandKey,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9876,
            connect_timeout_ms: 10_000,
            read_timeout_ms: 15_000,
            max_response_bytes: 16 * 1024 * 1024,
            read_chunk_bytes: 8192,
            command_key: CommandKey::Command,
        }
    }
}

impl SocketConfig {
    /// Returns `host:port`.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Bound on establishing the TCP connection.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Bound on each read while waiting for a response.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
