use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Endpoint and timing configuration for [`crate::GrpcTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrpcConfig {
    /// `host:port` of the application's RPC server. A `http://` or `https://`
    /// prefix is accepted and kept.
    pub address: String,
    /// Bound on establishing the HTTP/2 channel.
    pub connect_timeout_ms: u64,
    /// Deadline for each call, including the liveness probe made on connect.
    pub request_timeout_ms: u64,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            address: "localhost:50051".to_string(),
            connect_timeout_ms: 10_000,
            request_timeout_ms: 15_000,
        }
    }
}

impl GrpcConfig {
    /// The address as a URI tonic can dial.
    pub fn uri(&self) -> String {
        if self.address.starts_with("http://") || self.address.starts_with("https://") {
            self.address.clone()
        } else {
            format!("http://{}", self.address)
        }
    }

    /// Bound on dialling the channel.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Deadline applied to every call, the connect probe included.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
