//! Application configuration.
//!
//! Precedence, lowest first: built-in defaults, the TOML file, then
//! environment variables and command-line flags (clap resolves those two).

use std::path::Path;

use anyhow::Context;
use bridge::TransportKind;
use coordinator::CoordinatorConfig;
use grpc::GrpcConfig;
use serde::{Deserialize, Serialize};
use socket::SocketConfig;

use crate::observability::LogFormat;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub otlp_endpoint: Option<String>,
}

/// Everything the binary needs to build the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub socket: SocketConfig,
    pub grpc: GrpcConfig,
    pub coordinator: CoordinatorConfig,
    pub logging: LoggingConfig,
}

/// Values given on the command line or through `SOFTBRIDGE_*` variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub mode: Option<TransportKind>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub grpc_address: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub log_format: Option<LogFormat>,
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads `path` if given; otherwise starts from defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(mode) = overrides.mode {
            self.coordinator.default_mode = mode;
        }
        if let Some(host) = overrides.host {
            self.socket.host = host;
        }
        if let Some(port) = overrides.port {
            self.socket.port = port;
        }
        if let Some(address) = overrides.grpc_address {
            self.grpc.address = address;
        }
        if let Some(secs) = overrides.request_timeout_secs {
            self.coordinator.request_timeout_ms = secs.saturating_mul(1000);
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
        if overrides.otlp_endpoint.is_some() {
            self.logging.otlp_endpoint = overrides.otlp_endpoint;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socket::CommandKey;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn toml_sections_override_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [socket]
            host = "modeler.local"
            command_key = "type"

            [grpc]
            address = "modeler.local:6000"

            [coordinator]
            default_mode = "grpc"
            probe_command = "get_software_status"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.socket.host, "modeler.local");
        assert_eq!(config.socket.port, 9876);
        assert_eq!(config.socket.command_key, CommandKey::Type);
        assert_eq!(config.grpc.address, "modeler.local:6000");
        assert_eq!(config.coordinator.default_mode, TransportKind::Structured);
        assert_eq!(
            config.coordinator.probe_command.as_deref(),
            Some("get_software_status")
        );
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(AppConfig::from_toml("[coordinator]\ndefault_mode = \"carrier-pigeon\"").is_err());
    }

    #[test]
    fn overrides_win_over_file() {
        let config = AppConfig::from_toml("[socket]\nport = 7000").unwrap().apply(Overrides {
            mode: Some(TransportKind::Structured),
            port: Some(7100),
            request_timeout_secs: Some(5),
            otlp_endpoint: Some("http://collector:4317".into()),
            ..Overrides::default()
        });

        assert_eq!(config.socket.port, 7100);
        assert_eq!(config.coordinator.default_mode, TransportKind::Structured);
        assert_eq!(config.coordinator.request_timeout_ms, 5_000);
        assert_eq!(
            config.logging.otlp_endpoint.as_deref(),
            Some("http://collector:4317")
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/softbridge.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
