//! softbridge CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Resolve configuration**: defaults, then the optional TOML file, then
//!    `SOFTBRIDGE_*` environment variables and flags.
//! 2. **Wire observability**: `tracing-subscriber` on stderr (text or JSON)
//!    plus an optional OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: one `SocketTransport` and one
//!    `GrpcTransport`, both handed to a `Coordinator`.
//! 4. **Run the requested mode**: a single `exec`, a `status` snapshot, or the
//!    stdin/stdout JSON `session` (the default).

mod config;
mod observability;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use bridge::{Command, Params, Transport, TransportKind};
use clap::{Parser, Subcommand};
use coordinator::Coordinator;
use grpc::GrpcTransport;
use serde_json::Value;
use socket::SocketTransport;
use tokio::io::BufReader;
use tracing::info;

use crate::config::{AppConfig, Overrides};
use crate::observability::LogFormat;

#[derive(Debug, Parser)]
#[command(
    name = "softbridge",
    version,
    about = "Send commands to a running application over a TCP socket or gRPC"
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "SOFTBRIDGE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Transport active at startup (stream/socket or structured/grpc).
    #[arg(long, env = "SOFTBRIDGE_MODE", global = true)]
    mode: Option<TransportKind>,

    /// Socket server host.
    #[arg(long, env = "SOFTBRIDGE_HOST", global = true)]
    host: Option<String>,

    /// Socket server port.
    #[arg(long, env = "SOFTBRIDGE_PORT", global = true)]
    port: Option<u16>,

    /// gRPC server address (host:port).
    #[arg(long, env = "SOFTBRIDGE_GRPC_ADDRESS", global = true)]
    grpc_address: Option<String>,

    /// Upper bound on a single command, in seconds.
    #[arg(long, env = "SOFTBRIDGE_REQUEST_TIMEOUT_SECS", global = true)]
    request_timeout_secs: Option<u64>,

    /// Log line format on stderr.
    #[arg(long, value_enum, env = "SOFTBRIDGE_LOG_FORMAT", global = true)]
    log_format: Option<LogFormat>,

    /// OTLP collector endpoint for span export, e.g. http://localhost:4317.
    #[arg(long, env = "SOFTBRIDGE_OTLP_ENDPOINT", global = true)]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Run one command and print its result as JSON.
    Exec {
        /// Command name, e.g. get_software_info.
        name: String,
        /// Parameter as key=value; repeatable. Numbers, booleans, and null
        /// are sent as JSON values, everything else as a string.
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,
    },
    /// Connect and print the coordinator status.
    Status,
    /// Read JSON requests from stdin, one per line (default).
    Session,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            mode: self.mode,
            host: self.host.clone(),
            port: self.port,
            grpc_address: self.grpc_address.clone(),
            request_timeout_secs: self.request_timeout_secs,
            log_format: self.log_format,
            otlp_endpoint: self.otlp_endpoint.clone(),
        }
    }
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    let value = match serde_json::from_str::<Value>(value) {
        Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => v,
        _ => Value::String(value.to_string()),
    };
    Ok((key.to_string(), value))
}

fn build_coordinator(config: &AppConfig) -> Coordinator {
    let stream: Arc<dyn Transport> = Arc::new(SocketTransport::new(config.socket.clone()));
    let structured: Arc<dyn Transport> = Arc::new(GrpcTransport::new(config.grpc.clone()));
    Coordinator::new(config.coordinator.clone(), stream, structured)
}

async fn run(cli: Cli, coordinator: &Coordinator) -> anyhow::Result<ExitCode> {
    match cli.command.unwrap_or(Mode::Session) {
        Mode::Exec { name, params } => {
            let params: Params = params.into_iter().collect();
            let command = Command::named(name, params).context("command name must not be empty")?;
            coordinator.start().await;
            let result = coordinator.execute(&command).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(if result.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Mode::Status => {
            coordinator.start().await;
            let status = coordinator.status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(ExitCode::SUCCESS)
        }
        Mode::Session => {
            coordinator.start().await;
            let stdin = BufReader::new(tokio::io::stdin());
            let stdout = tokio::io::stdout();
            tokio::select! {
                result = session::run(coordinator, stdin, stdout) => result?,
                signal = tokio::signal::ctrl_c() => {
                    signal.context("failed to listen for Ctrl-C")?;
                    info!("Interrupted; ending session");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?.apply(cli.overrides());
    let _telemetry = observability::init(
        config.logging.format,
        config.logging.otlp_endpoint.as_deref(),
    )?;

    info!(
        mode = %config.coordinator.default_mode,
        socket = %config.socket.endpoint(),
        grpc = %config.grpc.address,
        "softbridge starting"
    );

    let coordinator = build_coordinator(&config);
    let outcome = run(cli, &coordinator).await;
    coordinator.shutdown().await;
    outcome
}
