//! softbridge structured-RPC transport.
//!
//! Implements [`bridge::Transport`] over the application's gRPC service
//! (`mcp.MCPService`, schema in `proto/software_service.proto`). Unlike the
//! stream transport, the command set is closed: each supported command name
//! maps to exactly one RPC method with typed request and response messages.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** The transport talks to a [`SoftwareService`] port. The
//! production implementation is the tonic client in [`client`]; tests supply
//! in-memory services through a [`ServiceConnector`].
//!
//! ## Module Layout
//!
//! | Module      | Contents |
//! |-------------|----------|
//! | `proto`     | prost messages mirroring the schema |
//! | `service`   | `SoftwareService` and `ServiceConnector` ports |
//! | `client`    | tonic client and connector |
//! | `method`    | `RpcMethod`: the command → RPC table and dispatch |
//! | `mapping`   | params → request messages, responses → `CommandResult` |
//! | `transport` | `GrpcTransport` |

pub mod client;
mod config;
mod error;
mod mapping;
mod method;
pub mod proto;
pub mod service;
mod transport;

pub use client::{SoftwareServiceClient, TonicConnector};
pub use config::GrpcConfig;
pub use error::RpcError;
pub use method::RpcMethod;
pub use service::{ServiceConnector, SoftwareService};
pub use transport::GrpcTransport;
