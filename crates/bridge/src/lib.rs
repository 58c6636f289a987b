//! Core command-dispatch domain for softbridge.
//!
//! This crate contains every value type, newtype identifier, and error type
//! shared between the transports and the coordinator, plus the [`Transport`]
//! port trait that every transport implements. Infrastructure crates implement
//! the trait; they never redefine the result contract.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate performs no network I/O.
//! It defines *what* a transport must do; the `socket` and `grpc` crates define
//! *how* to do it over a TCP stream or a gRPC channel.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`CommandName`, `RequestId`) |
//! | [`types`] | Value types (`Command`, `CommandResult`, `TransportInfo`, etc.) |
//! | [`errors`] | Error taxonomy surfaced through failed results |
//! | [`transport`] | The [`Transport`] port trait |
//! | [`response`] | Normalisation of free-form JSON replies into [`CommandResult`] |

pub mod errors;
pub mod identifiers;
pub mod response;
pub mod transport;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{BridgeError, ErrorKind};
pub use identifiers::{CommandName, RequestId};
pub use transport::Transport;
pub use types::{
    Command, CommandResult, ConnectionState, Params, Timestamp, TransportInfo, TransportKind,
    UnknownTransportKind,
};
