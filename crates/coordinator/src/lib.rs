//! softbridge transport coordinator.
//!
//! Owns the two pre-built transports and the choice of which one is active.
//! Every command goes through [`Coordinator::execute`]; the active transport
//! can be changed at runtime with [`Coordinator::switch`] without rebuilding
//! anything.
//!
//! ## Architectural Layer
//!
//! **Application.** Depends only on the [`bridge::Transport`] port. Which
//! concrete transports sit behind it is decided by the binary.

mod config;
mod coordinator;
mod status;

pub use config::CoordinatorConfig;
pub use coordinator::Coordinator;
pub use status::{CoordinatorStatus, SwitchOutcome};
