//! softbridge stream transport.
//!
//! Implements [`bridge::Transport`] over a plain TCP socket: each command is
//! written as one JSON document, and the reply is read back by accumulating
//! bytes until they parse as one complete JSON document.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Socket lifecycle, framing, timeouts, and liveness
//! probing all live here. The coordinator sees only [`bridge::Transport`].
//!
//! ## Framing
//!
//! The wire carries no length prefix and no delimiter. A response is complete
//! the moment the accumulated bytes form a syntactically complete JSON
//! document; anything after it is ignored. One request implies exactly one
//! response per round trip.
//!
//! A reply whose leading bytes happen to be a complete document on their own
//! (a bare number, say) is returned as soon as those bytes arrive. That is
//! inherent to delimiter-less framing and is not guarded against.

mod codec;
mod config;
mod error;
mod transport;

pub use codec::JsonDocumentCodec;
pub use config::{CommandKey, SocketConfig};
pub use error::SocketError;
pub use transport::SocketTransport;
