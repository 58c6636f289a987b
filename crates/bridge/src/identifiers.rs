//! Newtype identifiers.
//!
//! A command name and a request identifier are both "just strings" on the
//! wire, but they are never interchangeable: the name is an opaque token the
//! remote application interprets, the request id is a local correlation handle
//! that never leaves the process.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Name of a command understood by the remote application
    /// (e.g. `"get_software_status"`, `"create_object"`).
    ///
    /// The bridge never interprets the name; it is carried verbatim over the
    /// stream transport and looked up in the fixed method table by the
    /// structured transport.
    CommandName
}

// ---------------------------------------------------------------------------

/// Identifies one command dispatch for log correlation.
///
/// Generated fresh for every [`crate::Command`]; recorded on tracing spans so
/// connect, write, read, and normalisation events of one call can be grouped.
/// Never sent to the remote application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
