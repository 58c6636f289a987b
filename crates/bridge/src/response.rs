//! Normalisation of free-form JSON replies into [`CommandResult`].
//!
//! The remote application answers stream-transport commands with one JSON
//! document in one of two conventions:
//!
//! | Shape | Meaning |
//! |-------|---------|
//! | `{"success": bool, "error"?: .., ...fields}` | Flat envelope; fields are the payload |
//! | `{"status": "success" \| "error", "result"?: {..}, "message"?: ..}` | Wrapped envelope |
//!
//! plus a bare `{"error": .., "message"?: ..}` for requests it could not
//! dispatch at all. [`normalize`] folds all of these into the uniform result.
//! Application failures become [`ErrorKind::ApplicationError`] with the
//! application's text passed through verbatim.

use serde_json::{Map, Value};

use crate::{CommandResult, ErrorKind};

const FALLBACK_FAILURE: &str = "application reported failure";

/// Folds one decoded reply document into a [`CommandResult`].
pub fn normalize(document: Value) -> CommandResult {
    let mut object = match document {
        Value::Object(object) => object,
        other => {
            let mut payload = Map::new();
            payload.insert("value".to_string(), other);
            return CommandResult::ok(payload);
        }
    };

    // Wrapped envelope: {"status": "...", "result": {...}}
    let status = object
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_owned);
    if let Some(status) = status {
        match status.as_str() {
            "error" => {
                let message = take_text(&mut object, "message")
                    .or_else(|| take_text(&mut object, "error"))
                    .unwrap_or_else(|| FALLBACK_FAILURE.to_string());
                return CommandResult::failure(ErrorKind::ApplicationError, message);
            }
            "success" | "ok" => {
                return match object.remove("result") {
                    Some(Value::Object(result)) => CommandResult::ok(result),
                    Some(other) => {
                        let mut payload = Map::new();
                        payload.insert("result".to_string(), other);
                        CommandResult::ok(payload)
                    }
                    None => {
                        object.remove("status");
                        CommandResult::ok(object)
                    }
                };
            }
            // Any other status string is ordinary payload (e.g. "running").
            _ => {}
        }
    }

    // Flat envelope: {"success": bool, ...}
    if let Some(success) = object.get("success").and_then(Value::as_bool) {
        if success {
            return CommandResult::ok(object);
        }
        let message = take_text(&mut object, "error")
            .or_else(|| take_text(&mut object, "message"))
            .unwrap_or_else(|| FALLBACK_FAILURE.to_string());
        return CommandResult::failure(ErrorKind::ApplicationError, message);
    }

    // Dispatch failure without a success flag: {"error": "...", "message"?: "..."}
    if let Some(error) = take_text(&mut object, "error") {
        let message = match take_text(&mut object, "message") {
            Some(detail) => format!("{error}: {detail}"),
            None => error,
        };
        return CommandResult::failure(ErrorKind::ApplicationError, message);
    }

    CommandResult::ok(object)
}

/// Removes `key` and renders it as text; non-string values keep their JSON form.
fn take_text(object: &mut Map<String, Value>, key: &str) -> Option<String> {
    match object.remove(key)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
