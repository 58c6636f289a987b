//! Line-oriented JSON session.
//!
//! Each input line is one request; each request gets exactly one reply line.
//!
//! ```text
//! {"op": "execute", "command": "create_object", "params": {"name": "Cube", "type": "mesh"}}
//! {"op": "switch", "mode": "structured"}
//! {"op": "status"}
//! ```

use bridge::{Command, Params, TransportKind};
use coordinator::Coordinator;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request {
    Execute {
        command: String,
        #[serde(default)]
        params: Params,
    },
    Switch {
        mode: String,
    },
    Status,
}

fn invalid(reason: impl std::fmt::Display) -> Value {
    json!({"success": false, "error": format!("invalid request: {reason}")})
}

/// Produces the reply for one input line.
pub async fn handle_line(coordinator: &Coordinator, line: &str) -> anyhow::Result<Value> {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => return Ok(invalid(e)),
    };

    let reply = match request {
        Request::Execute { command, params } => {
            let Some(command) = Command::named(command, params) else {
                return Ok(invalid("command name must not be empty"));
            };
            coordinator.execute(&command).await.to_json()
        }
        Request::Switch { mode } => match mode.parse::<TransportKind>() {
            Ok(target) => serde_json::to_value(coordinator.switch(target).await)?,
            Err(e) => invalid(e),
        },
        Request::Status => serde_json::to_value(coordinator.status().await)?,
    };
    Ok(reply)
}

/// Serves requests from `input` until end of input.
pub async fn run<R, W>(coordinator: &Coordinator, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Session started; reading requests from stdin");
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!(bytes = line.len(), "Session request");
        let reply = handle_line(coordinator, line).await?;
        let mut encoded = serde_json::to_vec(&reply)?;
        encoded.push(b'\n');
        output.write_all(&encoded).await?;
        output.flush().await?;
    }
    info!("Session input closed");
    Ok(())
}
