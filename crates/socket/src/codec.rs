//! Delimiter-less JSON document codec.
//!
//! Encodes a [`Command`] as one JSON document and decodes the first complete
//! JSON document found at the front of the read buffer. No length prefix and
//! no newline: completeness is decided purely by whether the buffered bytes
//! parse.
//!
//! A parse is only attempted once a top-level value may have ended. The
//! decoder tracks bracket depth and string state across calls, so each
//! buffered byte is scanned once however many chunks the response spans.

use bridge::Command;
use serde_json::{Map, Value};
use tokio_util::bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{CommandKey, SocketError};

/// Codec for the application's socket protocol.
#[derive(Debug, Clone)]
pub struct JsonDocumentCodec {
    command_key: CommandKey,
    max_bytes: usize,
    scan: Scan,
}

/// Lexical position reached in the read buffer.
#[derive(Debug, Clone, Copy, Default)]
struct Scan {
    offset: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl Scan {
    /// Consumes the bytes of `src` not seen yet. Returns `true` if one of them
    /// may end a top-level value: a closing bracket back to depth zero, the
    /// closing quote of a top-level string, or a top-level scalar byte.
    fn advance(&mut self, src: &[u8]) -> bool {
        let mut boundary = false;
        for &byte in src.get(self.offset..).unwrap_or_default() {
            if self.in_string {
                match byte {
                    _ if self.escaped => self.escaped = false,
                    b'\\' => self.escaped = true,
                    b'"' => {
                        self.in_string = false;
                        boundary |= self.depth == 0;
                    }
                    _ => {}
                }
                continue;
            }
            match byte {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => {
                    self.depth = self.depth.saturating_sub(1);
                    boundary |= self.depth == 0;
                }
                b' ' | b'\t' | b'\n' | b'\r' => {}
                _ => boundary |= self.depth == 0,
            }
        }
        self.offset = src.len();
        boundary
    }
}

impl JsonDocumentCodec {
    /// Codec writing the command name under `command_key` and refusing
    /// responses that grow past `max_bytes` without completing.
    pub fn new(command_key: CommandKey, max_bytes: usize) -> Self {
        Self {
            command_key,
            max_bytes,
            scan: Scan::default(),
        }
    }
}

impl Decoder for JsonDocumentCodec {
    type Item = Value;
    type Error = SocketError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !self.scan.advance(&src[..]) {
            return if src.len() > self.max_bytes {
                Err(SocketError::TooLarge {
                    limit: self.max_bytes,
                })
            } else {
                Ok(None)
            };
        }

        let parsed = {
            let mut documents = serde_json::Deserializer::from_slice(&src[..]).into_iter::<Value>();
            match documents.next() {
                Some(Ok(document)) => Some((document, documents.byte_offset())),
                // Truncated or not yet valid: wait for more bytes.
                Some(Err(_)) | None => None,
            }
        };

        match parsed {
            Some((document, consumed)) => {
                src.advance(consumed);
                self.scan = Scan::default();
                Ok(Some(document))
            }
            None if src.len() > self.max_bytes => Err(SocketError::TooLarge {
                limit: self.max_bytes,
            }),
            None => Ok(None),
        }
    }
}

impl Encoder<&Command> for JsonDocumentCodec {
    type Error = SocketError;

    fn encode(&mut self, command: &Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut request = Map::new();
        request.insert(
            self.command_key.as_str().to_string(),
            Value::String(command.name().to_string()),
        );
        request.insert(
            "params".to_string(),
            Value::Object(command.params().clone()),
        );
        let json = serde_json::to_vec(&request)?;
        tracing::trace!(request_bytes = json.len(), "Encoded request document");
        dst.extend_from_slice(&json);
        Ok(())
    }
}
