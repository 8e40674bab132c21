/// Incremental JSON-RPC response writer
///
/// `encode` turns a `ToolOutcome` into a lazy iterator of byte fragments. The
/// fragments are produced on demand, so a response body can start flowing to
/// the client before the payload has been serialized, and production simply
/// stops if the body is dropped.

use bytes::Bytes;
use futures::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;

use crate::domain::ToolOutcome;

/// Upper bound on the size of a single payload fragment
pub const MAX_FRAGMENT_LEN: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectState {
    NotStarted,
    Empty,
    HasMembers,
    Closed,
}

/// Writes the punctuation of one JSON object, member by member
///
/// Keys are escaped by serde_json; separators come from the tracked state.
#[derive(Debug)]
struct ObjectWriter {
    state: ObjectState,
}

impl ObjectWriter {
    fn new() -> Self {
        Self {
            state: ObjectState::NotStarted,
        }
    }

    fn open(&mut self) -> Bytes {
        debug_assert_eq!(self.state, ObjectState::NotStarted);
        self.state = ObjectState::Empty;
        Bytes::from_static(b"{")
    }

    /// Emit the separator and key of the next member; the value follows separately
    fn key(&mut self, key: &str) -> Bytes {
        debug_assert!(matches!(self.state, ObjectState::Empty | ObjectState::HasMembers));
        let mut buf = Vec::with_capacity(key.len() + 4);
        if self.state == ObjectState::HasMembers {
            buf.push(b',');
        }
        buf.extend_from_slice(&to_json_bytes(&Value::String(key.to_string())));
        buf.push(b':');
        self.state = ObjectState::HasMembers;
        Bytes::from(buf)
    }

    /// Emit a complete member in one fragment
    fn member(&mut self, key: &str, value: &Value) -> Bytes {
        let mut buf = self.key(key).to_vec();
        buf.extend_from_slice(&to_json_bytes(value));
        Bytes::from(buf)
    }

    fn close(&mut self) -> Bytes {
        debug_assert!(matches!(self.state, ObjectState::Empty | ObjectState::HasMembers));
        self.state = ObjectState::Closed;
        Bytes::from_static(b"}")
    }
}

fn to_json_bytes(value: &Value) -> Vec<u8> {
    // Serializing a Value only fails for non-string map keys, which Value can't hold
    serde_json::to_vec(value).unwrap_or_else(|_| b"null".to_vec())
}

#[derive(Debug)]
enum Stage {
    Open,
    Version,
    Id,
    Key,
    Body { bytes: Bytes, offset: usize },
    Close,
    Done,
}

/// Lazy fragment sequence for one JSON-RPC response
///
/// Finite and not restartable: once exhausted it yields `None` forever.
#[derive(Debug)]
pub struct ResponseFragments {
    writer: ObjectWriter,
    stage: Stage,
    id: Option<Value>,
    member: Option<(&'static str, Value)>,
}

impl ResponseFragments {
    fn new(id: Option<Value>, key: &'static str, value: Value) -> Self {
        Self {
            writer: ObjectWriter::new(),
            stage: Stage::Open,
            id,
            member: Some((key, value)),
        }
    }

    /// Adapt into a body stream for hyper/axum
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
        futures::stream::iter(self.map(Ok::<Bytes, Infallible>))
    }

    /// Drain every fragment into one buffer
    pub fn concat(self) -> Vec<u8> {
        self.fold(Vec::new(), |mut buf, fragment| {
            buf.extend_from_slice(&fragment);
            buf
        })
    }
}

impl Iterator for ResponseFragments {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        loop {
            match std::mem::replace(&mut self.stage, Stage::Done) {
                Stage::Open => {
                    self.stage = Stage::Version;
                    return Some(self.writer.open());
                }
                Stage::Version => {
                    self.stage = Stage::Id;
                    return Some(self.writer.member("jsonrpc", &json!("2.0")));
                }
                Stage::Id => {
                    self.stage = Stage::Key;
                    if let Some(id) = self.id.take() {
                        return Some(self.writer.member("id", &id));
                    }
                }
                Stage::Key => match self.member.take() {
                    Some((key, value)) => {
                        self.stage = Stage::Body {
                            bytes: Bytes::from(to_json_bytes(&value)),
                            offset: 0,
                        };
                        return Some(self.writer.key(key));
                    }
                    None => self.stage = Stage::Close,
                },
                Stage::Body { bytes, offset } => {
                    if offset >= bytes.len() {
                        self.stage = Stage::Close;
                        continue;
                    }
                    let end = usize::min(offset + MAX_FRAGMENT_LEN, bytes.len());
                    let fragment = bytes.slice(offset..end);
                    self.stage = Stage::Body { bytes, offset: end };
                    return Some(fragment);
                }
                Stage::Close => {
                    self.stage = Stage::Done;
                    return Some(self.writer.close());
                }
                Stage::Done => return None,
            }
        }
    }
}

/// Encode a tool outcome as a streamed JSON-RPC response
///
/// With `id` set to `None` the `id` member is omitted entirely; `Some(Value::Null)`
/// writes `"id":null`.
pub fn encode(outcome: ToolOutcome, id: Option<Value>) -> ResponseFragments {
    match outcome {
        ToolOutcome::Success(payload) => ResponseFragments::new(id, "result", payload.into_value()),
        ToolOutcome::Failure { code, message } => ResponseFragments::new(
            id,
            "error",
            json!({ "code": code.rpc_code(), "message": message }),
        ),
    }
}

/// Encode an already-built result value
pub fn encode_result(result: Value, id: Option<Value>) -> ResponseFragments {
    ResponseFragments::new(id, "result", result)
}
