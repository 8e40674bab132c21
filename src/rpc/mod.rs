/// JSON-RPC over Streamable HTTP
///
/// Validates request envelopes for the `/jsonrpc` endpoint and turns them into
/// streamed responses or protocol errors.

pub mod envelope;

pub use envelope::{handle, RpcError, LIST_TOOLS_METHOD, TOOL_METHOD};
