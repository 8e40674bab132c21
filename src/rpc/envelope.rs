/// JSON-RPC 2.0 envelope handling
///
/// Each request is handled on its own: the handler parses the body, checks the
/// envelope, and either rejects it with a protocol error or hands back the
/// fragment sequence of the response. Protocol errors never reach the invoker.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::domain::ErrorCode;
use crate::mcp::protocol::JsonRpcResponse;
use crate::stream::{encode, encode_result, ResponseFragments};
use crate::tools::ToolInvoker;

/// Method that invokes one tool
pub const TOOL_METHOD: &str = "tool";

/// Method that lists tool names and descriptions
pub const LIST_TOOLS_METHOD: &str = "list_tools";

/// Protocol-level failures on the `/jsonrpc` endpoint
///
/// These are answered with a single, non-chunked JSON body.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Parse error: Invalid JSON")]
    Parse,

    #[error("Invalid Request: Not a valid JSON-RPC 2.0 request")]
    InvalidRequest { id: Value },

    #[error("Invalid params: {reason}")]
    InvalidParams { id: Value, reason: String },

    #[error("Method not found: {method}")]
    MethodNotFound { id: Value, method: String },

    #[error("Internal error: {reason}")]
    Internal { id: Value, reason: String },
}

impl RpcError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RpcError::Parse => ErrorCode::ParseError,
            RpcError::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            RpcError::InvalidParams { .. } => ErrorCode::InvalidParams,
            RpcError::MethodNotFound { .. } => ErrorCode::MethodNotFound,
            RpcError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// HTTP status for this error; it need not agree with the JSON-RPC code
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::Parse | RpcError::InvalidRequest { .. } | RpcError::InvalidParams { .. } => {
                StatusCode::BAD_REQUEST
            }
            RpcError::MethodNotFound { .. } => StatusCode::NOT_FOUND,
            RpcError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Request id to echo, `null` when it could not be read
    pub fn id(&self) -> Value {
        match self {
            RpcError::Parse => Value::Null,
            RpcError::InvalidRequest { id }
            | RpcError::InvalidParams { id, .. }
            | RpcError::MethodNotFound { id, .. }
            | RpcError::Internal { id, .. } => id.clone(),
        }
    }

    pub fn to_response_body(&self) -> JsonRpcResponse {
        JsonRpcResponse::from_code(self.id(), self.code(), self.to_string())
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        if let RpcError::Internal { reason, .. } = &self {
            error!("JSON-RPC internal error: {}", reason);
        }
        (self.status(), Json(self.to_response_body())).into_response()
    }
}

/// Handle one `/jsonrpc` request body
pub async fn handle(invoker: &ToolInvoker, body: &[u8]) -> Result<ResponseFragments, RpcError> {
    let request: Value = serde_json::from_slice(body).map_err(|e| {
        debug!("Rejecting unparseable JSON-RPC body: {}", e);
        RpcError::Parse
    })?;

    let Value::Object(mut request) = request else {
        return Err(RpcError::InvalidRequest { id: Value::Null });
    };

    let id = request.remove("id").unwrap_or(Value::Null);

    if request.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        warn!("Rejecting request without jsonrpc 2.0 marker");
        return Err(RpcError::InvalidRequest { id });
    }

    let method = match request.remove("method") {
        Some(Value::String(method)) => method,
        Some(other) => return Err(RpcError::MethodNotFound { id, method: other.to_string() }),
        None => {
            return Err(RpcError::MethodNotFound {
                id,
                method: "None".to_string(),
            })
        }
    };

    let params = request.remove("params");
    contain(&id, dispatch(invoker, method, params, id.clone())).await
}

async fn dispatch(
    invoker: &ToolInvoker,
    method: String,
    params: Option<Value>,
    id: Value,
) -> Result<ResponseFragments, RpcError> {
    match method.as_str() {
        TOOL_METHOD => {
            let (name, arguments) = match tool_call_params(params) {
                Ok(call) => call,
                Err(reason) => return Err(RpcError::InvalidParams { id, reason }),
            };
            debug!("JSON-RPC tool call: {}", name);
            let outcome = invoker.invoke(&name, arguments).await;
            Ok(encode(outcome, Some(id)))
        }
        LIST_TOOLS_METHOD => {
            let summaries = serde_json::to_value(invoker.registry().summaries()).map_err(|e| {
                RpcError::Internal {
                    id: id.clone(),
                    reason: e.to_string(),
                }
            })?;
            Ok(encode_result(summaries, Some(id)))
        }
        _ => Err(RpcError::MethodNotFound { id, method }),
    }
}

/// Turn a panic during dispatch into an internal error carrying the request id
async fn contain<F>(id: &Value, dispatch: F) -> Result<ResponseFragments, RpcError>
where
    F: Future<Output = Result<ResponseFragments, RpcError>>,
{
    match AssertUnwindSafe(dispatch).catch_unwind().await {
        Ok(reply) => reply,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<String>()
                .map(String::as_str)
                .or_else(|| panic.downcast_ref::<&str>().copied())
                .unwrap_or("unexpected failure")
                .to_string();
            Err(RpcError::Internal {
                id: id.clone(),
                reason,
            })
        }
    }
}

/// Pull the tool name and its `parameters` map out of a `tool` request
fn tool_call_params(params: Option<Value>) -> Result<(String, Map<String, Value>), String> {
    let mut params = match params {
        Some(Value::Object(params)) => params,
        _ => return Err("Missing tool name".to_string()),
    };

    let name = match params.remove("name") {
        Some(Value::String(name)) => name,
        _ => return Err("Missing tool name".to_string()),
    };

    let arguments = match params.remove("parameters") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(arguments)) => arguments,
        Some(_) => return Err("parameters must be an object".to_string()),
    };

    Ok((name, arguments))
}
