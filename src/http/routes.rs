use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::{debug, error, warn};

use crate::domain::{ErrorCode, ToolOutcome};
use crate::http::AppState;
use crate::mcp::protocol::MCP_VERSION;
use crate::rpc;
use crate::stream::{encode, encode_result, ResponseFragments};

/// Human-readable server name used by `/` and `/health`
pub const SERVER_DISPLAY_NAME: &str = "MLB Stats MCP Server";

pub const PROTOCOL_INFO_FEATURES: [&str; 5] = [
    "Transfer-Encoding: chunked",
    "Server-Side Events deprecated",
    "Tool annotations",
    "Progress notifications",
    "JSON-RPC batching",
];

/// Errors from the plain `/tools/{name}` route
///
/// Rendered as `{"error":{"code":<symbolic code>,"message":...}}`.
#[derive(Debug)]
pub enum ToolRouteError {
    NotFound(String),
    BadRequest(String),
    Failed { code: ErrorCode, message: String },
}

impl IntoResponse for ToolRouteError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ToolRouteError::NotFound(message) => {
                (StatusCode::NOT_FOUND, ErrorCode::ToolNotFound, message)
            }
            ToolRouteError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidRequest, message)
            }
            ToolRouteError::Failed { code, message } => {
                let status = match code {
                    ErrorCode::ToolNotFound => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, code, message)
            }
        };
        (
            status,
            Json(json!({ "error": {"code": code.as_str(), "message": message} })),
        )
            .into_response()
    }
}

/// Wrap a fragment sequence in a chunked `application/json` response
pub(crate) fn chunked_response(fragments: ResponseFragments) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::TRANSFER_ENCODING, "chunked"),
        ],
        Body::from_stream(fragments.into_stream()),
    )
        .into_response()
}

pub(crate) async fn root() -> Json<Value> {
    Json(json!({
        "message": SERVER_DISPLAY_NAME,
        "transport": "Streamable HTTP",
    }))
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<Value> {
    let version = state
        .invoker
        .provider_version()
        .await
        .unwrap_or_else(|| "unknown".to_string());

    Json(json!({
        "status": "healthy",
        "server": SERVER_DISPLAY_NAME,
        "version": version,
        "protocol": "Streamable HTTP",
        "protocol_version": MCP_VERSION,
        "cache": state.invoker.cache().info(),
    }))
}

pub(crate) async fn protocol_info() -> Json<Value> {
    Json(json!({
        "protocol": "MCP Streamable HTTP",
        "version": MCP_VERSION,
        "features": PROTOCOL_INFO_FEATURES,
        "client_requirements": ["Support for chunked transfer encoding"],
        "cloudflare_compatible": true,
        "oauth_supported": true,
        "streaming_mode": true,
        "supports_jsonrpc": true,
    }))
}

pub(crate) async fn list_tools(State(state): State<AppState>) -> Response {
    let tools = json!({ "tools": state.invoker.registry().summaries() });
    chunked_response(encode_result(tools, None))
}

pub(crate) async fn call_tool(
    State(state): State<AppState>,
    Path(tool_name): Path<String>,
    body: Bytes,
) -> Result<Response, ToolRouteError> {
    if !state.invoker.has_tool(&tool_name) {
        warn!("HTTP call for unknown tool: {}", tool_name);
        return Err(ToolRouteError::NotFound(format!("Unknown tool: {}", tool_name)));
    }

    let arguments = parse_arguments(&body).map_err(ToolRouteError::BadRequest)?;
    debug!("HTTP tool call: {}", tool_name);

    match state.invoker.invoke(&tool_name, arguments).await {
        outcome @ ToolOutcome::Success(_) => Ok(chunked_response(encode(outcome, None))),
        ToolOutcome::Failure { code, message } => Err(ToolRouteError::Failed { code, message }),
    }
}

pub(crate) async fn jsonrpc(State(state): State<AppState>, body: Bytes) -> Response {
    match rpc::handle(&state.invoker, &body).await {
        Ok(fragments) => chunked_response(fragments),
        Err(e) => {
            if e.code() != ErrorCode::InternalError {
                debug!("JSON-RPC request rejected: {}", e);
            }
            e.into_response()
        }
    }
}

/// Decode a tool call body; empty bodies and `null` mean no arguments
fn parse_arguments(body: &[u8]) -> Result<Map<String, Value>, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(arguments)) => Ok(arguments),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(_) => Err("Request body must be a JSON object of tool arguments".to_string()),
        Err(e) => {
            error!("Unparseable tool call body: {}", e);
            Err(format!("Invalid JSON body: {}", e))
        }
    }
}
