/// MCP server implementation that handles JSON-RPC communication over stdio
///
/// This module implements the line-oriented MCP session that:
/// 1. Reads one JSON-RPC message per line
/// 2. Dispatches tool calls through the shared `ToolInvoker`
/// 3. Writes one JSON-RPC response per request line
///
/// Requests are served strictly one at a time.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::tools::ToolInvoker;
use crate::ServerError;

/// What to do after handling one message
#[derive(Debug)]
enum Dispatch {
    Respond(JsonRpcResponse),
    /// Notifications get no reply
    Quiet,
    /// The client cancelled; stop reading
    EndSession,
}

/// MCP session bound to a tool invoker
pub struct McpServer {
    invoker: Arc<ToolInvoker>,
    /// Whether the client has sent `initialize`
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(invoker: Arc<ToolInvoker>) -> Self {
        Self {
            invoker,
            initialized: false,
        }
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer).await
    }

    /// Serve one session over any line-oriented byte channel
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (input closed)");
                    break;
                }
                Ok(_) => match self.process_line(&line).await {
                    Dispatch::Respond(response) => {
                        let response_str = serde_json::to_string(&response)?;

                        writer.write_all(response_str.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                    Dispatch::Quiet => {}
                    Dispatch::EndSession => {
                        info!("Client cancelled, ending MCP session");
                        break;
                    }
                },
                Err(e) => {
                    error!("Failed to read from input: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    async fn process_line(&mut self, line: &str) -> Dispatch {
        let line = line.trim();
        if line.is_empty() {
            return Dispatch::Quiet;
        }

        debug!("Processing request: {}", line);

        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Dispatch::Respond(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                    None,
                ));
            }
        };

        let id = message.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                warn!("Malformed JSON-RPC request: {}", e);
                return Dispatch::Respond(JsonRpcResponse::error(
                    id.unwrap_or(Value::Null),
                    error_codes::INVALID_REQUEST,
                    format!("Invalid Request: {}", e),
                    None,
                ));
            }
        };

        if request.is_notification() {
            return self.handle_notification(&request);
        }

        Dispatch::Respond(self.handle_request(request).await)
    }

    fn handle_notification(&mut self, notification: &JsonRpcRequest) -> Dispatch {
        match notification.method.as_str() {
            "notifications/initialized" => {
                debug!("Client finished initialization");
                Dispatch::Quiet
            }
            "notifications/cancelled" => Dispatch::EndSession,
            other => {
                debug!("Ignoring notification: {}", other);
                Dispatch::Quiet
            }
        }
    }

    /// Handle a JSON-RPC request
    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);

        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                "Invalid Request: Not a valid JSON-RPC 2.0 request".to_string(),
                None,
            );
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" | "tools/call" if !self.initialized => JsonRpcResponse::error(
                id,
                error_codes::NOT_INITIALIZED,
                "Server not initialized".to_string(),
                None,
            ),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        }
    }

    /// Handle MCP initialization request
    fn handle_initialize(&mut self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");
        self.initialized = true;

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        respond_with(id, &result)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let tools = self.invoker.registry().list_tools();
        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params {
            Some(params) => match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        error_codes::INVALID_PARAMS,
                        format!("Invalid parameters: {}", e),
                        None,
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let outcome = self
            .invoker
            .invoke(&tool_params.name, tool_params.arguments)
            .await;

        respond_with(id, &ToolCallResult::from(outcome))
    }
}

fn respond_with<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            error_codes::INTERNAL_ERROR,
            format!("Failed to encode result: {}", e),
            None,
        ),
    }
}
