/// Tool outcomes and error codes
/// 
/// This module defines the uniform result of a tool invocation and the error
/// taxonomy shared by the JSON-RPC envelope and the plain HTTP tool routes.

use serde_json::Value;
use std::fmt;

use crate::mcp::protocol::error_codes;

/// Enumerated error codes surfaced to clients
///
/// Protocol-level codes come from the JSON-RPC 2.0 error space. Tool-level codes
/// (`ToolNotFound`, `InternalError`) also have a symbolic form used by the plain
/// `/tools/{name}` routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The requested tool is not in the registry
    ToolNotFound,
    /// The tool failed, timed out, or was called with unusable arguments
    InternalError,
    /// The body is JSON but not a valid JSON-RPC 2.0 request
    InvalidRequest,
    /// The method exists but its params are wrong
    InvalidParams,
    /// The JSON-RPC method is unknown
    MethodNotFound,
    /// The body is not parseable JSON
    ParseError,
}

impl ErrorCode {
    /// Numeric JSON-RPC code for this error
    pub fn rpc_code(self) -> i32 {
        match self {
            ErrorCode::ToolNotFound => error_codes::TOOL_NOT_FOUND,
            ErrorCode::InternalError => error_codes::INTERNAL_ERROR,
            ErrorCode::InvalidRequest => error_codes::INVALID_REQUEST,
            ErrorCode::InvalidParams => error_codes::INVALID_PARAMS,
            ErrorCode::MethodNotFound => error_codes::METHOD_NOT_FOUND,
            ErrorCode::ParseError => error_codes::PARSE_ERROR,
        }
    }

    /// Symbolic code used by the non-JSON-RPC routes
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ToolNotFound => "tool_not_found",
            ErrorCode::InternalError => "internal_error",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::InvalidParams => "invalid_params",
            ErrorCode::MethodNotFound => "method_not_found",
            ErrorCode::ParseError => "parse_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful tool result
///
/// Text is opaque: it is always sent as a JSON string, even when it happens to
/// contain JSON. Only `Structured` values are embedded as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Structured(Value),
}

impl Payload {
    /// Render the payload as text for MCP text content blocks
    pub fn to_text(&self) -> String {
        match self {
            Payload::Text(text) => text.clone(),
            Payload::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }

    /// Convert into the JSON value embedded in a response
    pub fn into_value(self) -> Value {
        match self {
            Payload::Text(text) => Value::String(text),
            Payload::Structured(value) => value,
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

/// Result of invoking one tool
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(Payload),
    Failure { code: ErrorCode, message: String },
}

impl ToolOutcome {
    /// Successful outcome carrying opaque text
    pub fn text(text: impl Into<String>) -> Self {
        ToolOutcome::Success(Payload::Text(text.into()))
    }

    /// Successful outcome carrying a structured JSON value
    pub fn structured(value: Value) -> Self {
        ToolOutcome::Success(Payload::Structured(value))
    }

    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        ToolOutcome::Failure {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::failure(ErrorCode::InternalError, message)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }
}
