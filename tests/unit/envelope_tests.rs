use serde_json::{json, Value};

use mlb_stats_mcp::rpc::{handle, RpcError};
use mlb_stats_mcp::ErrorCode;

use crate::support::scripted_invoker;

async fn reply(body: &str) -> Result<Value, RpcError> {
    let (_, invoker) = scripted_invoker();
    let fragments = handle(&invoker, body.as_bytes()).await?;
    Ok(serde_json::from_slice(&fragments.concat()).expect("valid JSON response"))
}

#[cfg(test)]
mod envelope_tests {
    use super::*;

    #[tokio::test]
    async fn test_parse_error() {
        let err = reply("{not json").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParseError);
        assert_eq!(err.id(), Value::Null);
        assert_eq!(err.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn test_missing_or_wrong_version_is_invalid_request() {
        let err = reply(r#"{"method":"list_tools","id":"a"}"#).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.id(), json!("a"));

        let err = reply(r#"{"jsonrpc":"1.0","method":"list_tools","id":4}"#).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.id(), json!(4));

        let err = reply(r#"["jsonrpc","2.0"]"#).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn test_tool_without_name_is_invalid_params() {
        let err = reply(r#"{"jsonrpc":"2.0","method":"tool","params":{},"id":1}"#)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParams);
        assert_eq!(err.to_string(), "Invalid params: Missing tool name");
        assert_eq!(err.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let err = reply(r#"{"jsonrpc":"2.0","method":"resources/list","id":2}"#)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::MethodNotFound);
        assert_eq!(err.status().as_u16(), 404);
        assert_eq!(err.to_string(), "Method not found: resources/list");
    }

    #[tokio::test]
    async fn test_missing_or_non_string_method_is_method_not_found() {
        let err = reply(r#"{"jsonrpc":"2.0","id":3}"#).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::MethodNotFound);
        assert_eq!(err.status().as_u16(), 404);
        assert_eq!(err.id(), json!(3));
        assert_eq!(err.to_string(), "Method not found: None");

        let err = reply(r#"{"jsonrpc":"2.0","method":12,"id":"n"}"#).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::MethodNotFound);
        assert_eq!(err.id(), json!("n"));
        assert_eq!(err.to_string(), "Method not found: 12");
    }

    #[tokio::test]
    async fn test_list_tools_is_idempotent() {
        let request = r#"{"jsonrpc":"2.0","method":"list_tools","id":"x"}"#;
        let first = reply(request).await.unwrap();
        let second = reply(request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first["id"], "x");
        let tools = first["result"].as_array().unwrap();
        assert_eq!(tools.len(), 8);
        assert_eq!(tools[0], json!({"name": "player_stats", "description": "Get season statistics for a specific MLB player"}));
    }

    #[tokio::test]
    async fn test_tool_call_echoes_native_id() {
        let value = reply(
            r#"{"jsonrpc":"2.0","method":"tool","params":{"name":"mlb_standings","parameters":{"year":2023}},"id":17}"#,
        )
        .await
        .unwrap();
        assert_eq!(value["id"], json!(17));
        assert_eq!(value["result"]["year"], 2023);
    }

    #[tokio::test]
    async fn test_missing_id_is_echoed_as_null() {
        let value = reply(r#"{"jsonrpc":"2.0","method":"tool","params":{"name":"clear_stats_cache"}}"#)
            .await
            .unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "id": null, "result": "Statistics cache cleared successfully"})
        );
    }

    #[tokio::test]
    async fn test_tool_failure_is_streamed_as_error_member() {
        let value = reply(
            r#"{"jsonrpc":"2.0","method":"tool","params":{"name":"no_such_tool"},"id":"t"}"#,
        )
        .await
        .unwrap();
        assert_eq!(value["id"], "t");
        assert_eq!(value["error"]["code"], -32001);
        assert_eq!(value["error"]["message"], "Unknown tool: no_such_tool");
        assert!(value.get("result").is_none());
    }
}
