use serde_json::{json, Value};

use mlb_stats_mcp::mcp::McpServer;

use crate::support::scripted_invoker;

/// Feed `lines` to a fresh session and collect every response line
async fn run_session(lines: &[Value]) -> Vec<Value> {
    let (_, invoker) = scripted_invoker();
    let input: String = lines.iter().map(|line| format!("{}\n", line)).collect();
    let mut output: Vec<u8> = Vec::new();

    let mut server = McpServer::new(invoker);
    server
        .serve(input.as_bytes(), &mut output)
        .await
        .expect("session should end cleanly");

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn initialize(id: i64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {"protocolVersion": "2025-03-26", "capabilities": {}, "clientInfo": {"name": "test", "version": "0"}}
    })
}

fn initialized() -> Value {
    json!({"jsonrpc": "2.0", "method": "notifications/initialized"})
}

#[cfg(test)]
mod stdio_session_tests {
    use super::*;

    #[tokio::test]
    async fn test_handshake_then_list_tools() {
        let responses = run_session(&[
            initialize(1),
            initialized(),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        ])
        .await;

        // The notification gets no reply
        assert_eq!(responses.len(), 2);

        let init = &responses[0];
        assert_eq!(init["id"], 1);
        assert_eq!(init["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(init["result"]["serverInfo"]["name"], "mlb-stats-mcp");
        assert_eq!(init["result"]["capabilities"]["tools"]["listChanged"], false);

        let tools = responses[1]["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 8);
        assert_eq!(tools[0]["name"], "player_stats");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["player_name"]));
    }

    #[tokio::test]
    async fn test_tools_call_results() {
        let responses = run_session(&[
            initialize(1),
            initialized(),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
                   "params": {"name": "clear_stats_cache", "arguments": {}}}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
                   "params": {"name": "unknown_tool"}}),
            json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
                   "params": {"name": "mlb_standings", "arguments": {"year": 2023}}}),
        ])
        .await;

        assert_eq!(responses.len(), 4);

        let cleared = &responses[1]["result"];
        assert_eq!(cleared["isError"], false);
        assert_eq!(cleared["content"][0]["type"], "text");
        assert_eq!(cleared["content"][0]["text"], "Statistics cache cleared successfully");

        let unknown = &responses[2]["result"];
        assert_eq!(unknown["isError"], true);
        assert_eq!(unknown["content"][0]["text"], "Error: Unknown tool: unknown_tool");

        let standings_text = responses[3]["result"]["content"][0]["text"].as_str().unwrap();
        let standings: Value = serde_json::from_str(standings_text).unwrap();
        assert_eq!(standings["year"], 2023);
    }

    #[tokio::test]
    async fn test_tools_before_initialize_are_rejected() {
        let responses = run_session(&[json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})]).await;
        assert_eq!(responses[0]["error"]["code"], -32002);
    }

    #[tokio::test]
    async fn test_bad_lines_get_error_responses() {
        let (_, invoker) = scripted_invoker();
        let input = "this is not json\n\n{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"bogus\"}\n{\"jsonrpc\":\"2.0\",\"id\":10}\n";
        let mut output: Vec<u8> = Vec::new();
        McpServer::new(invoker)
            .serve(input.as_bytes(), &mut output)
            .await
            .unwrap();

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert_eq!(responses[1]["id"], 9);
        assert_eq!(responses[1]["error"]["code"], -32601);
        assert_eq!(responses[2]["id"], 10);
        assert_eq!(responses[2]["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_cancelled_notification_ends_session() {
        let responses = run_session(&[
            initialize(1),
            json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}),
            json!({"jsonrpc": "2.0", "method": "notifications/cancelled", "params": {"requestId": 2}}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}),
        ])
        .await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_null_id_request_gets_a_reply() {
        let responses = run_session(&[
            initialize(1),
            json!({"jsonrpc": "2.0", "id": null, "method": "ping"}),
        ])
        .await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[1], json!({"jsonrpc": "2.0", "id": null, "result": {}}));
    }
}
