use bytes::Bytes;
use serde_json::{json, Value};

use mlb_stats_mcp::stream::{encode, encode_result, MAX_FRAGMENT_LEN};
use mlb_stats_mcp::{ErrorCode, ToolOutcome};

fn parse(fragments: impl Iterator<Item = Bytes>) -> Value {
    let body: Vec<u8> = fragments.flat_map(|f| f.to_vec()).collect();
    serde_json::from_slice(&body).expect("fragments should form one JSON document")
}

#[cfg(test)]
mod encoder_tests {
    use super::*;

    #[test]
    fn test_every_outcome_forms_one_response_object() {
        let outcomes = vec![
            ToolOutcome::text(""),
            ToolOutcome::text("plain text"),
            ToolOutcome::text("{\"looks\": [\"like\", \"json\"]}"),
            ToolOutcome::structured(json!(null)),
            ToolOutcome::structured(json!([1, 2, 3])),
            ToolOutcome::structured(json!({"nested": {"deep": [true, false]}})),
            ToolOutcome::failure(ErrorCode::ToolNotFound, "Unknown tool: x"),
            ToolOutcome::internal("Error executing tool player_stats: \"quoted\"\n"),
        ];
        let ids = vec![None, Some(json!(null)), Some(json!(0)), Some(json!("req-1"))];

        for outcome in &outcomes {
            for id in &ids {
                let value = parse(encode(outcome.clone(), id.clone()));
                let object = value.as_object().expect("response must be an object");

                assert_eq!(object["jsonrpc"], "2.0");
                assert_eq!(object.contains_key("result"), outcome.is_success());
                assert_eq!(object.contains_key("error"), !outcome.is_success());
                match id {
                    Some(id) => assert_eq!(&object["id"], id),
                    None => assert!(!object.contains_key("id")),
                }
            }
        }
    }

    #[test]
    fn test_cache_cleared_response_bytes() {
        let body: Vec<u8> = encode(ToolOutcome::text("Statistics cache cleared successfully"), None)
            .flat_map(|f| f.to_vec())
            .collect();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"{"jsonrpc":"2.0","result":"Statistics cache cleared successfully"}"#
        );
    }

    #[test]
    fn test_error_object_has_code_and_message() {
        let value = parse(encode(ToolOutcome::internal("boom"), Some(json!(3))));
        assert_eq!(value["error"], json!({"code": -32603, "message": "boom"}));
    }

    #[test]
    fn test_large_structured_payload_streams_in_bounded_fragments() {
        let rows: Vec<Value> = (0..2000)
            .map(|i| json!({"rank": i, "name": format!("Player {}", i), "value": i * 3}))
            .collect();
        let fragments: Vec<Bytes> = encode_result(json!({"leaders": rows}), Some(json!(11))).collect();

        assert!(fragments.len() > 3);
        assert!(fragments.iter().all(|f| !f.is_empty()));
        assert!(fragments.iter().all(|f| f.len() <= MAX_FRAGMENT_LEN + 32));

        let value = parse(fragments.into_iter());
        assert_eq!(value["result"]["leaders"].as_array().map(Vec::len), Some(2000));
        assert_eq!(value["id"], 11);
    }

    #[test]
    fn test_unicode_survives_fragmentation() {
        let text = "Ronald Acuña Jr. ⚾ ".repeat(2000);
        let value = parse(encode(ToolOutcome::text(text.clone()), None));
        assert_eq!(value["result"], json!(text));
    }
}
