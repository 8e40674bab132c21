use serde_json::{json, Map, Value};
use std::time::{Duration, Instant};

use mlb_stats_mcp::tools::CACHE_CLEARED_MESSAGE;
use mlb_stats_mcp::{ErrorCode, Payload, ToolOutcome};

use crate::support::{broken_version_invoker, scripted_invoker, slow_search_invoker, FAKE_VERSION};

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[cfg(test)]
mod invoker_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_tool_is_tool_not_found() {
        let (_, invoker) = scripted_invoker();
        let outcome = invoker.invoke("unknown_tool", Map::new()).await;
        assert_eq!(
            outcome,
            ToolOutcome::failure(ErrorCode::ToolNotFound, "Unknown tool: unknown_tool")
        );
    }

    #[tokio::test]
    async fn test_structured_success_passes_through() {
        let (_, invoker) = scripted_invoker();
        let outcome = invoker
            .invoke("player_stats", args(json!({"player_name": "Aaron Judge", "year": 2022})))
            .await;
        match outcome {
            ToolOutcome::Success(Payload::Structured(value)) => {
                assert_eq!(value["name"], "Aaron Judge");
                assert_eq!(value["year"], 2022);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_text_payload_is_not_reparsed() {
        let (_, invoker) = scripted_invoker();
        let outcome = invoker
            .invoke("team_statistics", args(json!({"team_name": "Yankees", "year": 2023})))
            .await;
        assert_eq!(outcome, ToolOutcome::text("Yankees 2023: {\"wins\": 94}"));
    }

    #[tokio::test]
    async fn test_provider_errors_become_internal_failures() {
        let (_, invoker) = scripted_invoker();

        let outcome = invoker
            .invoke("player_stats", args(json!({"player_name": "Unknown Player"})))
            .await;
        match outcome {
            ToolOutcome::Failure { code, message } => {
                assert_eq!(code, ErrorCode::InternalError);
                assert!(message.contains("Player 'Unknown Player' not found"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        let outcome = invoker
            .invoke("player_recent_performance", args(json!({"player_name": "Mookie Betts"})))
            .await;
        assert!(matches!(
            outcome,
            ToolOutcome::Failure { code: ErrorCode::InternalError, .. }
        ));
    }

    #[tokio::test]
    async fn test_malformed_arguments_never_escape() {
        let (provider, invoker) = scripted_invoker();
        let bad_calls = [
            ("player_stats", json!({})),
            ("player_stats", json!({"player_name": 12})),
            ("player_recent_performance", json!({"player_name": "Juan Soto", "days": 0})),
            ("stat_leaders", json!({"stat": "HR", "top_n": 51})),
            ("stat_leaders", json!({"stat": "HR", "player_type": "fielding"})),
            ("mlb_standings", json!({"year": 1800})),
            ("search_players", json!({"search_term": "   "})),
        ];

        for (name, arguments) in bad_calls {
            let outcome = invoker.invoke(name, args(arguments)).await;
            assert!(
                matches!(outcome, ToolOutcome::Failure { code: ErrorCode::InternalError, .. }),
                "{} should fail with internal_error, got {:?}",
                name,
                outcome
            );
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_documented_defaults_are_substituted() {
        let (_, invoker) = scripted_invoker();
        let outcome = invoker.invoke("stat_leaders", args(json!({"stat": "HR"}))).await;
        match outcome {
            ToolOutcome::Success(Payload::Structured(value)) => {
                assert_eq!(value["top_n"], 10);
                assert_eq!(value["player_type"], "batting");
                assert_eq!(value["year"], json!(mlb_stats_mcp::tools::current_season()));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_calls_until_cleared() {
        let (provider, invoker) = scripted_invoker();
        let standings = || args(json!({"year": 2023}));

        invoker.invoke("mlb_standings", standings()).await;
        invoker.invoke("mlb_standings", standings()).await;
        assert_eq!(provider.call_count(), 1);
        assert_eq!(invoker.cache().info().entries, 1);

        let cleared = invoker.invoke("clear_stats_cache", Map::new()).await;
        assert_eq!(cleared, ToolOutcome::text(CACHE_CLEARED_MESSAGE));
        assert_eq!(invoker.cache().info().entries, 0);

        invoker.invoke("mlb_standings", standings()).await;
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_different_arguments_are_cached_separately() {
        let (provider, invoker) = scripted_invoker();
        invoker.invoke("mlb_standings", args(json!({"year": 2022}))).await;
        invoker.invoke("mlb_standings", args(json!({"year": 2023}))).await;
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_health_check_mentions_data_source_version() {
        let (_, invoker) = scripted_invoker();
        match invoker.invoke("health_check", Map::new()).await {
            ToolOutcome::Success(Payload::Text(text)) => assert!(text.contains(FAKE_VERSION)),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_call_fails_within_bound() {
        let limit = Duration::from_millis(150);
        let invoker = slow_search_invoker(Duration::from_secs(10), limit);

        let started = Instant::now();
        let outcome = invoker
            .invoke("search_players", args(json!({"search_term": "Ohtani"})))
            .await;
        let elapsed = started.elapsed();

        assert!(elapsed >= limit);
        assert!(elapsed < limit + Duration::from_secs(1));
        match outcome {
            ToolOutcome::Failure { code, message } => {
                assert_eq!(code, ErrorCode::InternalError);
                assert!(message.contains("timed out"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_panicking_version_lookup_stays_inside_invoke() {
        let invoker = broken_version_invoker();

        let outcome = tokio::spawn({
            let invoker = invoker.clone();
            async move { invoker.invoke("health_check", Map::new()).await }
        })
        .await
        .expect("invoke must not panic");

        assert!(matches!(
            outcome,
            ToolOutcome::Failure { code: ErrorCode::InternalError, .. }
        ));
        assert_eq!(invoker.provider_version().await, None);

        // The invoker keeps serving other tools afterwards
        let standings = invoker.invoke("mlb_standings", args(json!({"year": 2021}))).await;
        assert!(standings.is_success());
    }
}
