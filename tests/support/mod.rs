//! Shared fixtures: a scripted statistics provider and invoker builders
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mlb_stats_mcp::{
    Payload, PlayerType, ProviderError, StatsCache, StatsProvider, ToolInvoker, ToolTimeouts,
};

pub const FAKE_VERSION: &str = "scripted-2025.1";

/// Provider with canned answers
///
/// - "Unknown Player" is never found
/// - recent performance always fails upstream
/// - search waits for `search_delay` before answering
/// - team statistics come back as plain text
/// - `version()` panics when `broken_version` is set
#[derive(Default)]
pub struct ScriptedProvider {
    pub search_delay: Duration,
    pub broken_version: bool,
    pub calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn slow_search(delay: Duration) -> Self {
        Self {
            search_delay: delay,
            ..Self::default()
        }
    }

    pub fn broken_version() -> Self {
        Self {
            broken_version: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StatsProvider for ScriptedProvider {
    async fn player_stats(&self, player_name: &str, year: i32) -> Result<Payload, ProviderError> {
        self.record();
        if player_name == "Unknown Player" {
            return Err(ProviderError::NotFound(format!(
                "Player '{}' not found in database",
                player_name
            )));
        }
        Ok(Payload::Structured(json!({
            "name": player_name,
            "year": year,
            "type": "batting",
            "stats": {"hr": 44, "avg": ".310"}
        })))
    }

    async fn player_recent_performance(
        &self,
        _player_name: &str,
        _days: u32,
    ) -> Result<Payload, ProviderError> {
        self.record();
        Err(ProviderError::Upstream("status 503".to_string()))
    }

    async fn search_players(&self, search_term: &str) -> Result<Payload, ProviderError> {
        self.record();
        tokio::time::sleep(self.search_delay).await;
        Ok(Payload::Structured(json!([{"name": format!("{} Example", search_term), "id": 1}])))
    }

    async fn standings(&self, year: i32) -> Result<Payload, ProviderError> {
        self.record();
        Ok(Payload::Structured(json!({
            "year": year,
            "standings": {"AL East": [{"team": "New York Yankees", "w": 94, "l": 68}]}
        })))
    }

    async fn stat_leaders(
        &self,
        stat: &str,
        year: i32,
        top_n: u32,
        player_type: PlayerType,
    ) -> Result<Payload, ProviderError> {
        self.record();
        Ok(Payload::Structured(json!({
            "stat": stat,
            "year": year,
            "top_n": top_n,
            "player_type": player_type.as_str()
        })))
    }

    async fn team_stats(&self, team_name: &str, year: i32) -> Result<Payload, ProviderError> {
        self.record();
        Ok(Payload::Text(format!("{} {}: {{\"wins\": 94}}", team_name, year)))
    }

    fn version(&self) -> String {
        if self.broken_version {
            panic!("version lookup exploded");
        }
        FAKE_VERSION.to_string()
    }
}

pub fn invoker_for(provider: Arc<ScriptedProvider>, timeouts: ToolTimeouts) -> Arc<ToolInvoker> {
    Arc::new(ToolInvoker::new(provider, Arc::new(StatsCache::default()), timeouts))
}

pub fn scripted_invoker() -> (Arc<ScriptedProvider>, Arc<ToolInvoker>) {
    let provider = Arc::new(ScriptedProvider::default());
    let invoker = invoker_for(provider.clone(), ToolTimeouts::default());
    (provider, invoker)
}

/// Invoker whose search tool takes `delay` but may only run for `limit`
pub fn slow_search_invoker(delay: Duration, limit: Duration) -> Arc<ToolInvoker> {
    invoker_for(
        Arc::new(ScriptedProvider::slow_search(delay)),
        ToolTimeouts::uniform(limit),
    )
}

/// Invoker whose provider panics when asked for its version
pub fn broken_version_invoker() -> Arc<ToolInvoker> {
    invoker_for(
        Arc::new(ScriptedProvider::broken_version()),
        ToolTimeouts::default(),
    )
}
