/// Tool invocation
///
/// The invoker is the only place tool calls are executed. Whatever happens in a
/// provider (errors, bad arguments, panics, timeouts) it comes back as a
/// `ToolOutcome`; nothing escapes to the transport.

use serde::Serialize;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::domain::{ErrorCode, Payload, ToolOutcome};
use crate::stats::{ProviderError, StatsCache, StatsProvider};
use crate::tools::args::{
    current_season, PlayerStatsArgs, RecentPerformanceArgs, SearchPlayersArgs, StandingsArgs,
    StatLeadersArgs, TeamStatsArgs, ToolArgs,
};
use crate::tools::registry::{ToolKind, ToolRegistry};

/// Text returned by the `clear_stats_cache` tool
pub const CACHE_CLEARED_MESSAGE: &str = "Statistics cache cleared successfully";

/// Per-tool upper bounds on provider latency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolTimeouts {
    pub player_stats: Duration,
    pub recent_performance: Duration,
    pub search: Duration,
    /// Standings, leaders and team statistics
    pub other: Duration,
}

impl ToolTimeouts {
    /// The same bound for every tool
    pub fn uniform(limit: Duration) -> Self {
        Self {
            player_stats: limit,
            recent_performance: limit,
            search: limit,
            other: limit,
        }
    }

    pub fn for_tool(&self, kind: ToolKind) -> Duration {
        match kind {
            ToolKind::PlayerStats => self.player_stats,
            ToolKind::PlayerRecentPerformance => self.recent_performance,
            ToolKind::SearchPlayers => self.search,
            _ => self.other,
        }
    }
}

impl Default for ToolTimeouts {
    fn default() -> Self {
        Self {
            player_stats: Duration::from_secs(30),
            recent_performance: Duration::from_secs(20),
            search: Duration::from_secs(15),
            other: Duration::from_secs(30),
        }
    }
}

/// A provider query with every default already substituted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
enum Query {
    PlayerStats { player_name: String, year: i32 },
    PlayerRecentPerformance { player_name: String, days: u32 },
    SearchPlayers { search_term: String },
    MlbStandings { year: i32 },
    StatLeaders { stat: String, year: i32, top_n: u32, player_type: crate::stats::PlayerType },
    TeamStatistics { team_name: String, year: i32 },
}

impl Query {
    /// Decode the arguments for a data tool; `None` for tools that don't hit the provider
    fn decode(kind: ToolKind, arguments: Map<String, Value>) -> Option<Result<Self, String>> {
        let query = match kind {
            ToolKind::PlayerStats => PlayerStatsArgs::decode(arguments).map(|a| Query::PlayerStats {
                player_name: a.player_name,
                year: a.year.unwrap_or_else(current_season),
            }),
            ToolKind::PlayerRecentPerformance => {
                RecentPerformanceArgs::decode(arguments).map(|a| Query::PlayerRecentPerformance {
                    player_name: a.player_name,
                    days: a.days,
                })
            }
            ToolKind::SearchPlayers => SearchPlayersArgs::decode(arguments).map(|a| Query::SearchPlayers {
                search_term: a.search_term,
            }),
            ToolKind::MlbStandings => StandingsArgs::decode(arguments).map(|a| Query::MlbStandings {
                year: a.year.unwrap_or_else(current_season),
            }),
            ToolKind::StatLeaders => StatLeadersArgs::decode(arguments).map(|a| Query::StatLeaders {
                stat: a.stat,
                year: a.year.unwrap_or_else(current_season),
                top_n: a.top_n,
                player_type: a.player_type,
            }),
            ToolKind::TeamStatistics => TeamStatsArgs::decode(arguments).map(|a| Query::TeamStatistics {
                team_name: a.team_name,
                year: a.year.unwrap_or_else(current_season),
            }),
            ToolKind::ClearStatsCache | ToolKind::HealthCheck => return None,
        };
        Some(query)
    }

    /// Cache key: the serialized query, which names the tool and every argument
    fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    async fn run(self, provider: &dyn StatsProvider) -> Result<Payload, ProviderError> {
        match self {
            Query::PlayerStats { player_name, year } => provider.player_stats(&player_name, year).await,
            Query::PlayerRecentPerformance { player_name, days } => {
                provider.player_recent_performance(&player_name, days).await
            }
            Query::SearchPlayers { search_term } => provider.search_players(&search_term).await,
            Query::MlbStandings { year } => provider.standings(year).await,
            Query::StatLeaders { stat, year, top_n, player_type } => {
                provider.stat_leaders(&stat, year, top_n, player_type).await
            }
            Query::TeamStatistics { team_name, year } => provider.team_stats(&team_name, year).await,
        }
    }
}

/// Dispatches named tool calls to the statistics provider
pub struct ToolInvoker {
    registry: ToolRegistry,
    provider: Arc<dyn StatsProvider>,
    cache: Arc<StatsCache>,
    timeouts: ToolTimeouts,
}

impl ToolInvoker {
    pub fn new(provider: Arc<dyn StatsProvider>, cache: Arc<StatsCache>, timeouts: ToolTimeouts) -> Self {
        Self {
            registry: ToolRegistry::new(),
            provider,
            cache,
            timeouts,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &StatsCache {
        &self.cache
    }

    /// Version string of the upstream data source, `None` if the provider failed to report one
    pub async fn provider_version(&self) -> Option<String> {
        self.data_source_version().await.ok()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Run a tool by name
    ///
    /// Never fails: unknown names, argument problems, provider errors, panics
    /// and timeouts all come back as `ToolOutcome::Failure`.
    pub async fn invoke(&self, name: &str, arguments: Map<String, Value>) -> ToolOutcome {
        let Some(kind) = ToolKind::from_name(name) else {
            warn!("Unknown tool called: {}", name);
            return ToolOutcome::failure(ErrorCode::ToolNotFound, format!("Unknown tool: {}", name));
        };

        let shown = Value::Object(arguments.clone());
        info!("Tool call: {} with args: {}", name, shown);

        let outcome = match kind {
            ToolKind::ClearStatsCache => {
                let purged = self.cache.purge();
                info!("Statistics cache cleared ({} entries)", purged);
                ToolOutcome::text(CACHE_CLEARED_MESSAGE)
            }
            ToolKind::HealthCheck => self.health_check().await,
            _ => match Query::decode(kind, arguments) {
                Some(Ok(query)) => self.run_query(kind, query).await,
                Some(Err(reason)) => {
                    ToolOutcome::internal(format!("Error executing tool {}: {}", name, reason))
                }
                None => ToolOutcome::internal(format!("Tool {} takes no query", name)),
            },
        };

        match &outcome {
            ToolOutcome::Success(payload) => {
                let text = payload.to_text();
                let preview: String = text.chars().take(200).collect();
                info!("Tool {} result: {}...", name, preview);
            }
            ToolOutcome::Failure { code, message } => {
                error!("Error calling tool {} ({}): {}", name, code, message);
            }
        }
        outcome
    }

    async fn run_query(&self, kind: ToolKind, query: Query) -> ToolOutcome {
        let name = kind.name();
        let key = query.cache_key();
        if let Some(payload) = self.cache.get(&key) {
            debug!("Serving {} from cache", name);
            return ToolOutcome::Success(payload);
        }

        let provider = Arc::clone(&self.provider);
        let work = async move { query.run(provider.as_ref()).await };

        match self.contained(name, self.timeouts.for_tool(kind), work).await {
            Ok(Ok(payload)) => {
                self.cache.put(key, payload.clone());
                ToolOutcome::Success(payload)
            }
            Ok(Err(e)) => ToolOutcome::internal(format!("Error executing tool {}: {}", name, e)),
            Err(failure) => failure,
        }
    }

    async fn data_source_version(&self) -> Result<String, ToolOutcome> {
        let provider = Arc::clone(&self.provider);
        let work = async move { provider.version() };
        self.contained(ToolKind::HealthCheck.name(), self.timeouts.other, work)
            .await
    }

    async fn health_check(&self) -> ToolOutcome {
        match self.data_source_version().await {
            Ok(version) => ToolOutcome::text(format!(
                "MLB Stats MCP Server is running. Data source version: {}",
                version
            )),
            Err(failure) => failure,
        }
    }

    /// Run provider work on its own task, bounded by `limit`
    ///
    /// A panic or timeout in the task becomes an internal failure; a timed-out
    /// task is aborted.
    async fn contained<T, F>(&self, name: &str, limit: Duration, work: F) -> Result<T, ToolOutcome>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut task = tokio::spawn(work);

        match tokio::time::timeout(limit, &mut task).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(join_error)) => {
                error!("Tool {} task failed: {}", name, join_error);
                Err(ToolOutcome::internal(format!("Error executing tool {}: task failed", name)))
            }
            Err(_) => {
                task.abort();
                warn!("Tool {} timed out after {:?}", name, limit);
                Err(ToolOutcome::internal(format!(
                    "Tool {} timed out after {} seconds. Please try again later.",
                    name,
                    limit.as_secs_f64()
                )))
            }
        }
    }
}
