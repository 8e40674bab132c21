/// Static catalog of the tools this server exposes
///
/// The catalog is built once at startup and only read afterwards, so it can be
/// shared between the stdio session and every HTTP request without locking.

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{json, Value};

use crate::tools::args::{
    NoArgs, PlayerStatsArgs, RecentPerformanceArgs, SearchPlayersArgs, StandingsArgs,
    StatLeadersArgs, TeamStatsArgs,
};

/// Every tool the server knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    PlayerStats,
    PlayerRecentPerformance,
    SearchPlayers,
    MlbStandings,
    StatLeaders,
    TeamStatistics,
    ClearStatsCache,
    HealthCheck,
}

impl ToolKind {
    /// Tools in the order they are listed to clients
    pub const ALL: [ToolKind; 8] = [
        ToolKind::PlayerStats,
        ToolKind::PlayerRecentPerformance,
        ToolKind::SearchPlayers,
        ToolKind::MlbStandings,
        ToolKind::StatLeaders,
        ToolKind::TeamStatistics,
        ToolKind::ClearStatsCache,
        ToolKind::HealthCheck,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::PlayerStats => "player_stats",
            ToolKind::PlayerRecentPerformance => "player_recent_performance",
            ToolKind::SearchPlayers => "search_players",
            ToolKind::MlbStandings => "mlb_standings",
            ToolKind::StatLeaders => "stat_leaders",
            ToolKind::TeamStatistics => "team_statistics",
            ToolKind::ClearStatsCache => "clear_stats_cache",
            ToolKind::HealthCheck => "health_check",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolKind::PlayerStats => "Get season statistics for a specific MLB player",
            ToolKind::PlayerRecentPerformance => "Get recent game performance for an MLB player",
            ToolKind::SearchPlayers => "Search for MLB players by name",
            ToolKind::MlbStandings => "Get current MLB standings by division",
            ToolKind::StatLeaders => "Get MLB leaders for a specific statistic",
            ToolKind::TeamStatistics => "Get aggregate statistics for an MLB team",
            ToolKind::ClearStatsCache => {
                "Clear the statistics cache to force fresh data retrieval"
            }
            ToolKind::HealthCheck => "Check if the MLB Stats MCP server is running properly",
        }
    }

    /// Whether calling this tool only reads data
    pub fn is_read_only(self) -> bool {
        !matches!(self, ToolKind::ClearStatsCache)
    }

    pub fn input_schema(self) -> Value {
        match self {
            ToolKind::PlayerStats => schema_for_args::<PlayerStatsArgs>(),
            ToolKind::PlayerRecentPerformance => schema_for_args::<RecentPerformanceArgs>(),
            ToolKind::SearchPlayers => schema_for_args::<SearchPlayersArgs>(),
            ToolKind::MlbStandings => schema_for_args::<StandingsArgs>(),
            ToolKind::StatLeaders => schema_for_args::<StatLeadersArgs>(),
            ToolKind::TeamStatistics => schema_for_args::<TeamStatsArgs>(),
            ToolKind::ClearStatsCache | ToolKind::HealthCheck => schema_for_args::<NoArgs>(),
        }
    }
}

/// Build a flat JSON schema for an arguments record
fn schema_for_args<A: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|settings| {
            settings.option_add_null_type = false;
            settings.inline_subschemas = true;
            settings.meta_schema = None;
        })
        .into_generator();

    let mut schema = serde_json::to_value(generator.into_root_schema_for::<A>())
        .unwrap_or_else(|_| json!({"type": "object"}));

    if let Some(object) = schema.as_object_mut() {
        object.remove("title");
        object.entry("properties").or_insert_with(|| json!({}));
        object.entry("required").or_insert_with(|| json!([]));
    }
    schema
}

/// MCP tool definition
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolDescriptor {
    /// Tool name (e.g., "player_stats")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// JSON schema for the tool's input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Name and description only, as served by the HTTP listings
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolSummary {
    pub name: &'static str,
    pub description: &'static str,
}

/// Read-only tool catalog
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let descriptors = ToolKind::ALL
            .into_iter()
            .map(|kind| ToolDescriptor {
                name: kind.name(),
                description: kind.description(),
                input_schema: kind.input_schema(),
            })
            .collect();

        Self { descriptors }
    }

    /// All descriptors in stable order
    pub fn list_tools(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn summaries(&self) -> Vec<ToolSummary> {
        self.descriptors
            .iter()
            .map(|d| ToolSummary {
                name: d.name,
                description: d.description,
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
