/// Typed arguments for each tool
///
/// Arguments arrive as a loose JSON object. Each tool decodes them into one of
/// these records, which also drive the published input schema, so the schema
/// clients see is the one enforced before dispatch.

use chrono::{Datelike, Local};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::stats::PlayerType;

/// First season with recorded MLB statistics
pub const FIRST_SEASON: i32 = 1871;
pub const DEFAULT_RECENT_DAYS: u32 = 30;
pub const MAX_RECENT_DAYS: u32 = 365;
pub const DEFAULT_TOP_N: u32 = 10;
pub const MAX_TOP_N: u32 = 50;

/// Season used when a call omits `year`
pub fn current_season() -> i32 {
    Local::now().year()
}

fn default_recent_days() -> u32 {
    DEFAULT_RECENT_DAYS
}

fn default_top_n() -> u32 {
    DEFAULT_TOP_N
}

fn check_year(year: Option<i32>) -> Result<(), String> {
    match year {
        Some(year) if year < FIRST_SEASON => Err(format!(
            "year must be {} or later, got {}",
            FIRST_SEASON, year
        )),
        _ => Ok(()),
    }
}

fn check_range(name: &str, value: u32, min: u32, max: u32) -> Result<(), String> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be between {} and {}, got {}", name, min, max, value))
    }
}

fn check_not_blank(name: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", name))
    } else {
        Ok(())
    }
}

/// Arguments record shared by every tool
pub trait ToolArgs: DeserializeOwned + Serialize + JsonSchema {
    /// Bounds checks the type system can't express
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Decode and validate a raw argument map, applying documented defaults
    fn decode(arguments: Map<String, Value>) -> Result<Self, String> {
        let args: Self = serde_json::from_value(Value::Object(arguments))
            .map_err(|e| format!("Invalid arguments: {}", e))?;
        args.validate()?;
        Ok(args)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct PlayerStatsArgs {
    /// Full name of the player (e.g., 'Shohei Ohtani')
    pub player_name: String,
    /// Season year (defaults to current year)
    #[schemars(range(min = 1871))]
    pub year: Option<i32>,
}

impl ToolArgs for PlayerStatsArgs {
    fn validate(&self) -> Result<(), String> {
        check_not_blank("player_name", &self.player_name)?;
        check_year(self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct RecentPerformanceArgs {
    /// Full name of the player
    pub player_name: String,
    /// Number of days to look back (default 30)
    #[serde(default = "default_recent_days")]
    #[schemars(range(min = 1, max = 365))]
    pub days: u32,
}

impl ToolArgs for RecentPerformanceArgs {
    fn validate(&self) -> Result<(), String> {
        check_not_blank("player_name", &self.player_name)?;
        check_range("days", self.days, 1, MAX_RECENT_DAYS)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct SearchPlayersArgs {
    /// Partial name to search for
    pub search_term: String,
}

impl ToolArgs for SearchPlayersArgs {
    fn validate(&self) -> Result<(), String> {
        check_not_blank("search_term", &self.search_term)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct StandingsArgs {
    /// Season year (defaults to current year)
    #[schemars(range(min = 1871))]
    pub year: Option<i32>,
}

impl ToolArgs for StandingsArgs {
    fn validate(&self) -> Result<(), String> {
        check_year(self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct StatLeadersArgs {
    /// Statistic to rank by (e.g., 'HR', 'AVG', 'ERA', 'SO')
    pub stat: String,
    /// Season year (defaults to current year)
    #[schemars(range(min = 1871))]
    pub year: Option<i32>,
    /// Number of top players to return (default 10)
    #[serde(default = "default_top_n")]
    #[schemars(range(min = 1, max = 50))]
    pub top_n: u32,
    /// Type of player statistics
    #[serde(default)]
    pub player_type: PlayerType,
}

impl ToolArgs for StatLeadersArgs {
    fn validate(&self) -> Result<(), String> {
        check_not_blank("stat", &self.stat)?;
        check_year(self.year)?;
        check_range("top_n", self.top_n, 1, MAX_TOP_N)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct TeamStatsArgs {
    /// Team name or abbreviation (e.g., 'Yankees', 'NYY')
    pub team_name: String,
    /// Season year (defaults to current year)
    #[schemars(range(min = 1871))]
    pub year: Option<i32>,
}

impl ToolArgs for TeamStatsArgs {
    fn validate(&self) -> Result<(), String> {
        check_not_blank("team_name", &self.team_name)?;
        check_year(self.year)
    }
}

/// Arguments for tools that take none
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct NoArgs {}

impl ToolArgs for NoArgs {}
