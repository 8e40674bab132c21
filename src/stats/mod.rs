/// Statistics data source
///
/// The tool layer talks to baseball data through the `StatsProvider` trait. The
/// bundled implementation queries the public MLB Stats API; tests substitute
/// scripted providers.

pub mod cache;
pub mod mlb;
pub mod names;

pub use cache::{CacheInfo, StatsCache};
pub use mlb::MlbStatsApi;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Payload;

/// Errors reported by a statistics provider
///
/// The display text is what ends up in the `message` of a failed tool call, so
/// it must read well to a human.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected upstream response: {0}")]
    Upstream(String),
}

/// Which side of the ball a leaderboard ranks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    #[default]
    Batting,
    Pitching,
}

impl PlayerType {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerType::Batting => "batting",
            PlayerType::Pitching => "pitching",
        }
    }
}

/// Query interface over an external baseball data source
///
/// Every query returns either a payload for the client or an error whose text
/// explains what went wrong. Implementations must be shareable across tasks.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Season statistics for one player (batting, falling back to pitching)
    async fn player_stats(&self, player_name: &str, year: i32) -> Result<Payload, ProviderError>;

    /// Performance over the last `days` days
    async fn player_recent_performance(
        &self,
        player_name: &str,
        days: u32,
    ) -> Result<Payload, ProviderError>;

    /// Players whose names match a partial search term
    async fn search_players(&self, search_term: &str) -> Result<Payload, ProviderError>;

    /// Division standings for a season
    async fn standings(&self, year: i32) -> Result<Payload, ProviderError>;

    /// Top `top_n` players for a statistic
    async fn stat_leaders(
        &self,
        stat: &str,
        year: i32,
        top_n: u32,
        player_type: PlayerType,
    ) -> Result<Payload, ProviderError>;

    /// Aggregate batting and pitching numbers for a team
    async fn team_stats(&self, team_name: &str, year: i32) -> Result<Payload, ProviderError>;

    /// Version string of the upstream data source
    fn version(&self) -> String;
}
