/// MLB Stats API provider
///
/// Implements `StatsProvider` against the public statsapi.mlb.com REST API.
/// Responses are reduced to small JSON records so assistants get the useful
/// numbers without the full upstream payload.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::domain::Payload;
use crate::stats::names::{normalize_team_name, resolve_leader_stat, split_player_name};
use crate::stats::{PlayerType, ProviderError, StatsProvider};

/// Base URL of the public MLB Stats API
pub const DEFAULT_API_BASE: &str = "https://statsapi.mlb.com/api/v1";

/// Version string reported by health checks
pub const MLB_API_VERSION: &str = "MLB Stats API v1";

const SEARCH_RESULT_LIMIT: usize = 10;

const BATTING_SEASON_FIELDS: &[(&str, &str)] = &[
    ("games", "gamesPlayed"),
    ("avg", "avg"),
    ("obp", "obp"),
    ("slg", "slg"),
    ("ops", "ops"),
    ("hr", "homeRuns"),
    ("rbi", "rbi"),
    ("runs", "runs"),
    ("sb", "stolenBases"),
];

const PITCHING_SEASON_FIELDS: &[(&str, &str)] = &[
    ("games", "gamesPlayed"),
    ("games_started", "gamesStarted"),
    ("wins", "wins"),
    ("losses", "losses"),
    ("saves", "saves"),
    ("era", "era"),
    ("whip", "whip"),
    ("ip", "inningsPitched"),
    ("so", "strikeOuts"),
    ("k9", "strikeoutsPer9Inn"),
];

const BATTING_RECENT_FIELDS: &[(&str, &str)] = &[
    ("games", "gamesPlayed"),
    ("at_bats", "atBats"),
    ("hits", "hits"),
    ("avg", "avg"),
    ("home_runs", "homeRuns"),
    ("rbi", "rbi"),
    ("ops", "ops"),
];

const PITCHING_RECENT_FIELDS: &[(&str, &str)] = &[
    ("games", "gamesPlayed"),
    ("innings_pitched", "inningsPitched"),
    ("pitches_thrown", "numberOfPitches"),
    ("era", "era"),
    ("strikeouts", "strikeOuts"),
    ("strike_percentage", "strikePercentage"),
];

const TEAM_BATTING_FIELDS: &[(&str, &str)] = &[
    ("avg", "avg"),
    ("total_hr", "homeRuns"),
    ("total_rbi", "rbi"),
    ("total_runs", "runs"),
    ("team_ops", "ops"),
    ("total_sb", "stolenBases"),
];

const TEAM_PITCHING_FIELDS: &[(&str, &str)] = &[
    ("era", "era"),
    ("total_wins", "wins"),
    ("total_saves", "saves"),
    ("total_strikeouts", "strikeOuts"),
    ("whip", "whip"),
];

#[derive(Debug, Deserialize, Default)]
struct PeopleResponse {
    #[serde(default)]
    people: Vec<Person>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Person {
    id: u64,
    full_name: String,
    #[serde(default)]
    current_team: Option<NamedRef>,
    #[serde(default)]
    primary_position: Option<Position>,
    #[serde(default)]
    active: bool,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Position {
    abbreviation: String,
}

#[derive(Debug, Deserialize, Default)]
struct StatsResponse {
    #[serde(default)]
    stats: Vec<StatBlock>,
}

#[derive(Debug, Deserialize)]
struct StatBlock {
    #[serde(default)]
    splits: Vec<Split>,
}

#[derive(Debug, Deserialize)]
struct Split {
    #[serde(default)]
    stat: Map<String, Value>,
}

#[derive(Debug, Deserialize, Default)]
struct StandingsResponse {
    #[serde(default)]
    records: Vec<DivisionRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DivisionRecord {
    #[serde(default)]
    division: Option<NamedRef>,
    #[serde(default)]
    team_records: Vec<TeamRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamRecord {
    team: NamedRef,
    wins: u32,
    losses: u32,
    #[serde(default)]
    winning_percentage: Option<String>,
    #[serde(default)]
    games_back: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LeadersResponse {
    #[serde(default)]
    league_leaders: Vec<LeaderCategory>,
}

#[derive(Debug, Deserialize)]
struct LeaderCategory {
    #[serde(default)]
    leaders: Vec<Leader>,
}

#[derive(Debug, Deserialize)]
struct Leader {
    rank: u32,
    value: String,
    person: NamedPerson,
    #[serde(default)]
    team: Option<NamedRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamedPerson {
    full_name: String,
}

#[derive(Debug, Deserialize, Default)]
struct TeamsResponse {
    #[serde(default)]
    teams: Vec<Team>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Team {
    id: u64,
    name: String,
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(default)]
    team_name: Option<String>,
}

impl Team {
    fn matches(&self, query: &str, abbreviation: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.abbreviation
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(abbreviation))
            || self.name.to_lowercase().contains(&query)
            || self
                .team_name
                .as_deref()
                .is_some_and(|nickname| nickname.eq_ignore_ascii_case(&query))
    }
}

/// Copy the listed upstream fields into a record under our own names
fn pick_fields(stat: &Map<String, Value>, fields: &[(&str, &str)]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|(ours, theirs)| stat.get(*theirs).map(|v| (ours.to_string(), v.clone())))
        .collect()
}

fn first_split(response: StatsResponse) -> Option<Map<String, Value>> {
    response
        .stats
        .into_iter()
        .flat_map(|block| block.splits)
        .map(|split| split.stat)
        .find(|stat| !stat.is_empty())
}

fn stat_group(player_type: PlayerType) -> &'static str {
    match player_type {
        PlayerType::Batting => "hitting",
        PlayerType::Pitching => "pitching",
    }
}

/// HTTP client for the MLB Stats API
pub struct MlbStatsApi {
    client: reqwest::Client,
    base_url: String,
}

impl MlbStatsApi {
    /// Create a client for the given API base URL
    ///
    /// `request_timeout` bounds each individual HTTP request; the tool invoker
    /// applies its own per-tool bound on top.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("mlb-stats-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<T>().await?)
    }

    async fn find_player(&self, player_name: &str) -> Result<Person, ProviderError> {
        let (first, last) = split_player_name(player_name)?;
        tracing::info!("Looking up player: {} {}", first, last);

        let found: PeopleResponse = self
            .get_json(
                "people/search",
                &[("names", format!("{} {}", first, last)), ("sportIds", "1".to_string())],
            )
            .await?;

        found.people.into_iter().next().ok_or_else(|| {
            ProviderError::NotFound(format!("Player '{}' not found in database", player_name))
        })
    }

    async fn player_split(
        &self,
        person_id: u64,
        group: &str,
        params: &[(&str, String)],
    ) -> Result<Option<Map<String, Value>>, ProviderError> {
        let mut query = vec![("group", group.to_string())];
        query.extend(params.iter().cloned());

        let response: StatsResponse = self
            .get_json(&format!("people/{}/stats", person_id), &query)
            .await?;
        Ok(first_split(response))
    }

    async fn find_team(&self, team_name: &str, year: i32) -> Result<Team, ProviderError> {
        let abbreviation = normalize_team_name(team_name);
        let response: TeamsResponse = self
            .get_json(
                "teams",
                &[("sportId", "1".to_string()), ("season", year.to_string())],
            )
            .await?;

        response
            .teams
            .into_iter()
            .find(|team| team.matches(team_name, &abbreviation))
            .ok_or_else(|| ProviderError::NotFound(format!("No stats found for team '{}'", team_name)))
    }

    async fn team_split(
        &self,
        team_id: u64,
        group: &str,
        year: i32,
    ) -> Result<Map<String, Value>, ProviderError> {
        let response: StatsResponse = self
            .get_json(
                &format!("teams/{}/stats", team_id),
                &[
                    ("stats", "season".to_string()),
                    ("group", group.to_string()),
                    ("season", year.to_string()),
                ],
            )
            .await?;
        Ok(first_split(response).unwrap_or_default())
    }
}

#[async_trait]
impl StatsProvider for MlbStatsApi {
    async fn player_stats(&self, player_name: &str, year: i32) -> Result<Payload, ProviderError> {
        let person = self.find_player(player_name).await?;
        let season = [("stats", "season".to_string()), ("season", year.to_string())];

        for (player_type, fields) in [
            (PlayerType::Batting, BATTING_SEASON_FIELDS),
            (PlayerType::Pitching, PITCHING_SEASON_FIELDS),
        ] {
            let Some(stat) = self
                .player_split(person.id, stat_group(player_type), &season)
                .await?
            else {
                tracing::debug!("No {} stats for {} in {}", player_type.as_str(), person.full_name, year);
                continue;
            };

            let mut record = Map::new();
            record.insert("player".to_string(), json!(person.full_name));
            record.insert("year".to_string(), json!(year));
            record.insert("type".to_string(), json!(player_type.as_str()));
            record.extend(pick_fields(&stat, fields));
            return Ok(Payload::Structured(Value::Object(record)));
        }

        Err(ProviderError::NotFound(format!(
            "No stats found for {} in {}",
            player_name, year
        )))
    }

    async fn player_recent_performance(
        &self,
        player_name: &str,
        days: u32,
    ) -> Result<Payload, ProviderError> {
        let person = self.find_player(player_name).await?;
        let end_date = Local::now().date_naive();
        let start_date = end_date - ChronoDuration::days(i64::from(days));
        let range = [
            ("stats", "byDateRange".to_string()),
            ("startDate", start_date.format("%Y-%m-%d").to_string()),
            ("endDate", end_date.format("%Y-%m-%d").to_string()),
        ];

        for (player_type, fields) in [
            (PlayerType::Batting, BATTING_RECENT_FIELDS),
            (PlayerType::Pitching, PITCHING_RECENT_FIELDS),
        ] {
            if let Some(stat) = self
                .player_split(person.id, stat_group(player_type), &range)
                .await?
            {
                let mut record = Map::new();
                record.insert("player".to_string(), json!(person.full_name));
                record.insert("period".to_string(), json!(format!("Last {} days", days)));
                record.insert("type".to_string(), json!(player_type.as_str()));
                record.extend(pick_fields(&stat, fields));
                return Ok(Payload::Structured(Value::Object(record)));
            }
        }

        Err(ProviderError::NotFound(format!(
            "No recent data found for {}",
            player_name
        )))
    }

    async fn search_players(&self, search_term: &str) -> Result<Payload, ProviderError> {
        let term = search_term.trim();
        if term.is_empty() {
            return Err(ProviderError::InvalidInput(
                "Search term cannot be empty".to_string(),
            ));
        }

        let found: PeopleResponse = self
            .get_json(
                "people/search",
                &[("names", term.to_string()), ("sportIds", "1".to_string())],
            )
            .await?;

        let results: Vec<Value> = found
            .people
            .into_iter()
            .take(SEARCH_RESULT_LIMIT)
            .map(|person| {
                json!({
                    "name": person.full_name,
                    "team": person
                        .current_team
                        .and_then(|team| team.name)
                        .unwrap_or_else(|| "Unknown".to_string()),
                    "position": person
                        .primary_position
                        .map(|position| position.abbreviation)
                        .unwrap_or_else(|| "Unknown".to_string()),
                    "active": person.active,
                })
            })
            .collect();

        Ok(Payload::Structured(json!({
            "search_term": term,
            "count": results.len(),
            "results": results,
        })))
    }

    async fn standings(&self, year: i32) -> Result<Payload, ProviderError> {
        let response: StandingsResponse = self
            .get_json(
                "standings",
                &[
                    ("leagueId", "103,104".to_string()),
                    ("season", year.to_string()),
                    ("standingsTypes", "regularSeason".to_string()),
                    ("hydrate", "division".to_string()),
                ],
            )
            .await?;

        if response.records.is_empty() {
            return Err(ProviderError::NotFound(format!(
                "No standings available for {}",
                year
            )));
        }

        let mut divisions = Map::new();
        for (index, record) in response.records.into_iter().enumerate() {
            let division_name = record
                .division
                .and_then(|division| division.name)
                .unwrap_or_else(|| format!("Division {}", index + 1));

            let teams: Vec<Value> = record
                .team_records
                .into_iter()
                .map(|team| {
                    json!({
                        "team": team.team.name.unwrap_or_else(|| "Unknown".to_string()),
                        "wins": team.wins,
                        "losses": team.losses,
                        "win_pct": team.winning_percentage,
                        "games_back": team.games_back.unwrap_or_else(|| "-".to_string()),
                    })
                })
                .collect();

            divisions.insert(division_name, Value::Array(teams));
        }

        Ok(Payload::Structured(json!({
            "year": year,
            "standings": divisions,
        })))
    }

    async fn stat_leaders(
        &self,
        stat: &str,
        year: i32,
        top_n: u32,
        player_type: PlayerType,
    ) -> Result<Payload, ProviderError> {
        let resolved = resolve_leader_stat(stat, player_type);
        if resolved.category.is_empty() {
            return Err(ProviderError::InvalidInput(
                "Statistic name cannot be empty".to_string(),
            ));
        }

        let response: LeadersResponse = self
            .get_json(
                "stats/leaders",
                &[
                    ("leaderCategories", resolved.category.clone()),
                    ("season", year.to_string()),
                    ("statGroup", stat_group(resolved.group).to_string()),
                    ("limit", top_n.to_string()),
                    ("sportId", "1".to_string()),
                ],
            )
            .await?;

        let leaders: Vec<Value> = response
            .league_leaders
            .into_iter()
            .flat_map(|category| category.leaders)
            .take(top_n as usize)
            .map(|leader| {
                json!({
                    "rank": leader.rank,
                    "name": leader.person.full_name,
                    "team": leader
                        .team
                        .and_then(|team| team.name)
                        .unwrap_or_else(|| "Unknown".to_string()),
                    "value": leader.value,
                })
            })
            .collect();

        if leaders.is_empty() {
            return Err(ProviderError::NotFound(format!(
                "Stat '{}' not found for {} {}",
                stat,
                resolved.group.as_str(),
                year
            )));
        }

        Ok(Payload::Structured(json!({
            "stat": resolved.category,
            "year": year,
            "type": resolved.group.as_str(),
            "leaders": leaders,
        })))
    }

    async fn team_stats(&self, team_name: &str, year: i32) -> Result<Payload, ProviderError> {
        let team = self.find_team(team_name, year).await?;
        let batting = self.team_split(team.id, "hitting", year).await?;
        let pitching = self.team_split(team.id, "pitching", year).await?;

        if batting.is_empty() && pitching.is_empty() {
            return Err(ProviderError::NotFound(format!(
                "No stats found for team '{}' in {}",
                team_name, year
            )));
        }

        Ok(Payload::Structured(json!({
            "team": team.name,
            "abbreviation": team.abbreviation,
            "year": year,
            "batting": pick_fields(&batting, TEAM_BATTING_FIELDS),
            "pitching": pick_fields(&pitching, TEAM_PITCHING_FIELDS),
        })))
    }

    fn version(&self) -> String {
        MLB_API_VERSION.to_string()
    }
}
