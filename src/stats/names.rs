/// Name normalization for teams, statistics and players
///
/// Users type "Yankees", "hr" or "Shohei Ohtani"; the upstream API wants
/// abbreviations, leader category ids and searchable names.

use crate::stats::{PlayerType, ProviderError};

const TEAM_ALIASES: &[(&str, &str)] = &[
    ("arizona diamondbacks", "AZ"), ("diamondbacks", "AZ"), ("dbacks", "AZ"),
    ("atlanta braves", "ATL"), ("braves", "ATL"),
    ("baltimore orioles", "BAL"), ("orioles", "BAL"), ("o's", "BAL"),
    ("boston red sox", "BOS"), ("red sox", "BOS"),
    ("chicago cubs", "CHC"), ("cubs", "CHC"), ("cubbies", "CHC"),
    ("chicago white sox", "CWS"), ("white sox", "CWS"),
    ("cincinnati reds", "CIN"), ("reds", "CIN"),
    ("cleveland guardians", "CLE"), ("guardians", "CLE"),
    ("colorado rockies", "COL"), ("rockies", "COL"),
    ("detroit tigers", "DET"), ("tigers", "DET"),
    ("houston astros", "HOU"), ("astros", "HOU"), ("stros", "HOU"),
    ("kansas city royals", "KC"), ("royals", "KC"),
    ("los angeles angels", "LAA"), ("angels", "LAA"), ("halos", "LAA"),
    ("los angeles dodgers", "LAD"), ("dodgers", "LAD"),
    ("miami marlins", "MIA"), ("marlins", "MIA"), ("fish", "MIA"),
    ("milwaukee brewers", "MIL"), ("brewers", "MIL"), ("brew crew", "MIL"),
    ("minnesota twins", "MIN"), ("twins", "MIN"),
    ("new york mets", "NYM"), ("mets", "NYM"), ("amazins", "NYM"),
    ("new york yankees", "NYY"), ("yankees", "NYY"), ("yanks", "NYY"),
    ("oakland athletics", "ATH"), ("athletics", "ATH"), ("a's", "ATH"), ("oak", "ATH"),
    ("philadelphia phillies", "PHI"), ("phillies", "PHI"), ("phils", "PHI"),
    ("pittsburgh pirates", "PIT"), ("pirates", "PIT"), ("bucs", "PIT"),
    ("san diego padres", "SD"), ("padres", "SD"), ("pads", "SD"),
    ("san francisco giants", "SF"), ("giants", "SF"),
    ("seattle mariners", "SEA"), ("mariners", "SEA"), ("m's", "SEA"),
    ("st louis cardinals", "STL"), ("st. louis cardinals", "STL"), ("cardinals", "STL"), ("cards", "STL"),
    ("tampa bay rays", "TB"), ("rays", "TB"),
    ("texas rangers", "TEX"), ("rangers", "TEX"),
    ("toronto blue jays", "TOR"), ("blue jays", "TOR"), ("jays", "TOR"),
    ("washington nationals", "WSH"), ("nationals", "WSH"), ("nats", "WSH"),
];

/// Map a team name or nickname to its abbreviation
///
/// Unknown names fall back to their first three characters, upper-cased, which
/// already covers most abbreviations typed directly ("nyy", "LAD").
pub fn normalize_team_name(team: &str) -> String {
    let lowered = team.trim().to_lowercase();
    TEAM_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, abbreviation)| abbreviation.to_string())
        .unwrap_or_else(|| lowered.to_uppercase().chars().take(3).collect())
}

/// A leaderboard statistic resolved to the upstream category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderStat {
    /// Upstream leader category id (e.g. "homeRuns")
    pub category: String,
    /// Stat group that owns the category
    pub group: PlayerType,
}

const STAT_ALIASES: &[(&[&str], &str, PlayerType)] = &[
    (&["avg", "average", "batting_average"], "battingAverage", PlayerType::Batting),
    (&["hr", "home_runs", "homers"], "homeRuns", PlayerType::Batting),
    (&["rbi", "ribbies"], "runsBattedIn", PlayerType::Batting),
    (&["runs", "r"], "runs", PlayerType::Batting),
    (&["hits", "h"], "hits", PlayerType::Batting),
    (&["sb", "stolen_bases", "steals"], "stolenBases", PlayerType::Batting),
    (&["obp", "on_base"], "onBasePercentage", PlayerType::Batting),
    (&["slg", "slugging"], "sluggingPercentage", PlayerType::Batting),
    (&["ops"], "onBasePlusSlugging", PlayerType::Batting),
    (&["era", "earned_run_average"], "earnedRunAverage", PlayerType::Pitching),
    (&["wins", "w"], "wins", PlayerType::Pitching),
    (&["strikeouts", "so", "ks", "k"], "strikeouts", PlayerType::Pitching),
    (&["whip"], "walksAndHitsPerInningPitched", PlayerType::Pitching),
    (&["saves", "sv"], "saves", PlayerType::Pitching),
    (&["k9", "k_per_9", "k/9"], "strikeoutsPer9Inn", PlayerType::Pitching),
];

/// Resolve a user-supplied statistic name
///
/// Pitching-only statistics always rank pitchers. Names that match no alias are
/// passed through as raw upstream category ids.
pub fn resolve_leader_stat(stat: &str, requested: PlayerType) -> LeaderStat {
    let lowered = stat.trim().to_lowercase();
    match STAT_ALIASES
        .iter()
        .find(|(aliases, _, _)| aliases.contains(&lowered.as_str()))
    {
        Some((_, category, PlayerType::Pitching)) => LeaderStat {
            category: category.to_string(),
            group: PlayerType::Pitching,
        },
        Some((_, category, PlayerType::Batting)) => LeaderStat {
            category: category.to_string(),
            group: requested,
        },
        None => LeaderStat {
            category: stat.trim().to_string(),
            group: requested,
        },
    }
}

/// Split a full player name into first and last name
///
/// Multi-word surnames ("Elly De La Cruz") keep every word after the first.
pub fn split_player_name(player_name: &str) -> Result<(String, String), ProviderError> {
    let mut parts = player_name.split_whitespace();
    match (parts.next(), parts.collect::<Vec<_>>()) {
        (Some(first), rest) if !rest.is_empty() => Ok((first.to_string(), rest.join(" "))),
        _ => Err(ProviderError::InvalidInput(format!(
            "Please provide both first and last name for '{}'",
            player_name.trim()
        ))),
    }
}
