use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Upcoming,
    Live,
    Final,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Carried by the enclosing `DaySchedule` in the persisted file.
    #[serde(skip)]
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub time: String, // "HH:MM" or "" when unknown
    pub status: GameStatus,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

impl GameRecord {
    /// Both scores, only when the game has a final result.
    pub fn final_score(&self) -> Option<(i32, i32)> {
        match (self.home_score, self.away_score) {
            (Some(h), Some(a)) => Some((h, a)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySchedule {
    #[serde(with = "day_format")]
    pub date: NaiveDate,
    pub games: Vec<GameRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsRow {
    pub name: String,
    pub gp: i32,
    pub wins: i32,
    pub losses: i32,
    pub ot_losses: i32,
    pub draws: i32,
    pub points: i32,
    pub gf: i32,
    pub ga: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    pub fn from_pct(favorite_pct: u8) -> Self {
        if favorite_pct >= 65 {
            ConfidenceTier::High
        } else if favorite_pct >= 58 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Low => "low",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BettingPrediction {
    #[serde(with = "day_format")]
    pub date: NaiveDate,
    #[serde(rename = "match")]
    pub match_label: String,
    pub time: String,
    pub home_win_pct: u8,
    pub away_win_pct: u8,
    pub favorite: String,
    /// Favorite's win probability; the coarse bucket is in `tier`.
    pub confidence: u8,
    pub tier: ConfidenceTier,
    pub analysis: String,
}

/// One league's output for a single run. Field order is the persisted key order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueDataset {
    #[serde(skip)]
    pub league: String,
    pub schedule: Vec<DaySchedule>,
    pub standings: Vec<StandingsRow>,
    pub betting: Vec<BettingPrediction>,
    pub updated_at: DateTime<Utc>,
    /// Set only on fixture output so it can never pass for fetched data.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

/// A configured competition: our key plus the upstream's league id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct League {
    pub key: String,
    pub upstream_id: String,
}

/// What happened while building one league's dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueReport {
    pub league: String,
    pub days_with_games: usize,
    pub failed_dates: Vec<NaiveDate>,
    pub standings_season: Option<String>,
    pub predictions: usize,
}

impl LeagueReport {
    /// Degraded means valid output built from less than the full upstream data.
    pub fn is_degraded(&self) -> bool {
        self.standings_season.is_none() || !self.failed_dates.is_empty()
    }
}

mod day_format {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format("%Y-%m-%d"))
    }
}
