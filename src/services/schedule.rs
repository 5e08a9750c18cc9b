use chrono::NaiveDate;
use serde_json::Value;

use crate::models::{DaySchedule, GameRecord, GameStatus, League};
use crate::services::UpstreamSource;
use crate::utils::{date_window, lenient_int, pick_str};

/// Upstream status strings that mean the game is in progress.
const LIVE_STATUSES: &[&str] = &[
    "1p", "2p", "3p", "p1", "p2", "p3", "ot", "so", "bt", "pt", "1h", "2h", "ht", "q1", "q2",
    "q3", "q4", "live", "in play", "in progress",
];

/// Result of walking a date window.
#[derive(Debug, Default)]
pub struct ScheduleOutcome {
    pub days: Vec<DaySchedule>,
    pub failed_dates: Vec<NaiveDate>,
}

/// Fetch every day in `[today - past, today + future]`, one call per date in
/// ascending order, keeping only days that have at least one game.
///
/// A failed date is logged and counted as empty; it never stops the walk.
pub async fn aggregate_schedule<S: UpstreamSource + ?Sized>(
    source: &S,
    league: &League,
    today: NaiveDate,
    past: u32,
    future: u32,
) -> ScheduleOutcome {
    let mut outcome = ScheduleOutcome::default();

    for date in date_window(today, past, future) {
        let events = match source.day_events(league, date).await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(
                    "{} {}: schedule fetch failed [{}]: {}",
                    league.key,
                    date,
                    e.kind(),
                    e
                );
                outcome.failed_dates.push(date);
                continue;
            }
        };

        let games: Vec<GameRecord> = events
            .iter()
            .filter_map(|ev| game_from_event(ev, date))
            .collect();
        if games.is_empty() {
            tracing::debug!("{} {}: no games", league.key, date);
            continue;
        }

        tracing::info!("{} {}: {} games", league.key, date, games.len());
        outcome.days.push(DaySchedule { date, games });
    }

    outcome
}

/// Map one upstream event into a `GameRecord`. Events without both team names
/// are dropped.
pub fn game_from_event(ev: &Value, date: NaiveDate) -> Option<GameRecord> {
    let Some(home_team) = pick_str(ev, &["strHomeTeam", "homeTeam"]) else {
        tracing::debug!("{}: event without home team skipped", date);
        return None;
    };
    let Some(away_team) = pick_str(ev, &["strAwayTeam", "awayTeam"]) else {
        tracing::debug!("{}: event without away team skipped", date);
        return None;
    };

    let home_score = lenient_int(&ev["intHomeScore"]);
    let away_score = lenient_int(&ev["intAwayScore"]);
    let status = game_status(home_score, away_score, pick_str(ev, &["strStatus"]));

    Some(GameRecord {
        date,
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        time: start_time(ev),
        status,
        home_score,
        away_score,
    })
}

/// Final exactly when both scores exist; otherwise live or upcoming from the
/// upstream status text.
pub fn game_status(home: Option<i32>, away: Option<i32>, upstream: Option<&str>) -> GameStatus {
    if home.is_some() && away.is_some() {
        return GameStatus::Final;
    }
    let is_live = upstream
        .map(|s| LIVE_STATUSES.contains(&s.trim().to_lowercase().as_str()))
        .unwrap_or(false);
    if is_live {
        GameStatus::Live
    } else {
        GameStatus::Upcoming
    }
}

/// "HH:MM" from the local time, the UTC time, or the timestamp, in that order.
fn start_time(ev: &Value) -> String {
    let from_time = ["strTimeLocal", "strTime"]
        .iter()
        .find_map(|k| pick_str(ev, &[*k]).and_then(hh_mm));
    let from_stamp = || {
        pick_str(ev, &["strTimestamp"])
            .and_then(|ts| ts.split_once('T'))
            .and_then(|(_, t)| hh_mm(t))
    };
    from_time.or_else(from_stamp).unwrap_or_default()
}

fn hh_mm(raw: &str) -> Option<String> {
    let candidate = raw.get(..5)?;
    let (h, m) = candidate.split_once(':')?;
    let valid = h.len() == 2
        && m.len() == 2
        && h.parse::<u8>().map(|h| h < 24).unwrap_or(false)
        && m.parse::<u8>().map(|m| m < 60).unwrap_or(false);
    valid.then(|| candidate.to_string())
}
