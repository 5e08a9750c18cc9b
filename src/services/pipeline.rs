use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{League, LeagueDataset, LeagueReport};
use crate::services::{aggregate_schedule, normalize_standings, BettingEngine, UpstreamSource};

/// What the pipeline needs to know about one run, independent of league.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Run start; stamped on every league's dataset.
    pub started_at: DateTime<Utc>,
    pub today: NaiveDate,
    pub past_days: u32,
    pub future_days: u32,
    pub seasons: Vec<String>,
}

/// Schedule → standings → predictions for a single league.
///
/// Upstream failures only thin out the result; the returned dataset is always
/// complete and ready to persist.
pub async fn build_league_dataset<S: UpstreamSource + ?Sized>(
    source: &S,
    league: &League,
    plan: &RunPlan,
    engine: &BettingEngine,
) -> (LeagueDataset, LeagueReport) {
    tracing::info!(
        "{}: fetching schedule from {} ({} days back, {} ahead)",
        league.key,
        source.name(),
        plan.past_days,
        plan.future_days
    );
    let schedule =
        aggregate_schedule(source, league, plan.today, plan.past_days, plan.future_days).await;

    let standings = normalize_standings(source, league, &plan.seasons).await;
    let (standings_season, standings) = match standings {
        Some((season, rows)) => (Some(season), rows),
        None => {
            tracing::warn!(
                "{}: no standings for any of {:?}; writing an empty table",
                league.key,
                plan.seasons
            );
            (None, Vec::new())
        }
    };

    let betting = engine.predict(&schedule.days, plan.today);

    let report = LeagueReport {
        league: league.key.clone(),
        days_with_games: schedule.days.len(),
        failed_dates: schedule.failed_dates,
        standings_season,
        predictions: betting.len(),
    };

    let dataset = LeagueDataset {
        league: league.key.clone(),
        schedule: schedule.days,
        standings,
        betting,
        updated_at: plan.started_at,
        synthetic: false,
    };

    (dataset, report)
}
