use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

use crate::models::{BettingPrediction, ConfidenceTier, DaySchedule, GameRecord, GameStatus};
use crate::utils::split_percent;

/// Raw-score bonus for playing at home.
const HOME_BONUS: u32 = 2;
/// Raw-score bonus for the away side; keeps a winless team above zero.
const AWAY_BONUS: u32 = 1;

/// Explainable win-likelihood estimate for today's and tomorrow's games,
/// driven only by how many games each team has won inside the schedule window.
pub struct BettingEngine {
    home_bonus: u32,
    away_bonus: u32,
}

impl BettingEngine {
    pub fn new() -> Self {
        Self {
            home_bonus: HOME_BONUS,
            away_bonus: AWAY_BONUS,
        }
    }

    /// Wins per team over completed games dated strictly before `today`.
    /// A draw counts for neither side.
    pub fn recent_wins(&self, schedule: &[DaySchedule], today: NaiveDate) -> HashMap<String, u32> {
        let mut tally: HashMap<String, u32> = HashMap::new();

        for day in schedule.iter().filter(|d| d.date < today) {
            for game in &day.games {
                let Some((home, away)) = game.final_score() else { continue };
                let winner = match home.cmp(&away) {
                    std::cmp::Ordering::Greater => &game.home_team,
                    std::cmp::Ordering::Less => &game.away_team,
                    std::cmp::Ordering::Equal => continue,
                };
                *tally.entry(winner.clone()).or_insert(0) += 1;
            }
        }

        tally
    }

    /// Games dated today or tomorrow that have not finished.
    pub fn candidates<'a>(
        &self,
        schedule: &'a [DaySchedule],
        today: NaiveDate,
    ) -> Vec<&'a GameRecord> {
        let tomorrow = today + Duration::days(1);
        schedule
            .iter()
            .filter(|d| d.date == today || d.date == tomorrow)
            .flat_map(|d| d.games.iter())
            .filter(|g| g.status != GameStatus::Final)
            .collect()
    }

    /// Score one game from the two teams' tallies.
    pub fn score_game(
        &self,
        game: &GameRecord,
        home_wins: u32,
        away_wins: u32,
    ) -> BettingPrediction {
        let home_raw = home_wins + self.home_bonus;
        let away_raw = away_wins + self.away_bonus;
        let (home_pct, away_pct) = split_percent(home_raw, away_raw);

        let (favorite, favorite_pct) = if home_pct >= away_pct {
            (&game.home_team, home_pct)
        } else {
            (&game.away_team, away_pct)
        };
        let tier = ConfidenceTier::from_pct(favorite_pct);

        let analysis = format!(
            "{} favored at {}% ({} confidence): {} has {} recent wins, {} has {}.",
            favorite,
            favorite_pct,
            tier.as_str(),
            game.home_team,
            home_wins,
            game.away_team,
            away_wins
        );

        BettingPrediction {
            date: game.date,
            match_label: format!("{} vs {}", game.home_team, game.away_team),
            time: game.time.clone(),
            home_win_pct: home_pct,
            away_win_pct: away_pct,
            favorite: favorite.clone(),
            confidence: favorite_pct,
            tier,
            analysis,
        }
    }

    /// Predictions for every candidate game, in schedule order.
    pub fn predict(&self, schedule: &[DaySchedule], today: NaiveDate) -> Vec<BettingPrediction> {
        let tally = self.recent_wins(schedule, today);
        let wins = |team: &str| tally.get(team).copied().unwrap_or(0);

        let predictions: Vec<BettingPrediction> = self
            .candidates(schedule, today)
            .into_iter()
            .map(|game| self.score_game(game, wins(&game.home_team), wins(&game.away_team)))
            .collect();

        for p in &predictions {
            tracing::debug!(
                "Prediction {}: home {}% / away {}% ({})",
                p.match_label,
                p.home_win_pct,
                p.away_win_pct,
                p.tier.as_str()
            );
        }

        predictions
    }
}

impl Default for BettingEngine {
    fn default() -> Self {
        Self::new()
    }
}
