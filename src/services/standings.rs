use serde_json::Value;

use crate::models::{League, StandingsRow};
use crate::services::UpstreamSource;
use crate::utils::{first_non_empty, pick_int, pick_str};

/// Standings for the first candidate season that has any, plus that season's
/// label. `None` means every candidate was empty or failed.
pub async fn normalize_standings<S: UpstreamSource + ?Sized>(
    source: &S,
    league: &League,
    seasons: &[String],
) -> Option<(String, Vec<StandingsRow>)> {
    let label = format!("{} standings", league.key);
    let (season, rows) = first_non_empty(&label, seasons, |season: String| async move {
        source.standings_table(league, &season).await
    })
    .await?;

    let rows: Vec<StandingsRow> = rows.iter().map(row_from_upstream).collect();
    tracing::info!("{}: {} teams from season {}", label, rows.len(), season);
    Some((season, rows))
}

/// Map one upstream table row. Anything missing becomes 0 or "".
pub fn row_from_upstream(row: &Value) -> StandingsRow {
    StandingsRow {
        name: pick_str(row, &["strTeam", "name", "team"]).unwrap_or_default().to_string(),
        gp: pick_int(row, &["intPlayed", "gp", "played"]),
        wins: pick_int(row, &["intWin", "wins"]),
        losses: pick_int(row, &["intLoss", "losses"]),
        ot_losses: pick_int(row, &["intOTLoss", "intOvertimeLoss", "otLosses"]),
        draws: pick_int(row, &["intDraw", "draws"]),
        points: pick_int(row, &["intPoints", "points"]),
        gf: pick_int(row, &["intGoalsFor", "gf"]),
        ga: pick_int(row, &["intGoalsAgainst", "ga"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeTables {
        tables: Vec<(&'static str, Result<usize, u16>)>,
        asked: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl UpstreamSource for FakeTables {
        async fn day_events(
            &self,
            _league: &League,
            _date: NaiveDate,
        ) -> Result<Vec<Value>, FetchError> {
            Ok(vec![])
        }

        async fn standings_table(
            &self,
            _league: &League,
            season: &str,
        ) -> Result<Vec<Value>, FetchError> {
            self.asked.lock().unwrap().push(season.to_string());
            match self.tables.iter().find(|(s, _)| *s == season).map(|(_, t)| t.clone()) {
                Some(Ok(n)) => Ok((0..n)
                    .map(|i| json!({ "strTeam": format!("Team {}", i), "intPoints": "10" }))
                    .collect()),
                Some(Err(status)) => Err(FetchError::Http {
                    url: season.to_string(),
                    status,
                }),
                None => Ok(vec![]),
            }
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn league() -> League {
        League {
            key: "ahl".into(),
            upstream_id: "4738".into(),
        }
    }

    fn seasons(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_non_empty_season_wins() {
        let source = FakeTables {
            tables: vec![("S1", Ok(0)), ("S2", Ok(3)), ("S3", Ok(5))],
            asked: Mutex::new(vec![]),
        };

        let (season, rows) = normalize_standings(&source, &league(), &seasons(&["S1", "S2", "S3"]))
            .await
            .unwrap();

        assert_eq!(season, "S2");
        assert_eq!(rows.len(), 3);
        assert_eq!(*source.asked.lock().unwrap(), vec!["S1", "S2"]);
    }

    #[tokio::test]
    async fn test_failed_season_falls_through() {
        let source = FakeTables {
            tables: vec![("S1", Err(500)), ("S2", Ok(2))],
            asked: Mutex::new(vec![]),
        };

        let (season, rows) = normalize_standings(&source, &league(), &seasons(&["S1", "S2"]))
            .await
            .unwrap();
        assert_eq!(season, "S2");
        assert_eq!(rows[1].name, "Team 1");
        assert_eq!(rows[1].points, 10);
    }

    #[tokio::test]
    async fn test_all_candidates_empty_is_degraded_not_error() {
        let source = FakeTables {
            tables: vec![("S1", Ok(0)), ("S2", Err(404))],
            asked: Mutex::new(vec![]),
        };

        let result = normalize_standings(&source, &league(), &seasons(&["S1", "S2"])).await;
        assert!(result.is_none());
        assert_eq!(source.asked.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_row_mapping_is_permissive() {
        let row = json!({
            "strTeam": "Hershey Bears",
            "intPlayed": "44",
            "intWin": "28",
            "intLoss": "12",
            "intOTLoss": 4,
            "intDraw": null,
            "intPoints": "",
            "intGoalsFor": "151",
            "intGoalsAgainst": "n/a",
        });

        let mapped = row_from_upstream(&row);
        assert_eq!(
            mapped,
            StandingsRow {
                name: "Hershey Bears".into(),
                gp: 44,
                wins: 28,
                losses: 12,
                ot_losses: 4,
                draws: 0,
                points: 0,
                gf: 151,
                ga: 0,
            }
        );

        assert_eq!(row_from_upstream(&json!({})), StandingsRow::default());
    }
}
