use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::League;
use crate::utils::season_candidates;

/// Largest accepted past/future window, in days.
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Settings shared by every subcommand. Each one can also come from the
/// environment (or a `.env` file).
#[derive(Args, Debug, Clone)]
pub struct FetchConfig {
    /// TheSportsDB API base URL
    #[arg(
        long,
        env = "SPORTSDB_API_URL",
        default_value = "https://www.thesportsdb.com/api/v1/json"
    )]
    pub api_url: String,

    /// TheSportsDB API key ("3" is the public free-tier key)
    #[arg(long, env = "SPORTSDB_API_KEY", default_value = "3")]
    pub api_key: String,

    /// Directory the per-league JSON files are written to
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Days before today to include in the schedule window
    #[arg(long, env = "PAST_DAYS", default_value = "3")]
    pub past_days: u32,

    /// Days after today to include in the schedule window
    #[arg(long, env = "FUTURE_DAYS", default_value = "10")]
    pub future_days: u32,

    /// Minimum pause between two upstream calls (milliseconds)
    #[arg(long, env = "REQUEST_DELAY_MS", default_value = "600")]
    pub request_delay_ms: u64,

    /// Pause between two leagues (milliseconds)
    #[arg(long, env = "LEAGUE_DELAY_MS", default_value = "2000")]
    pub league_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "15")]
    pub request_timeout_secs: u64,

    /// Leagues to process as comma-separated `key=upstreamId` pairs
    #[arg(long, env = "LEAGUES", default_value = "nhl=4380,liiga=4931,ahl=4738")]
    pub leagues: String,

    /// Explicit standings seasons to try, most recent first (comma-separated).
    /// Derived from the run date when omitted.
    #[arg(long, env = "SEASONS")]
    pub seasons: Option<String>,
}

impl FetchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.request_delay_ms == 0 {
            bail!("request_delay_ms must be positive; the upstream throttles unpaced clients");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be positive");
        }
        if self.past_days > MAX_WINDOW_DAYS || self.future_days > MAX_WINDOW_DAYS {
            bail!(
                "past_days and future_days must each be at most {} (got {} and {})",
                MAX_WINDOW_DAYS,
                self.past_days,
                self.future_days
            );
        }
        if self.api_url.trim().is_empty() {
            bail!("api_url must not be empty");
        }
        self.league_list()?;
        Ok(())
    }

    pub fn league_list(&self) -> Result<Vec<League>> {
        parse_leagues(&self.leagues)
    }

    /// Candidate standings seasons for a run starting on `today`.
    pub fn season_list(&self, today: NaiveDate) -> Vec<String> {
        match &self.seasons {
            Some(raw) if !raw.trim().is_empty() => split_list(raw).map(str::to_string).collect(),
            _ => season_candidates(today),
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn league_delay(&self) -> Duration {
        Duration::from_millis(self.league_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Parse `nhl=4380,liiga=4931` into leagues, keeping the given order.
pub fn parse_leagues(raw: &str) -> Result<Vec<League>> {
    let mut leagues: Vec<League> = Vec::new();

    for pair in split_list(raw) {
        let Some((key, id)) = pair.split_once('=') else {
            bail!("league entry '{}' must look like key=upstreamId", pair);
        };
        let id = id.trim();
        if id.is_empty() {
            bail!("league entry '{}' has an empty id", pair);
        }
        let key = league_key(key)?;
        if leagues.iter().any(|l| l.key == key) {
            bail!("league '{}' is configured twice", key);
        }
        leagues.push(League {
            key,
            upstream_id: id.to_string(),
        });
    }

    if leagues.is_empty() {
        bail!("no leagues configured");
    }
    Ok(leagues)
}

/// Normalize a league key. Keys become file names, so only letters, digits,
/// '-' and '_' are allowed.
pub fn league_key(raw: &str) -> Result<String> {
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        bail!("league key must not be empty");
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        bail!("league key '{}' may only contain letters, digits, '-' and '_'", key);
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: FetchConfig,
    }

    fn parse(args: &[&str]) -> FetchConfig {
        let mut argv = vec!["test"];
        argv.extend_from_slice(args);
        TestCli::parse_from(argv).config
    }

    #[test]
    fn test_parse_leagues() {
        let leagues = parse_leagues("nhl=4380, Liiga = 4931 ,ahl=4738").unwrap();
        let keys: Vec<&str> = leagues.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["nhl", "liiga", "ahl"]);
        assert_eq!(leagues[1].upstream_id, "4931");
    }

    #[test]
    fn test_parse_leagues_rejects_bad_input() {
        assert!(parse_leagues("").is_err());
        assert!(parse_leagues("nhl").is_err());
        assert!(parse_leagues("nhl=").is_err());
        assert!(parse_leagues("nhl=1,nhl=2").is_err());
        assert!(parse_leagues("../x=1").is_err());
    }

    #[test]
    fn test_explicit_window_and_delays() {
        let config = parse(&[
            "--past-days",
            "21",
            "--future-days",
            "14",
            "--request-delay-ms",
            "750",
            "--leagues",
            "liiga=4931",
        ]);
        assert_eq!(config.past_days, 21);
        assert_eq!(config.future_days, 14);
        assert_eq!(config.request_delay(), Duration::from_millis(750));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_leagues() {
        let config = parse(&[]);
        let leagues = config.league_list().unwrap();
        let keys: Vec<&str> = leagues.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["nhl", "liiga", "ahl"]);
        assert_eq!(leagues[0].upstream_id, "4380");
    }

    #[test]
    fn test_oversized_window_is_rejected() {
        let config = parse(&["--past-days", "4294967295"]);
        assert!(config.validate().is_err());

        let config = parse(&["--future-days", "367"]);
        assert!(config.validate().is_err());

        let config = parse(&["--past-days", "366", "--future-days", "366"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_league_key() {
        assert_eq!(league_key(" LIIGA ").unwrap(), "liiga");
        assert!(league_key("../../x").is_err());
        assert!(league_key("a/b").is_err());
        assert!(league_key("").is_err());
    }

    #[test]
    fn test_zero_delay_is_rejected() {
        let config = parse(&["--request-delay-ms", "0", "--leagues", "nhl=4380"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_season_list() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let mut config = parse(&["--leagues", "nhl=4380"]);
        config.seasons = None;
        assert_eq!(config.season_list(today), vec!["2026-2027", "2025-2026", "2026"]);

        config.seasons = Some("2025-2026, 2024-2025".into());
        assert_eq!(config.season_list(today), vec!["2025-2026", "2024-2025"]);
    }
}
