use anyhow::{Context, Result};
use chrono::Utc;
use std::time::Instant;

use crate::config::{league_key, FetchConfig};
use crate::models::LeagueReport;
use crate::services::{build_league_dataset, BettingEngine, RunPlan, SportsDbClient};
use crate::store::{dataset_path, fixture_path, synthetic_dataset, write_dataset};
use crate::utils::{date_window, format_elapsed};

fn run_plan(config: &FetchConfig) -> RunPlan {
    let started_at = Utc::now();
    let today = started_at.date_naive();
    RunPlan {
        started_at,
        today,
        past_days: config.past_days,
        future_days: config.future_days,
        seasons: config.season_list(today),
    }
}

/// Fetch, derive and persist every configured league, one after another.
///
/// Upstream trouble only thins out a league's dataset; a failed write stops the
/// run with an error.
pub async fn fetch_leagues(config: &FetchConfig) -> Result<Vec<LeagueReport>> {
    let leagues = config.league_list()?;
    let plan = run_plan(config);
    let started = Instant::now();

    let client = SportsDbClient::new(
        &config.api_url,
        &config.api_key,
        config.request_delay(),
        config.request_timeout(),
    )?;
    let engine = BettingEngine::new();

    tracing::info!(
        "Run for {} league(s) on {}; seasons {:?}",
        leagues.len(),
        plan.today,
        plan.seasons
    );

    let mut reports = Vec::with_capacity(leagues.len());
    for (i, league) in leagues.iter().enumerate() {
        if i > 0 {
            // inter-league pause on top of the per-call pacing
            tokio::time::sleep(config.league_delay()).await;
        }

        let (dataset, report) = build_league_dataset(&client, league, &plan, &engine).await;

        let path = dataset_path(&config.data_dir, &league.key);
        write_dataset(&path, &dataset)
            .await
            .with_context(|| format!("could not persist dataset for {}", league.key))?;

        log_report(&report);
        reports.push(report);
    }

    tracing::info!("Sync complete in {}", format_elapsed(started.elapsed()));
    Ok(reports)
}

fn log_report(report: &LeagueReport) {
    let season = report.standings_season.as_deref().unwrap_or("none");
    if report.is_degraded() {
        tracing::warn!(
            "{}: degraded ({} game days, {} failed dates, standings season {}, {} predictions)",
            report.league,
            report.days_with_games,
            report.failed_dates.len(),
            season,
            report.predictions
        );
    } else {
        tracing::info!(
            "{}: {} game days, standings season {}, {} predictions",
            report.league,
            report.days_with_games,
            season,
            report.predictions
        );
    }
}

/// Write a synthetic, explicitly flagged dataset for `league` next to the real ones.
pub async fn write_fixture(config: &FetchConfig, league: &str) -> Result<()> {
    let plan = run_plan(config);
    let league = league_key(league)?;
    let dataset = synthetic_dataset(&league, plan.today, plan.past_days, plan.future_days);

    let path = fixture_path(&config.data_dir, &league);
    write_dataset(&path, &dataset)
        .await
        .with_context(|| format!("could not write fixture for {}", league))?;

    println!("🧪 Synthetic fixture for {} written to {}", league, path.display());
    Ok(())
}

/// Print the dates and seasons a fetch would use, without any network calls.
pub fn show_window(config: &FetchConfig) -> Result<()> {
    let leagues = config.league_list()?;
    let plan = run_plan(config);
    let window = date_window(plan.today, plan.past_days, plan.future_days);

    println!("📅 Schedule window ({} days):", window.len());
    if let (Some(first), Some(last)) = (window.first(), window.last()) {
        println!("   {} → {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"));
    }

    println!("\n🏆 Standings seasons, in lookup order:");
    for season in &plan.seasons {
        println!("   • {}", season);
    }

    println!("\n🏒 Leagues:");
    for league in &leagues {
        println!(
            "   • {} (upstream id {}) → {}",
            league.key,
            league.upstream_id,
            dataset_path(&config.data_dir, &league.key).display()
        );
    }

    let calls_per_league = window.len() + plan.seasons.len();
    println!(
        "\n⏱️  At most {} calls per league, ≥{} ms apart",
        calls_per_league, config.request_delay_ms
    );
    Ok(())
}
