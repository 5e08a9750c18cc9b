use chrono::{Datelike, Duration, NaiveDate};
use serde_json::Value;
use std::fmt::Display;
use std::future::Future;

/// Every calendar day from `today - past` to `today + future`, ascending.
pub fn date_window(today: NaiveDate, past: u32, future: u32) -> Vec<NaiveDate> {
    let start = today - Duration::days(i64::from(past));
    (0..=i64::from(past) + i64::from(future))
        .map(|offset| start + Duration::days(offset))
        .collect()
}

/// Season labels to try for standings, most likely first.
///
/// Split-year seasons roll over in August: on 2026-10-17 this yields
/// `["2026-2027", "2025-2026", "2026"]`.
pub fn season_candidates(today: NaiveDate) -> Vec<String> {
    let start_year = if today.month() >= 8 {
        today.year()
    } else {
        today.year() - 1
    };
    vec![
        format!("{}-{}", start_year, start_year + 1),
        format!("{}-{}", start_year - 1, start_year),
        today.year().to_string(),
    ]
}

/// Parse an upstream integer that may arrive as a number, a numeric string,
/// an empty string, or null.
pub fn lenient_int(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<i32>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .and_then(|f| i32::try_from(f as i64).ok())
            })
        }
        _ => None,
    }
}

/// First integer found under any of `keys`, or 0.
pub fn pick_int(row: &Value, keys: &[&str]) -> i32 {
    keys.iter().find_map(|k| lenient_int(&row[*k])).unwrap_or(0)
}

/// First non-empty string found under any of `keys`.
pub fn pick_str<'a>(row: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| row[*k].as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Split two raw strengths into integer percentages that sum to exactly 100.
pub fn split_percent(home_raw: u32, away_raw: u32) -> (u8, u8) {
    let total = home_raw + away_raw;
    if total == 0 {
        return (50, 50);
    }
    let home = (f64::from(home_raw) / f64::from(total) * 100.0).round() as u8;
    (home, 100 - home)
}

/// Try `candidates` in order and return the first one whose lookup yields a
/// non-empty list. Failures are logged and skipped; later candidates are not
/// touched once one succeeds.
pub async fn first_non_empty<C, T, E, F, Fut>(
    label: &str,
    candidates: &[C],
    mut lookup: F,
) -> Option<(C, Vec<T>)>
where
    C: Clone + Display,
    E: Display,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    for candidate in candidates {
        match lookup(candidate.clone()).await {
            Ok(items) if !items.is_empty() => {
                tracing::debug!("{}: {} returned {} entries", label, candidate, items.len());
                return Some((candidate.clone(), items));
            }
            Ok(_) => tracing::info!("{}: {} is empty, trying next", label, candidate),
            Err(e) => tracing::warn!("{}: {} failed ({}), trying next", label, candidate, e),
        }
    }
    None
}

/// Format a finished run's wall time the way the run summary prints it.
pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    format!("{:.1}s", elapsed.as_secs_f64())
}
