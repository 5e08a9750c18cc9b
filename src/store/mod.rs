pub mod fixture;
pub use fixture::synthetic_dataset;

use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::models::LeagueDataset;

/// Where a league's dataset lives: `<dir>/<league>.json`.
pub fn dataset_path(dir: &Path, league: &str) -> PathBuf {
    dir.join(format!("{}.json", league))
}

/// Where a league's synthetic fixture lives; never the real dataset path.
pub fn fixture_path(dir: &Path, league: &str) -> PathBuf {
    dir.join(format!("{}.fixture.json", league))
}

/// Persist `dataset` at `path`, replacing whatever was there.
///
/// The JSON is written to a sibling temp file and renamed over the target, so
/// readers see either the previous complete file or the new complete file.
pub async fn write_dataset(path: &Path, dataset: &LeagueDataset) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error(parent))?;
        }
    }

    let mut body = serde_json::to_vec_pretty(dataset).map_err(|source| StoreError::Serialize {
        league: dataset.league.clone(),
        source,
    })?;
    body.push(b'\n');

    let tmp = path.with_extension("json.tmp");
    if let Err(source) = tokio::fs::write(&tmp, &body).await {
        tokio::fs::remove_file(&tmp).await.ok();
        return Err(io_error(&tmp)(source));
    }
    if let Err(source) = tokio::fs::rename(&tmp, path).await {
        tokio::fs::remove_file(&tmp).await.ok();
        return Err(io_error(path)(source));
    }

    tracing::info!("Dataset for {} saved to {}", dataset.league, path.display());
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}
