use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single upstream call. Callers treat every variant as
/// "no data for this unit of work".
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream returned HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("undecodable payload from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl FetchError {
    pub fn decode(url: &str, reason: impl Into<String>) -> Self {
        FetchError::Decode {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Short label for logs: which class of the taxonomy this is.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => "transient-network",
            FetchError::Http { .. } | FetchError::Decode { .. } => "upstream-shape",
        }
    }
}

/// Local persistence failure. Fatal for the run.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize dataset for {league}: {source}")]
    Serialize {
        league: String,
        #[source]
        source: serde_json::Error,
    },
}
