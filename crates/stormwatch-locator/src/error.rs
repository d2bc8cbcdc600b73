use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching or parsing the store-locator feed.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("HTTP error fetching locator page: {0}")]
    Http(#[from] reqwest::Error),

    #[error("all fetch attempts failed for {url}")]
    AllAttemptsFailed { url: String },

    /// The page loaded but carried no embedded `props` payload.
    #[error("no embedded location payload found at {url}")]
    MissingPayload { url: String },
}

/// Errors from reading or writing the status-history file.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("status history I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("status history at {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
