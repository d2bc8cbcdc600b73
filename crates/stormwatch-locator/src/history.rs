//! Per-store status history: when each store last moved between open and
//! closed.
//!
//! The locator feed only reports the current status, so closure times are
//! derived by diffing each load against the previous one and persisting the
//! result to a JSON file.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stormwatch_core::{Location, StoreStatus};
use tokio::sync::Mutex;

use crate::error::HistoryError;

/// History record for one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: StoreStatus,
    pub last_changed: DateTime<Utc>,
    /// Written for compatibility with existing history files; never set
    /// by reconciliation.
    #[serde(default)]
    pub closed_due_to_storm: bool,
}

/// Map of store code to [`StatusEntry`], ordered by store code so the
/// persisted file diffs cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusHistory {
    entries: BTreeMap<String, StatusEntry>,
}

impl StatusHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, store_code: &str) -> Option<&StatusEntry> {
        self.entries.get(store_code)
    }

    #[must_use]
    pub fn last_changed(&self, store_code: &str) -> Option<DateTime<Utc>> {
        self.entries.get(store_code).map(|entry| entry.last_changed)
    }

    /// Store code to last-change timestamp, for cross-referencing a fresh
    /// location load.
    #[must_use]
    pub fn last_changed_map(&self) -> HashMap<String, DateTime<Utc>> {
        self.entries
            .iter()
            .map(|(code, entry)| (code.clone(), entry.last_changed))
            .collect()
    }

    /// Fold the current feed state into the history.
    ///
    /// Unseen stores are recorded with `last_changed = now`. A known store is
    /// updated only when its status *category* changes, so `C` to `CT` keeps
    /// the original closure time. Returns `true` if anything changed.
    pub fn reconcile(&mut self, locations: &[Location], now: DateTime<Utc>) -> bool {
        let mut modified = false;

        for location in locations {
            match self.entries.get_mut(&location.store_code) {
                None => {
                    self.entries.insert(
                        location.store_code.clone(),
                        StatusEntry {
                            status: location.status.clone(),
                            last_changed: now,
                            closed_due_to_storm: false,
                        },
                    );
                    modified = true;
                }
                Some(entry) if entry.status.category() != location.status.category() => {
                    tracing::debug!(
                        store_code = %location.store_code,
                        from = %entry.status,
                        to = %location.status,
                        "store status changed"
                    );
                    entry.status = location.status.clone();
                    entry.last_changed = now;
                    modified = true;
                }
                Some(_) => {}
            }
        }

        modified
    }

    /// Fill `last_changed` on each location from the history. Stores without
    /// an entry are left as `None`.
    pub fn annotate(&self, locations: &mut [Location]) {
        for location in locations {
            location.last_changed = self.last_changed(&location.store_code);
        }
    }
}

/// File-backed [`StatusHistory`].
///
/// Clones share one lock, so concurrent [`reconcile`](Self::reconcile) calls
/// through the same store never interleave their load and save.
#[derive(Debug, Clone)]
pub struct StatusHistoryStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl StatusHistoryStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the history file. A missing file is an empty history.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Io`] on read failure or
    /// [`HistoryError::Parse`] if the file is not a valid history map.
    pub async fn load(&self) -> Result<StatusHistory, HistoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no status history yet; starting empty");
                return Ok(StatusHistory::new());
            }
            Err(source) => return Err(self.io_error(source)),
        };

        serde_json::from_slice(&bytes).map_err(|source| HistoryError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the history as pretty-printed JSON, creating parent
    /// directories as needed.
    ///
    /// The JSON goes to a temporary file in the same directory which is then
    /// renamed over the target, so readers see either the old file or the
    /// new one.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Io`] if the directory or file cannot be
    /// written.
    pub async fn save(&self, history: &StatusHistory) -> Result<(), HistoryError> {
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| self.io_error(source))?;
                parent.to_path_buf()
            }
            None => PathBuf::from("."),
        };

        let json = serde_json::to_vec_pretty(history).map_err(|source| HistoryError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let target = self.path.clone();
        tokio::task::spawn_blocking(move || write_replace(&parent, &target, &json))
            .await
            .map_err(|join| self.io_error(std::io::Error::other(join)))?
            .map_err(|source| self.io_error(source))
    }

    /// Load, reconcile against `locations`, and save only if something
    /// changed. Returns the updated history.
    ///
    /// A history file that no longer parses is moved aside to
    /// `<path>.corrupt` and reconciliation starts from an empty history.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures from load, quarantine, and save.
    pub async fn reconcile(
        &self,
        locations: &[Location],
        now: DateTime<Utc>,
    ) -> Result<StatusHistory, HistoryError> {
        let _guard = self.lock.lock().await;

        let mut history = match self.load().await {
            Ok(history) => history,
            Err(HistoryError::Parse { source, .. }) => {
                let quarantine = self.quarantine_path();
                tokio::fs::rename(&self.path, &quarantine)
                    .await
                    .map_err(|source| self.io_error(source))?;
                tracing::warn!(
                    path = %self.path.display(),
                    moved_to = %quarantine.display(),
                    error = %source,
                    "status history unreadable; starting over"
                );
                StatusHistory::new()
            }
            Err(e) => return Err(e),
        };

        if history.reconcile(locations, now) {
            self.save(&history).await?;
            tracing::info!(
                path = %self.path.display(),
                stores = history.len(),
                "status history updated"
            );
        }
        Ok(history)
    }

    fn quarantine_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn write_replace(dir: &Path, target: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
