//! Persistent metrics document with atomic replacement.

use crate::error::MetricsError;
use crate::history::HistoryEntry;
use crate::stats::Statistics;
use crate::Result;
use axiom_model::Violation;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Most recent runs retained in the history.
pub const MAX_HISTORY: usize = 100;

/// The on-disk metrics document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsDocument {
    pub history: Vec<HistoryEntry>,
    /// Derived from `history`; `None` while the history is empty.
    pub statistics: Option<Statistics>,
}

impl MetricsDocument {
    /// Appends `entry`, trims to `max_history` and recomputes statistics.
    pub fn push(&mut self, entry: HistoryEntry, max_history: usize) {
        self.history.push(entry);
        if self.history.len() > max_history {
            let excess = self.history.len() - max_history;
            self.history.drain(..excess);
        }
        self.statistics = Statistics::compute(&self.history);
    }
}

/// Reads and atomically rewrites the metrics document at one path.
///
/// A single writer per run is assumed. Concurrent readers are safe because
/// the document is only ever replaced by rename.
#[derive(Debug, Clone)]
pub struct MetricsStore {
    path: PathBuf,
    max_history: usize,
}

impl MetricsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_history: MAX_HISTORY,
        }
    }

    /// Overrides the history bound.
    #[must_use]
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document, starting fresh when it is missing or corrupt.
    ///
    /// Only the history is read; statistics are always recomputed from it.
    pub fn load(&self) -> MetricsDocument {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No metrics document at {}, starting fresh", self.path.display());
                return MetricsDocument::default();
            }
            Err(e) => {
                warn!(
                    "Could not read metrics document {}, starting fresh: {}",
                    self.path.display(),
                    e
                );
                return MetricsDocument::default();
            }
        };

        match parse_history(&text) {
            Ok(history) => {
                let statistics = Statistics::compute(&history);
                MetricsDocument {
                    history,
                    statistics,
                }
            }
            Err(e) => {
                warn!(
                    "Metrics document {} is corrupt, starting fresh: {}",
                    self.path.display(),
                    e
                );
                MetricsDocument::default()
            }
        }
    }

    /// Appends a run summary and persists the updated document.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] if the document cannot be written. The
    /// previous document, if any, is left intact.
    pub fn record(&self, violations: &[Violation], total_duration: Duration) -> Result<MetricsDocument> {
        let mut document = self.load();
        document.push(
            HistoryEntry::from_violations(violations, total_duration),
            self.max_history,
        );
        self.save(&document)?;
        Ok(document)
    }

    /// Writes `document` to a synced temporary file beside the target, then
    /// renames it into place.
    pub fn save(&self, document: &MetricsDocument) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| MetricsError::io(&dir, e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| MetricsError::io(&dir, e))?;
        serde_json::to_writer_pretty(&mut tmp, document)?;
        tmp.write_all(b"\n").map_err(|e| MetricsError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| MetricsError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| MetricsError::io(&self.path, e.error))?;

        debug!(
            "Persisted {} history entries to {}",
            document.history.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[derive(Deserialize)]
struct HistoryOnly {
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

fn parse_history(text: &str) -> serde_json::Result<Vec<HistoryEntry>> {
    serde_json::from_str::<HistoryOnly>(text).map(|doc| doc.history)
}
