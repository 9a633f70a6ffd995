//! Point-in-time file backups.

use crate::error::FixerError;
use crate::Result;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use uuid::Uuid;

/// Infix of backup file names: `<name>.axiom-backup.<uuid>`.
pub const BACKUP_MARKER: &str = ".axiom-backup.";

/// Mapping from original file to its backup copy.
///
/// Backups live next to the original so that restoring is a same-directory
/// rename, which replaces the original atomically.
#[derive(Debug, Default)]
pub struct BackupSet {
    entries: BTreeMap<PathBuf, PathBuf>,
}

impl BackupSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, original: &Path) -> bool {
        self.entries.contains_key(original)
    }

    /// Backup path for `original`, if snapshotted.
    pub fn backup_of(&self, original: &Path) -> Option<&Path> {
        self.entries.get(original).map(PathBuf::as_path)
    }

    /// Copies `original` aside unless it already has a backup.
    ///
    /// Only the first snapshot counts: later calls in the same session keep
    /// the pre-fix content.
    ///
    /// # Errors
    ///
    /// Returns [`FixerError::Backup`] if the copy fails; nothing is recorded.
    pub fn snapshot(&mut self, original: &Path) -> Result<()> {
        if self.contains(original) {
            return Ok(());
        }

        let backup = backup_path(original);
        fs::copy(original, &backup).map_err(|source| FixerError::Backup {
            path: original.to_path_buf(),
            source,
        })?;
        debug!("Backed up {} to {}", original.display(), backup.display());

        self.entries.insert(original.to_path_buf(), backup);
        Ok(())
    }

    /// Deletes every backup, accepting current file contents.
    ///
    /// The mapping is always cleared. Every backup is attempted; the first
    /// failure is returned.
    pub fn discard(&mut self) -> Result<()> {
        let mut first_error = None;
        for (original, backup) in std::mem::take(&mut self.entries) {
            if let Err(source) = fs::remove_file(&backup) {
                error!(
                    "Failed to remove backup {} of {}: {}",
                    backup.display(),
                    original.display(),
                    source
                );
                first_error.get_or_insert(FixerError::Discard {
                    path: backup,
                    source,
                });
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Moves every backup over its original.
    ///
    /// The mapping is always cleared. Every file is attempted; the first
    /// failure is returned and the remaining backups stay on disk for
    /// manual recovery.
    pub fn restore(&mut self) -> Result<()> {
        let mut first_error = None;
        for (original, backup) in std::mem::take(&mut self.entries) {
            match fs::rename(&backup, &original) {
                Ok(()) => info!("Rolled back {}", original.display()),
                Err(source) => {
                    error!(
                        "Failed to restore {} from {}: {}",
                        original.display(),
                        backup.display(),
                        source
                    );
                    first_error.get_or_insert(FixerError::Restore {
                        path: original,
                        source,
                    });
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn backup_path(original: &Path) -> PathBuf {
    let mut name: OsString = original
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(BACKUP_MARKER);
    name.push(Uuid::new_v4().simple().to_string());
    original.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_then_restore_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("list.txt");
        fs::write(&file, b"one\ntwo\n").unwrap();

        let mut set = BackupSet::new();
        set.snapshot(&file).unwrap();
        fs::write(&file, b"clobbered").unwrap();
        set.restore().unwrap();

        assert_eq!(fs::read(&file).unwrap(), b"one\ntwo\n");
        assert!(set.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_second_snapshot_keeps_first_content() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("list.txt");
        fs::write(&file, b"original").unwrap();

        let mut set = BackupSet::new();
        set.snapshot(&file).unwrap();
        fs::write(&file, b"first edit").unwrap();
        set.snapshot(&file).unwrap();
        assert_eq!(set.len(), 1);

        set.restore().unwrap();
        assert_eq!(fs::read(&file).unwrap(), b"original");
    }

    #[test]
    fn test_discard_removes_backups_keeps_edits() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("list.txt");
        fs::write(&file, b"original").unwrap();

        let mut set = BackupSet::new();
        set.snapshot(&file).unwrap();
        let backup = set.backup_of(&file).unwrap().to_path_buf();
        assert!(backup.to_string_lossy().contains(BACKUP_MARKER));

        fs::write(&file, b"edited").unwrap();
        set.discard().unwrap();

        assert!(!backup.exists());
        assert!(set.is_empty());
        assert_eq!(fs::read(&file).unwrap(), b"edited");
    }

    #[test]
    fn test_snapshot_of_missing_file_fails_without_recording() {
        let dir = TempDir::new().unwrap();
        let mut set = BackupSet::new();
        let err = set.snapshot(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, FixerError::Backup { .. }));
        assert!(set.is_empty());
    }
}
