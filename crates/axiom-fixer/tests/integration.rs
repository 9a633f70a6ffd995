//! # Integration Tests
//!
//! Rollback guarantees of [`SimpleFixer`] when the underlying write fails
//! part-way through.

use axiom_fixer::{AppendWriter, FixState, FsAppendWriter, SimpleFixer, MISSING_ENTRIES_KEY};
use axiom_model::{FixPayload, Fixer, Severity, Violation};
use serde_json::json;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Writes half of the block, then fails.
struct TornWriter;

impl AppendWriter for TornWriter {
    fn append(&self, path: &Path, block: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(path)?;
        file.write_all(&block.as_bytes()[..block.len() / 2])?;
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }
}

/// Succeeds for the first `ok` calls, then tears like [`TornWriter`].
struct FailAfter {
    ok: usize,
    calls: AtomicUsize,
}

impl AppendWriter for FailAfter {
    fn append(&self, path: &Path, block: &str) -> io::Result<()> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.ok {
            FsAppendWriter.append(path, block)
        } else {
            TornWriter.append(path, block)
        }
    }
}

fn violation(file: &str, entries: &[&str]) -> Violation {
    let mut payload = FixPayload::new();
    payload.insert(MISSING_ENTRIES_KEY.to_string(), json!(entries));
    Violation::new(file, "missing entries", Severity::Warning, "gitignore").with_fix(payload)
}

fn entry_count(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

// ============================================================================
// Mid-write failure
// ============================================================================

#[test]
fn test_torn_write_leaves_file_byte_identical() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".gitignore");
    let original = b"target\nnode_modules\n".to_vec();
    fs::write(&path, &original).unwrap();

    let mut fixer = SimpleFixer::with_writer(dir.path(), Box::new(TornWriter));
    let result = fixer.fix(&[violation(".gitignore", &[".env", "*.log"])]);

    assert!(!result.success);
    assert!(result.fixed_files.is_empty());
    assert!(result.error.unwrap().contains("disk full"));
    assert_eq!(fs::read(&path).unwrap(), original);
    assert!(fixer.session().backups().is_empty());
    assert_eq!(fixer.state(), FixState::Idle);
    assert_eq!(fixer.session().last_outcome(), Some(FixState::RolledBack));
    // No stray backup files
    assert_eq!(entry_count(dir.path()), 1);
}

#[test]
fn test_failure_on_second_file_restores_first() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("web")).unwrap();
    let first = dir.path().join(".gitignore");
    let second = dir.path().join("web/.gitignore");
    fs::write(&first, "target\n").unwrap();
    fs::write(&second, "dist\n").unwrap();

    let writer = FailAfter {
        ok: 1,
        calls: AtomicUsize::new(0),
    };
    let mut fixer = SimpleFixer::with_writer(dir.path(), Box::new(writer));
    let result = fixer.fix(&[
        violation(".gitignore", &[".env"]),
        violation("web/.gitignore", &[".env"]),
    ]);

    assert!(!result.success);
    assert_eq!(fs::read_to_string(&first).unwrap(), "target\n");
    assert_eq!(fs::read_to_string(&second).unwrap(), "dist\n");
    assert!(fixer.session().backups().is_empty());
}

// ============================================================================
// Commit
// ============================================================================

#[test]
fn test_commit_keeps_edit_and_removes_backup() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".gitignore");
    fs::write(&path, "target\n").unwrap();

    let mut fixer = SimpleFixer::new(dir.path());
    let result = fixer.fix(&[violation(".gitignore", &[".env"])]);
    assert!(result.success);
    // Backup sits next to the original until commit
    assert_eq!(entry_count(dir.path()), 2);

    fixer.commit().unwrap();
    assert_eq!(fixer.state(), FixState::Idle);
    assert_eq!(fixer.session().last_outcome(), Some(FixState::Committed));
    assert_eq!(entry_count(dir.path()), 1);
    assert!(fs::read_to_string(&path).unwrap().ends_with(".env\n"));

    // Rollback after commit changes nothing
    fixer.rollback().unwrap();
    assert!(fs::read_to_string(&path).unwrap().ends_with(".env\n"));
}

#[test]
fn test_two_violations_same_file_single_backup() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".gitignore");
    fs::write(&path, "target\n").unwrap();

    let mut fixer = SimpleFixer::new(dir.path());
    let result = fixer.fix(&[
        violation(".gitignore", &[".env"]),
        violation(".gitignore", &["*.log"]),
    ]);

    assert_eq!(result.fixed_files, vec![".gitignore".to_string()]);
    assert_eq!(fixer.session().backups().len(), 1);

    fixer.rollback().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "target\n");
}
