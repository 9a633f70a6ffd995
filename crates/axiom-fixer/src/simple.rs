//! Append-only fixer for list-like files such as `.gitignore`.

use crate::error::FixerError;
use crate::session::{FixSession, FixState};
use axiom_model::{ComponentError, FixResult, Fixer, Violation};
use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Fix payload key this fixer understands: a list of lines to append.
pub const MISSING_ENTRIES_KEY: &str = "missing_entries";

/// Comment line written above appended entries.
pub const AUTO_ADDED_MARKER: &str = "# Auto-added by AXIOM Sentinel";

/// The single file mutation used by [`SimpleFixer`].
pub trait AppendWriter: Send {
    /// Appends `block` to the existing file at `path`.
    fn append(&self, path: &Path, block: &str) -> io::Result<()>;
}

/// Appends through the filesystem and syncs before returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsAppendWriter;

impl AppendWriter for FsAppendWriter {
    fn append(&self, path: &Path, block: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(path)?;
        file.write_all(block.as_bytes())?;
        file.sync_all()
    }
}

/// Appends missing entries named by a violation's fix payload to the file
/// the violation points at.
///
/// Only auto-fixable, non-blocking violations carrying
/// [`MISSING_ENTRIES_KEY`] are handled. Violations for files that do not
/// exist are skipped.
///
/// # Example
///
/// ```rust,no_run
/// use axiom_fixer::SimpleFixer;
/// use axiom_model::Fixer;
///
/// let mut fixer = SimpleFixer::new(".");
/// let result = fixer.fix(&[]);
/// assert!(result.fixed_files.is_empty());
/// fixer.commit().unwrap();
/// ```
pub struct SimpleFixer {
    root: PathBuf,
    session: FixSession,
    writer: Box<dyn AppendWriter>,
}

impl SimpleFixer {
    pub const NAME: &'static str = "simple";

    /// Creates a fixer resolving violation paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_writer(root, Box::new(FsAppendWriter))
    }

    /// Creates a fixer that mutates files through `writer`.
    pub fn with_writer(root: impl Into<PathBuf>, writer: Box<dyn AppendWriter>) -> Self {
        Self {
            root: root.into(),
            session: FixSession::new(),
            writer,
        }
    }

    pub fn state(&self) -> FixState {
        self.session.state()
    }

    pub fn session(&self) -> &FixSession {
        &self.session
    }

    fn apply(&mut self, candidates: &[(&Violation, Vec<String>)]) -> Result<Vec<String>, FixerError> {
        let mut fixed = BTreeSet::new();

        for (violation, entries) in candidates {
            let target = self.root.join(violation.file_path());
            if !target.is_file() {
                warn!("Skipping fix for missing file {}", target.display());
                continue;
            }

            self.session.protect(&target)?;

            let mut block = format!("\n{AUTO_ADDED_MARKER}\n");
            for entry in entries {
                block.push_str(entry);
                block.push('\n');
            }
            self.writer
                .append(&target, &block)
                .map_err(|source| FixerError::Write {
                    path: target.clone(),
                    source,
                })?;

            info!(
                "Appended {} entries to {}",
                entries.len(),
                violation.file_path()
            );
            fixed.insert(violation.file_path().to_string());
        }

        Ok(fixed.into_iter().collect())
    }
}

fn missing_entries(violation: &Violation) -> Option<Vec<String>> {
    let value = violation.fix_data()?.get(MISSING_ENTRIES_KEY)?;
    let Some(items) = value.as_array() else {
        warn!(
            "Ignoring malformed {} payload on {}",
            MISSING_ENTRIES_KEY,
            violation.file_path()
        );
        return None;
    };
    let entries: Vec<String> = items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect();
    (!entries.is_empty()).then_some(entries)
}

impl Fixer for SimpleFixer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn fix(&mut self, violations: &[Violation]) -> FixResult {
        let start = Instant::now();

        let candidates: Vec<(&Violation, Vec<String>)> = violations
            .iter()
            .filter(|v| v.is_fix_candidate(MISSING_ENTRIES_KEY))
            .filter_map(|v| missing_entries(v).map(|entries| (v, entries)))
            .collect();

        if candidates.is_empty() {
            return FixResult::nothing(Self::NAME);
        }

        match self.apply(&candidates) {
            Ok(fixed) => FixResult::fixed(Self::NAME, fixed, start.elapsed()),
            Err(err) => {
                error!("Fix failed, rolling back: {}", err);
                let message = match self.session.rollback() {
                    Ok(()) => err.to_string(),
                    Err(restore) => format!("{err}; rollback also failed: {restore}"),
                };
                FixResult::failed(Self::NAME, message, start.elapsed())
            }
        }
    }

    fn commit(&mut self) -> Result<(), ComponentError> {
        self.session.commit().map_err(ComponentError::from)
    }

    fn rollback(&mut self) -> Result<(), ComponentError> {
        self.session.rollback().map_err(ComponentError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axiom_model::{FixPayload, Severity};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn gitignore_violation(entries: &[&str], severity: Severity) -> Violation {
        let mut payload = FixPayload::new();
        payload.insert(MISSING_ENTRIES_KEY.to_string(), json!(entries));
        Violation::new(".gitignore", "missing entries", severity, "gitignore").with_fix(payload)
    }

    #[test]
    fn test_appends_under_marker() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "target\n").unwrap();

        let mut fixer = SimpleFixer::new(dir.path());
        let result = fixer.fix(&[gitignore_violation(&[".env", "*.log"], Severity::Warning)]);

        assert!(result.success);
        assert_eq!(result.fixed_files, vec![".gitignore".to_string()]);
        assert_eq!(fixer.state(), FixState::Fixing);
        assert_eq!(
            fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
            "target\n\n# Auto-added by AXIOM Sentinel\n.env\n*.log\n"
        );
    }

    #[test]
    fn test_blocking_and_unfixable_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "").unwrap();

        let mut fixer = SimpleFixer::new(dir.path());
        let plain = Violation::new(".gitignore", "m", Severity::Warning, "gitignore");
        let result = fixer.fix(&[gitignore_violation(&[".env"], Severity::Blocking), plain]);

        assert!(result.success);
        assert!(result.fixed_files.is_empty());
        assert_eq!(fixer.state(), FixState::Idle);
    }

    #[test]
    fn test_missing_target_skipped() {
        let dir = TempDir::new().unwrap();
        let mut fixer = SimpleFixer::new(dir.path());
        let result = fixer.fix(&[gitignore_violation(&[".env"], Severity::Warning)]);
        assert!(result.success);
        assert!(result.fixed_files.is_empty());
    }

    #[test]
    fn test_rollback_restores_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".gitignore");
        fs::write(&path, "target\n").unwrap();

        let mut fixer = SimpleFixer::new(dir.path());
        fixer.fix(&[gitignore_violation(&[".env"], Severity::Warning)]);
        fixer.rollback().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "target\n");
        assert_eq!(fixer.state(), FixState::Idle);
        assert_eq!(fixer.session().last_outcome(), Some(FixState::RolledBack));
        assert!(fixer.session().backups().is_empty());
    }
}
