//! Fix session lifecycle.

use crate::backup::BackupSet;
use crate::Result;
use std::path::Path;
use tracing::debug;

/// Where a fix session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixState {
    /// No pending mutations.
    Idle,
    /// Mutations applied, awaiting commit or rollback.
    Fixing,
    /// Mutations accepted, backups being deleted.
    Committed,
    /// Files being restored from backups.
    RolledBack,
}

/// Tracks one fixer's pending mutations.
///
/// A session passes through `Committed` or `RolledBack` while its backups
/// are drained and then returns to `Idle`, ready for the next cycle.
#[derive(Debug)]
pub struct FixSession {
    state: FixState,
    last_outcome: Option<FixState>,
    backups: BackupSet,
}

impl Default for FixSession {
    fn default() -> Self {
        Self {
            state: FixState::Idle,
            last_outcome: None,
            backups: BackupSet::new(),
        }
    }
}

impl FixSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FixState {
        self.state
    }

    /// The terminal transition taken by the most recent cycle.
    pub fn last_outcome(&self) -> Option<FixState> {
        self.last_outcome
    }

    pub fn backups(&self) -> &BackupSet {
        &self.backups
    }

    /// Snapshots `path` and enters [`FixState::Fixing`].
    ///
    /// Call before the first mutation of each file.
    pub fn protect(&mut self, path: &Path) -> Result<()> {
        self.backups.snapshot(path)?;
        self.state = FixState::Fixing;
        Ok(())
    }

    /// Accepts pending mutations. No-op unless fixing.
    pub fn commit(&mut self) -> Result<()> {
        if self.state != FixState::Fixing {
            debug!("Commit with no pending fixes ignored");
            return Ok(());
        }
        self.state = FixState::Committed;
        let drained = self.backups.discard();
        self.finish(FixState::Committed);
        drained
    }

    /// Restores every touched file. No-op unless fixing.
    pub fn rollback(&mut self) -> Result<()> {
        if self.state != FixState::Fixing {
            debug!("Rollback with no pending fixes ignored");
            return Ok(());
        }
        self.state = FixState::RolledBack;
        let drained = self.backups.restore();
        self.finish(FixState::RolledBack);
        drained
    }

    fn finish(&mut self, outcome: FixState) {
        self.last_outcome = Some(outcome);
        self.state = FixState::Idle;
    }
}
