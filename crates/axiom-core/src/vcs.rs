//! Version-control collaborator.
//!
//! The orchestrator needs exactly two read-only facts from version control:
//! which files are staged, and the pending (or most recent) commit message.
//! It never mutates repository state.

use crate::process::run_with_timeout;
use axiom_model::ComponentError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Bound on each git invocation until configuration supplies one.
const GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Version-control query failure.
#[derive(Debug, Error)]
pub enum VcsError {
    /// git ran and reported an error.
    #[error("git {args} failed: {stderr}")]
    Git { args: String, stderr: String },

    /// git could not be run or timed out.
    #[error(transparent)]
    Process(#[from] ComponentError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of the changed-file set and commit message.
pub trait VcsProvider: Send + Sync {
    /// Paths of changed files, relative to the project root.
    fn changed_files(&self) -> Result<Vec<String>, VcsError>;

    /// The in-progress commit message, else the last commit's message.
    fn commit_message(&self) -> Result<Option<String>, VcsError>;

    /// [`commit_message`](Self::commit_message) with any external process
    /// bounded by `timeout` (`None` is unbounded).
    ///
    /// Providers that spawn nothing keep the default.
    fn commit_message_within(&self, _timeout: Option<Duration>) -> Result<Option<String>, VcsError> {
        self.commit_message()
    }
}

/// Queries a git working tree through the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    timeout: Option<Duration>,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            timeout: Some(GIT_TIMEOUT),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn git(&self, args: &[&str]) -> Result<String, VcsError> {
        let mut command = Command::new("git");
        command.args(args).current_dir(&self.root);

        let output = run_with_timeout(command, self.timeout)?;
        if !output.status.success() {
            return Err(VcsError::Git {
                args: args.join(" "),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    fn pending_message(&self) -> Result<Option<String>, VcsError> {
        let git_dir = self.git(&["rev-parse", "--git-dir"])?;
        let git_dir = Path::new(git_dir.trim());
        let path = if git_dir.is_absolute() {
            git_dir.join("COMMIT_EDITMSG")
        } else {
            self.root.join(git_dir).join("COMMIT_EDITMSG")
        };

        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        Ok(non_empty(text))
    }
}

impl VcsProvider for GitCli {
    fn changed_files(&self) -> Result<Vec<String>, VcsError> {
        let stdout = self.git(&["diff", "--cached", "--name-only"])?;
        let files: Vec<String> = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        debug!("git reports {} staged files", files.len());
        Ok(files)
    }

    fn commit_message(&self) -> Result<Option<String>, VcsError> {
        if let Some(message) = self.pending_message()? {
            return Ok(Some(message));
        }
        let last = self.git(&["log", "-1", "--pretty=%B"])?;
        Ok(non_empty(last))
    }

    fn commit_message_within(&self, timeout: Option<Duration>) -> Result<Option<String>, VcsError> {
        self.clone().with_timeout(timeout).commit_message()
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.trim().is_empty()).then_some(text)
}

/// A fixed file list and message, for explicit invocations and tests.
#[derive(Debug, Clone, Default)]
pub struct FixedChangeSet {
    files: Vec<String>,
    message: Option<String>,
}

impl FixedChangeSet {
    pub fn new(files: Vec<String>) -> Self {
        Self {
            files,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl VcsProvider for FixedChangeSet {
    fn changed_files(&self) -> Result<Vec<String>, VcsError> {
        Ok(self.files.clone())
    }

    fn commit_message(&self) -> Result<Option<String>, VcsError> {
        Ok(self.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_change_set() {
        let vcs = FixedChangeSet::new(vec!["a.rs".to_string()]).with_message("BIGBANG_APPROVED");
        assert_eq!(vcs.changed_files().unwrap(), vec!["a.rs".to_string()]);
        assert_eq!(vcs.commit_message().unwrap().as_deref(), Some("BIGBANG_APPROVED"));
    }

    #[test]
    fn test_git_timeout_defaults_and_overrides() {
        let git = GitCli::new(".");
        assert_eq!(git.timeout(), Some(GIT_TIMEOUT));
        assert_eq!(git.clone().with_timeout(None).timeout(), None);
        assert_eq!(
            git.with_timeout(Some(Duration::from_secs(5))).timeout(),
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_fixed_change_set_ignores_timeout() {
        let vcs = FixedChangeSet::default().with_message("m");
        assert_eq!(vcs.commit_message_within(None).unwrap().as_deref(), Some("m"));
    }

    #[test]
    fn test_git_outside_repository_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let git = GitCli::new(dir.path());
        // Either git is missing or the directory is not a repository
        assert!(git.changed_files().is_err());
    }
}
