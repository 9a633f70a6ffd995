use axiom_model::ComponentError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while mutating or restoring files.
#[derive(Debug, Error)]
pub enum FixerError {
    #[error("failed to back up {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to restore {} from backup: {source}", path.display())]
    Restore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove backup {}: {source}", path.display())]
    Discard {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<FixerError> for ComponentError {
    fn from(err: FixerError) -> Self {
        ComponentError::Failed(err.to_string())
    }
}
