use std::path::PathBuf;
use thiserror::Error;

/// Failure persisting the metrics document.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metrics I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metrics serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MetricsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
