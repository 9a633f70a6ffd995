//! Error type shared by all pluggable components.

use thiserror::Error;

/// Failure inside a validator, reporter or fixer.
///
/// The orchestrator contains these at the component boundary: they are
/// logged and never abort the pipeline on their own.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An external analysis process could not be run or misbehaved.
    #[error("external process '{program}' failed: {reason}")]
    ExternalProcess {
        /// Program that was invoked.
        program: String,
        /// What went wrong.
        reason: String,
    },

    /// An external process exceeded its time budget and was killed.
    #[error("external process '{program}' timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },

    /// Document (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other component-specific failure.
    #[error("{0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_process_display() {
        let err = ComponentError::ExternalProcess {
            program: "semgrep".to_string(),
            reason: "not found".to_string(),
        };
        assert!(err.to_string().contains("semgrep"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_timeout_display() {
        let err = ComponentError::Timeout {
            program: "mvnw".to_string(),
            seconds: 120,
        };
        assert_eq!(err.to_string(), "external process 'mvnw' timed out after 120s");
    }
}
