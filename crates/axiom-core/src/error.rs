//! Error types for the AXIOM orchestrator.

use crate::vcs::VcsError;
use axiom_config::ConfigurationError;
use thiserror::Error;

/// Failure that aborts a run.
///
/// Component failures (validators, reporters, fixers) never surface here;
/// they are contained and logged by the orchestrator.
#[derive(Debug, Error)]
pub enum SentinelError {
    /// The configuration is malformed or names an unknown component.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),

    /// The changed-file set could not be obtained.
    #[error("Change discovery failed: {0}")]
    Discovery(#[from] VcsError),

    /// The validator worker pool could not be built.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}
