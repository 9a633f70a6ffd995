//! Configuration error type.

use std::path::PathBuf;
use thiserror::Error;

/// A configuration problem.
///
/// Everything except [`ConfigurationError::Io`] is fatal to a run: the
/// document is malformed or violates policy and must be fixed by a human.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The file exists but could not be read.
    #[error("failed to read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML, or its top level is not a mapping.
    #[error("failed to parse configuration file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// A field has the wrong shape or value.
    #[error("invalid configuration at '{field}': {reason}")]
    Invalid { field: String, reason: String },

    /// Two zone paths are equal or one is a directory prefix of the other.
    #[error("overlapping protection zones: '{first}' overlaps with '{second}'")]
    OverlappingZones { first: String, second: String },

    /// Every reporter is disabled.
    #[error("at least one reporter must be enabled")]
    NoReporterEnabled,

    /// The validated document could not be mapped onto the typed model.
    #[error("configuration does not match schema: {0}")]
    Schema(String),

    /// An enabled component names a factory nobody registered.
    #[error("unknown {kind} '{name}' in configuration")]
    UnknownComponent { kind: &'static str, name: String },
}

impl ConfigurationError {
    /// Shorthand for [`ConfigurationError::Invalid`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the run must abort.
    ///
    /// Only a failure of the load mechanism itself (I/O) lets the caller
    /// fall back to built-in defaults.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }
}
