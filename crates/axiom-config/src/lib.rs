//! # AXIOM Configuration Store
//!
//! Loads the policy document that drives a governance run.
//!
//! ## Load Pipeline
//!
//! ```text
//! built-in defaults ──┐
//!                     ├─▶ deep merge ─▶ ${NAME} interpolation ─▶ validation ─▶ AxiomConfig
//! axiom.config.yaml ──┘
//! ```
//!
//! 1. Start from the embedded default document ([`DEFAULT_CONFIG_YAML`]).
//! 2. If the file exists, deep-merge it over the defaults: nested maps merge
//!    key by key, scalars and lists replace wholesale.
//! 3. Replace `${NAME}` tokens in every string with the environment value,
//!    leaving unset tokens verbatim.
//! 4. Validate structure and policy rules, failing fast with a
//!    [`ConfigurationError`] that names the offending field.
//!
//! A missing file is not an error: a warning is logged and the defaults are
//! validated and used as-is.
//!
//! ## Caching
//!
//! [`ConfigStore`] caches the loaded configuration behind a lock. The
//! orchestrator receives the store explicitly; [`ConfigStore::global`] is
//! the process-wide instance used by the CLI. [`ConfigStore::reset`]
//! invalidates the cache for tests and hot reload.

mod config;
mod defaults;
mod document;
mod error;
mod store;
mod validate;

pub use config::{
    AutoFixSettings, AxiomConfig, BlastRadiusSettings, ComponentSettings, ExecutionSettings,
    OverrideSettings, Strictness, ZoneEntry, ZoneLimitMode,
};
pub use defaults::DEFAULT_CONFIG_YAML;
pub use document::{deep_merge, interpolate};
pub use error::ConfigurationError;
pub use store::{load_config, load_config_with, load_defaults, ConfigStore, DEFAULT_CONFIG_PATH};

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigurationError>;
