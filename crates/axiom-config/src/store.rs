//! Loading entry points and the cached configuration store.

use crate::config::AxiomConfig;
use crate::defaults;
use crate::document::{deep_merge, interpolate};
use crate::error::ConfigurationError;
use crate::validate::validate;
use crate::Result;
use serde_yaml::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Conventional configuration file name, relative to the project root.
pub const DEFAULT_CONFIG_PATH: &str = "axiom.config.yaml";

/// Loads `path` merged over the defaults, resolving `${NAME}` from the
/// process environment.
///
/// # Errors
///
/// Returns a [`ConfigurationError`] when the file cannot be read or parsed,
/// or when the merged document fails validation. A missing file is not an
/// error.
pub fn load_config(path: &Path) -> Result<AxiomConfig> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// Like [`load_config`] with an explicit variable lookup.
pub fn load_config_with<F>(path: &Path, lookup: F) -> Result<AxiomConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut document = defaults::document()?;

    match fs::read_to_string(path) {
        Ok(text) => {
            let overlay: Value =
                serde_yaml::from_str(&text).map_err(|e| ConfigurationError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            match overlay {
                Value::Null => debug!("Configuration file {} is empty", path.display()),
                Value::Mapping(_) => deep_merge(&mut document, overlay),
                _ => {
                    return Err(ConfigurationError::Parse {
                        path: path.to_path_buf(),
                        message: "top level must be a mapping".to_string(),
                    })
                }
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(
                "Configuration file {} not found, using built-in defaults",
                path.display()
            );
        }
        Err(source) => {
            return Err(ConfigurationError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    finish(interpolate(document, &lookup))
}

/// The validated built-in defaults.
pub fn load_defaults() -> Result<AxiomConfig> {
    finish(defaults::document()?)
}

fn finish(document: Value) -> Result<AxiomConfig> {
    validate(&document)?;
    AxiomConfig::from_document(document)
}

struct Cached {
    path: PathBuf,
    config: Arc<AxiomConfig>,
}

/// Caching configuration loader.
///
/// The first [`load`](ConfigStore::load) reads and validates; later calls
/// for the same path return the cached instance until
/// [`reset`](ConfigStore::reset). Loading a different path replaces the
/// cache.
///
/// # Example
///
/// ```rust,no_run
/// use axiom_config::ConfigStore;
/// use std::path::Path;
///
/// let store = ConfigStore::new();
/// let config = store.load(Path::new("axiom.config.yaml")).unwrap();
/// println!("threshold: {}", config.blast_radius().threshold);
/// ```
pub struct ConfigStore {
    cache: RwLock<Option<Cached>>,
}

impl ConfigStore {
    /// Creates an empty store.
    pub const fn new() -> Self {
        Self {
            cache: RwLock::new(None),
        }
    }

    /// The process-wide store.
    pub fn global() -> &'static ConfigStore {
        static GLOBAL: ConfigStore = ConfigStore::new();
        &GLOBAL
    }

    /// Returns the cached configuration for `path`, loading it if needed.
    ///
    /// # Errors
    ///
    /// Propagates [`load_config`] errors; nothing is cached on failure.
    pub fn load(&self, path: &Path) -> Result<Arc<AxiomConfig>> {
        if let Some(config) = self.cached_for(path) {
            return Ok(config);
        }

        let config = Arc::new(load_config(path)?);
        info!("Loaded configuration from {}", path.display());

        let mut guard = match self.cache.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(Cached {
            path: path.to_path_buf(),
            config: Arc::clone(&config),
        });
        Ok(config)
    }

    /// The currently cached configuration, if any.
    pub fn cached(&self) -> Option<Arc<AxiomConfig>> {
        let guard = match self.cache.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.as_ref().map(|c| Arc::clone(&c.config))
    }

    /// Drops the cached configuration.
    pub fn reset(&self) {
        let mut guard = match self.cache.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
        debug!("Configuration cache reset");
    }

    fn cached_for(&self, path: &Path) -> Option<Arc<AxiomConfig>> {
        let guard = match self.cache.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .as_ref()
            .filter(|c| c.path == path)
            .map(|c| Arc::clone(&c.config))
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
