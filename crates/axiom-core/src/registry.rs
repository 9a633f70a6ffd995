//! Name-to-factory registry for pluggable components.
//!
//! Configuration refers to validators, reporters and fixers by name. The
//! registry maps each name to a factory that builds the component from its
//! settings block. Enabling a name with no registered factory is a
//! configuration error, never a silent skip.

use crate::reporters::{ConsoleReporter, LogFileReporter};
use crate::validators::{BlastRadiusValidator, CommandValidator, GitignoreValidator};
use axiom_config::{AxiomConfig, ComponentSettings, ConfigurationError};
use axiom_fixer::SimpleFixer;
use axiom_metrics::MetricsReporter;
use axiom_model::{Fixer, Reporter, Validator};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Inputs handed to a validator or reporter factory.
pub struct BuildContext<'a> {
    /// Project root; relative paths in settings resolve against it.
    pub root: &'a Path,
    pub config: &'a AxiomConfig,
    /// Key the component is configured under.
    pub key: &'a str,
    pub settings: &'a ComponentSettings,
}

impl BuildContext<'_> {
    /// Dotted config path of this component under `section`.
    pub fn prefix(&self, section: &str) -> String {
        format!("{}.{}", section, self.key)
    }

    /// Resolves `path` against the project root unless it is absolute.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Inputs handed to a fixer factory.
pub struct FixerContext<'a> {
    pub root: &'a Path,
    pub config: &'a AxiomConfig,
}

pub type ValidatorFactory =
    Box<dyn Fn(&BuildContext<'_>) -> Result<Box<dyn Validator>, ConfigurationError> + Send + Sync>;
pub type ReporterFactory =
    Box<dyn Fn(&BuildContext<'_>) -> Result<Box<dyn Reporter>, ConfigurationError> + Send + Sync>;
pub type FixerFactory =
    Box<dyn Fn(&FixerContext<'_>) -> Result<Box<dyn Fixer>, ConfigurationError> + Send + Sync>;

/// Registered component factories.
#[derive(Default)]
pub struct ComponentRegistry {
    validators: HashMap<String, ValidatorFactory>,
    reporters: HashMap<String, ReporterFactory>,
    fixers: HashMap<String, FixerFactory>,
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in component.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register_validator(BlastRadiusValidator::FACTORY, |ctx| {
            Ok(Box::new(BlastRadiusValidator::from_context(ctx)))
        });
        registry.register_validator(GitignoreValidator::FACTORY, |ctx| {
            Ok(Box::new(GitignoreValidator::from_context(ctx)?))
        });
        registry.register_validator(CommandValidator::FACTORY, |ctx| {
            Ok(Box::new(CommandValidator::from_context(ctx)?))
        });

        registry.register_reporter(ConsoleReporter::FACTORY, |ctx| {
            Ok(Box::new(ConsoleReporter::from_context(ctx)?))
        });
        registry.register_reporter(LogFileReporter::FACTORY, |ctx| {
            Ok(Box::new(LogFileReporter::from_context(ctx)?))
        });
        registry.register_reporter(MetricsReporter::NAME, |ctx| {
            let path = ctx
                .settings
                .option::<String>(&ctx.prefix("reporters"), "path")?
                .unwrap_or_else(|| ".axiom/metrics.json".to_string());
            Ok(Box::new(MetricsReporter::new(ctx.resolve(&path))))
        });

        registry.register_fixer(SimpleFixer::NAME, |ctx| Ok(Box::new(SimpleFixer::new(ctx.root))));

        registry
    }

    pub fn register_validator<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&BuildContext<'_>) -> Result<Box<dyn Validator>, ConfigurationError>
            + Send
            + Sync
            + 'static,
    {
        self.validators.insert(name.into(), Box::new(factory));
    }

    pub fn register_reporter<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&BuildContext<'_>) -> Result<Box<dyn Reporter>, ConfigurationError>
            + Send
            + Sync
            + 'static,
    {
        self.reporters.insert(name.into(), Box::new(factory));
    }

    pub fn register_fixer<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&FixerContext<'_>) -> Result<Box<dyn Fixer>, ConfigurationError>
            + Send
            + Sync
            + 'static,
    {
        self.fixers.insert(name.into(), Box::new(factory));
    }

    /// Builds every enabled validator, in configuration key order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownComponent`] for an enabled
    /// name with no factory, or the factory's own error.
    pub fn build_validators(
        &self,
        root: &Path,
        config: &AxiomConfig,
    ) -> Result<Vec<Box<dyn Validator>>, ConfigurationError> {
        config
            .enabled_validators()
            .map(|(key, settings)| {
                let name = settings.factory(key);
                let factory = self.validators.get(name).ok_or_else(|| {
                    ConfigurationError::UnknownComponent {
                        kind: "validator",
                        name: name.to_string(),
                    }
                })?;
                debug!("Building validator '{}' ({})", key, name);
                factory(&BuildContext {
                    root,
                    config,
                    key,
                    settings,
                })
            })
            .collect()
    }

    /// Builds every enabled reporter, in configuration key order.
    ///
    /// # Errors
    ///
    /// Same as [`build_validators`](Self::build_validators).
    pub fn build_reporters(
        &self,
        root: &Path,
        config: &AxiomConfig,
    ) -> Result<Vec<Box<dyn Reporter>>, ConfigurationError> {
        config
            .enabled_reporters()
            .map(|(key, settings)| {
                let name = settings.factory(key);
                let factory = self.reporters.get(name).ok_or_else(|| {
                    ConfigurationError::UnknownComponent {
                        kind: "reporter",
                        name: name.to_string(),
                    }
                })?;
                debug!("Building reporter '{}' ({})", key, name);
                factory(&BuildContext {
                    root,
                    config,
                    key,
                    settings,
                })
            })
            .collect()
    }

    /// Builds the fixers listed under `auto_fix.fixers`, or none when
    /// auto-fix is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownComponent`] for an unknown name.
    pub fn build_fixers(
        &self,
        root: &Path,
        config: &AxiomConfig,
    ) -> Result<Vec<Box<dyn Fixer>>, ConfigurationError> {
        if !config.auto_fix.enabled {
            return Ok(Vec::new());
        }
        let ctx = FixerContext { root, config };
        config
            .auto_fix
            .fixers
            .iter()
            .map(|name| {
                let factory =
                    self.fixers
                        .get(name)
                        .ok_or_else(|| ConfigurationError::UnknownComponent {
                            kind: "fixer",
                            name: name.clone(),
                        })?;
                factory(&ctx)
            })
            .collect()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut validators: Vec<_> = self.validators.keys().collect();
        let mut reporters: Vec<_> = self.reporters.keys().collect();
        let mut fixers: Vec<_> = self.fixers.keys().collect();
        validators.sort();
        reporters.sort();
        fixers.sort();
        f.debug_struct("ComponentRegistry")
            .field("validators", &validators)
            .field("reporters", &reporters)
            .field("fixers", &fixers)
            .finish()
    }
}
