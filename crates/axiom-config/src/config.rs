//! Typed configuration model.

use crate::error::ConfigurationError;
use axiom_model::{Severity, ZoneCategory};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Upper bound for the default validator pool size.
const DEFAULT_MAX_WORKERS_CAP: usize = 8;

/// The validated policy document.
///
/// Obtained from [`crate::load_config`] or [`crate::ConfigStore::load`];
/// every instance has passed validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxiomConfig {
    #[serde(default)]
    pub protection_zones: BTreeMap<ZoneCategory, Vec<ZoneEntry>>,
    #[serde(default)]
    pub validators: BTreeMap<String, ComponentSettings>,
    #[serde(default)]
    pub reporters: BTreeMap<String, ComponentSettings>,
    #[serde(default)]
    pub auto_fix: AutoFixSettings,
    #[serde(default)]
    pub overrides: OverrideSettings,
    #[serde(default)]
    pub execution: ExecutionSettings,
}

/// One path pattern under a protection-zone category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneEntry {
    pub path: String,
    pub max_files: u64,
    /// Overflow severity; red zones ignore this and always block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// Settings block for one validator or reporter.
///
/// `enabled` and `kind` are understood by the orchestrator; everything else
/// is passed through to the component factory as `options`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSettings {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Factory to instantiate. Defaults to the settings key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub options: BTreeMap<String, serde_yaml::Value>,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for ComponentSettings {
    fn default() -> Self {
        Self {
            enabled: enabled_by_default(),
            kind: None,
            options: BTreeMap::new(),
        }
    }
}

impl ComponentSettings {
    /// Factory name for a component registered under `key`.
    pub fn factory<'a>(&'a self, key: &'a str) -> &'a str {
        self.kind.as_deref().unwrap_or(key)
    }

    /// Reads an option, returning `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Invalid`] naming `field_prefix.key`
    /// when the value has the wrong type.
    pub fn option<T: DeserializeOwned>(
        &self,
        field_prefix: &str,
        key: &str,
    ) -> Result<Option<T>, ConfigurationError> {
        match self.options.get(key) {
            None | Some(serde_yaml::Value::Null) => Ok(None),
            Some(value) => serde_yaml::from_value(value.clone())
                .map(Some)
                .map_err(|e| ConfigurationError::invalid(format!("{field_prefix}.{key}"), e.to_string())),
        }
    }

    /// Reads a string option.
    pub fn str_option(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(serde_yaml::Value::as_str)
    }
}

/// How the global threshold behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Exceeding the threshold blocks the run.
    #[default]
    Blocking,
    /// Exceeding the threshold only warns.
    Warning,
    /// Global overflow warns while zone limits keep their own severities.
    Hybrid,
}

impl Strictness {
    /// Severity of a global-threshold violation.
    pub fn global_severity(&self) -> Severity {
        match self {
            Strictness::Blocking => Severity::Blocking,
            Strictness::Warning | Strictness::Hybrid => Severity::Warning,
        }
    }
}

impl FromStr for Strictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blocking" => Ok(Strictness::Blocking),
            "warning" => Ok(Strictness::Warning),
            "hybrid" => Ok(Strictness::Hybrid),
            other => Err(format!(
                "'{other}' is not one of blocking, warning, hybrid"
            )),
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strictness::Blocking => "blocking",
            Strictness::Warning => "warning",
            Strictness::Hybrid => "hybrid",
        })
    }
}

/// Which limit applies to a zone category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneLimitMode {
    /// Each entry is counted against its own `max_files`.
    #[default]
    PerZone,
    /// All files of a category are pooled and checked against the first
    /// entry's `max_files`.
    Category,
}

impl FromStr for ZoneLimitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per_zone" => Ok(ZoneLimitMode::PerZone),
            "category" => Ok(ZoneLimitMode::Category),
            other => Err(format!("'{other}' is not one of per_zone, category")),
        }
    }
}

/// Resolved settings for the blast-radius validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlastRadiusSettings {
    pub enabled: bool,
    pub threshold: u64,
    pub strictness: Strictness,
    pub zone_limits: ZoneLimitMode,
}

impl Default for BlastRadiusSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 10,
            strictness: Strictness::Blocking,
            zone_limits: ZoneLimitMode::PerZone,
        }
    }
}

/// The `auto_fix` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoFixSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Fixer factories run in order.
    #[serde(default = "default_fixers")]
    pub fixers: Vec<String>,
}

fn default_fixers() -> Vec<String> {
    vec!["simple".to_string()]
}

impl Default for AutoFixSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            fixers: default_fixers(),
        }
    }
}

/// The `overrides` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideSettings {
    /// Keywords honored in commit messages. Empty enables every keyword.
    #[serde(default)]
    pub enabled_keywords: Vec<String>,
}

/// The `execution` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// Validator pool size. `None` means available parallelism, capped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
    /// Per-process timeout for external analysis commands.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

fn default_command_timeout() -> u64 {
    120
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            max_workers: None,
            command_timeout_secs: default_command_timeout(),
        }
    }
}

impl ExecutionSettings {
    /// Effective pool size, never zero.
    pub fn worker_count(&self) -> usize {
        self.max_workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .min(DEFAULT_MAX_WORKERS_CAP)
        })
        .max(1)
    }
}

impl AxiomConfig {
    /// Maps a validated document onto the typed model.
    pub(crate) fn from_document(doc: serde_yaml::Value) -> Result<Self, ConfigurationError> {
        serde_yaml::from_value(doc).map_err(|e| ConfigurationError::Schema(e.to_string()))
    }

    /// Zone entries of one category, in declaration order.
    pub fn zones(&self, category: ZoneCategory) -> &[ZoneEntry] {
        self.protection_zones
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Enabled validators as `(key, settings)`.
    pub fn enabled_validators(&self) -> impl Iterator<Item = (&str, &ComponentSettings)> + '_ {
        self.validators
            .iter()
            .filter(|(_, settings)| settings.enabled)
            .map(|(key, settings)| (key.as_str(), settings))
    }

    /// Enabled reporters as `(key, settings)`.
    pub fn enabled_reporters(&self) -> impl Iterator<Item = (&str, &ComponentSettings)> + '_ {
        self.reporters
            .iter()
            .filter(|(_, settings)| settings.enabled)
            .map(|(key, settings)| (key.as_str(), settings))
    }

    /// Blast-radius settings with defaults for anything unset.
    ///
    /// A disabled or absent `blast_radius` block yields `enabled: false`.
    pub fn blast_radius(&self) -> BlastRadiusSettings {
        let defaults = BlastRadiusSettings::default();
        let Some(settings) = self.validators.get("blast_radius") else {
            return BlastRadiusSettings {
                enabled: false,
                ..defaults
            };
        };

        let threshold = settings
            .options
            .get("threshold")
            .and_then(serde_yaml::Value::as_u64)
            .unwrap_or(defaults.threshold);
        let strictness = settings
            .str_option("strictness")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.strictness);
        let zone_limits = settings
            .str_option("zone_limits")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.zone_limits);

        BlastRadiusSettings {
            enabled: settings.enabled,
            threshold,
            strictness,
            zone_limits,
        }
    }
}
