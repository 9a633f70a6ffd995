//! Built-in default policy document.

use crate::error::ConfigurationError;
use serde_yaml::Value;

/// The document every configuration file is merged over.
pub const DEFAULT_CONFIG_YAML: &str = r#"
protection_zones:
  red:
    - path: domain/core
      max_files: 1
    - path: domain/model
      max_files: 1
  yellow:
    - path: infrastructure/persistence
      max_files: 3
  green:
    - path: application
      max_files: 10
    - path: infrastructure/web
      max_files: 10
    - path: tests
      max_files: 10

validators:
  blast_radius:
    enabled: true
    threshold: 10
    strictness: blocking
    zone_limits: per_zone

reporters:
  console:
    enabled: true
    color: true
  log_file:
    enabled: true
    path: .axiom/validation.log
  metrics:
    enabled: true
    path: .axiom/metrics.json

auto_fix:
  enabled: false
  fixers:
    - simple

overrides:
  enabled_keywords: []

execution:
  command_timeout_secs: 120
"#;

/// Parses the default document.
pub(crate) fn document() -> Result<Value, ConfigurationError> {
    serde_yaml::from_str(DEFAULT_CONFIG_YAML)
        .map_err(|e| ConfigurationError::Schema(format!("built-in defaults are malformed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;

    #[test]
    fn test_defaults_parse_and_validate() {
        let doc = document().unwrap();
        assert!(doc.is_mapping());
        validate(&doc).unwrap();
    }
}
