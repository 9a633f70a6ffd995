//! Structural and policy validation of the merged document.
//!
//! Runs on the raw YAML tree so every error can name the exact field path
//! (`protection_zones.red[0].max_files`) before typed deserialization.

use crate::config::{Strictness, ZoneLimitMode};
use crate::error::ConfigurationError;
use axiom_model::{Severity, ZoneCategory};
use serde_yaml::{Mapping, Value};
use std::str::FromStr;

type Result<T> = std::result::Result<T, ConfigurationError>;

/// Validates the merged, interpolated document.
pub(crate) fn validate(doc: &Value) -> Result<()> {
    let root = doc
        .as_mapping()
        .ok_or_else(|| ConfigurationError::invalid("<root>", "document must be a mapping"))?;

    validate_zones(root)?;
    validate_validators(root)?;
    validate_reporters(root)?;
    validate_auto_fix(root)?;
    validate_overrides(root)?;
    validate_execution(root)?;
    Ok(())
}

fn section<'a>(root: &'a Mapping, key: &str) -> Result<Option<&'a Mapping>> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Mapping(map)) => Ok(Some(map)),
        Some(_) => Err(ConfigurationError::invalid(key, "must be a mapping")),
    }
}

fn key_name(key: &Value, field: &str) -> Result<String> {
    key.as_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigurationError::invalid(field, "keys must be strings"))
}

fn non_negative_int(value: &Value, field: &str) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| ConfigurationError::invalid(field, "must be a non-negative integer"))
}

fn is_enabled(settings: &Value) -> bool {
    settings
        .get("enabled")
        .and_then(Value::as_bool)
        .unwrap_or(true)
}

fn normalize_zone_path(path: &str) -> &str {
    path.trim_end_matches('/')
}

fn validate_zones(root: &Mapping) -> Result<()> {
    let Some(zones) = section(root, "protection_zones")? else {
        return Ok(());
    };

    let mut declared: Vec<String> = Vec::new();

    for (key, entries) in zones {
        let category = key_name(key, "protection_zones")?;
        let field = format!("protection_zones.{category}");
        ZoneCategory::from_str(&category)
            .map_err(|_| ConfigurationError::invalid(&field, "category must be red, yellow or green"))?;

        let list = match entries {
            Value::Null => continue,
            Value::Sequence(list) => list,
            _ => return Err(ConfigurationError::invalid(&field, "must be a list of zones")),
        };

        for (index, entry) in list.iter().enumerate() {
            let entry_field = format!("{field}[{index}]");
            if !entry.is_mapping() {
                return Err(ConfigurationError::invalid(&entry_field, "zone must be a mapping"));
            }

            let path = entry
                .get("path")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ConfigurationError::invalid(format!("{entry_field}.path"), "must be a string")
                })?;
            if normalize_zone_path(path).is_empty() {
                return Err(ConfigurationError::invalid(
                    format!("{entry_field}.path"),
                    "must not be empty",
                ));
            }
            if path.starts_with('/') || path.starts_with('\\') {
                return Err(ConfigurationError::invalid(
                    format!("{entry_field}.path"),
                    "must be relative to the project root",
                ));
            }
            if path.split(['/', '\\']).any(|segment| segment == "." || segment == "..") {
                return Err(ConfigurationError::invalid(
                    format!("{entry_field}.path"),
                    "must not contain '.' or '..' segments",
                ));
            }

            let max_files = entry.get("max_files").ok_or_else(|| {
                ConfigurationError::invalid(format!("{entry_field}.max_files"), "is required")
            })?;
            non_negative_int(max_files, &format!("{entry_field}.max_files"))?;

            if let Some(severity) = entry.get("severity") {
                let text = severity.as_str().unwrap_or_default();
                Severity::from_str(text).map_err(|_| {
                    ConfigurationError::invalid(
                        format!("{entry_field}.severity"),
                        "must be blocking, warning or info",
                    )
                })?;
            }

            declared.push(normalize_zone_path(path).to_string());
        }
    }

    check_overlaps(&declared)
}

/// Rejects equal paths and directory-prefix nesting, in declaration order.
fn check_overlaps(paths: &[String]) -> Result<()> {
    for (i, first) in paths.iter().enumerate() {
        for second in &paths[i + 1..] {
            let nested = |outer: &str, inner: &str| inner.starts_with(&format!("{outer}/"));
            if first == second || nested(first, second) || nested(second, first) {
                return Err(ConfigurationError::OverlappingZones {
                    first: first.clone(),
                    second: second.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_component_table(root: &Mapping, kind: &str) -> Result<Vec<(String, bool)>> {
    let Some(table) = section(root, kind)? else {
        return Ok(Vec::new());
    };

    let mut names = Vec::with_capacity(table.len());
    for (key, settings) in table {
        let name = key_name(key, kind)?;
        let field = format!("{kind}.{name}");
        match settings {
            Value::Mapping(map) => {
                if let Some(enabled) = map.get("enabled") {
                    if !enabled.is_bool() {
                        return Err(ConfigurationError::invalid(
                            format!("{field}.enabled"),
                            "must be a boolean",
                        ));
                    }
                }
                if let Some(kind_value) = map.get("kind") {
                    if !kind_value.is_string() {
                        return Err(ConfigurationError::invalid(
                            format!("{field}.kind"),
                            "must be a string",
                        ));
                    }
                }
            }
            _ => return Err(ConfigurationError::invalid(&field, "must be a mapping")),
        }
        names.push((name, is_enabled(settings)));
    }
    Ok(names)
}

fn validate_validators(root: &Mapping) -> Result<()> {
    validate_component_table(root, "validators")?;

    let Some(validators) = section(root, "validators")? else {
        return Ok(());
    };
    let Some(blast) = validators.get("blast_radius") else {
        return Ok(());
    };
    if !is_enabled(blast) {
        return Ok(());
    }

    let field = "validators.blast_radius";
    let threshold = blast
        .get("threshold")
        .ok_or_else(|| ConfigurationError::invalid(format!("{field}.threshold"), "is required"))?;
    non_negative_int(threshold, &format!("{field}.threshold"))?;

    let strictness = blast.get("strictness").and_then(Value::as_str).ok_or_else(|| {
        ConfigurationError::invalid(format!("{field}.strictness"), "is required")
    })?;
    Strictness::from_str(strictness).map_err(|reason| {
        ConfigurationError::invalid(format!("{field}.strictness"), reason)
    })?;

    if let Some(mode) = blast.get("zone_limits") {
        let text = mode.as_str().unwrap_or_default();
        ZoneLimitMode::from_str(text).map_err(|reason| {
            ConfigurationError::invalid(format!("{field}.zone_limits"), reason)
        })?;
    }
    Ok(())
}

fn validate_reporters(root: &Mapping) -> Result<()> {
    let reporters = validate_component_table(root, "reporters")?;
    if !reporters.iter().any(|(_, enabled)| *enabled) {
        return Err(ConfigurationError::NoReporterEnabled);
    }
    Ok(())
}

fn validate_auto_fix(root: &Mapping) -> Result<()> {
    let Some(auto_fix) = section(root, "auto_fix")? else {
        return Ok(());
    };
    if let Some(enabled) = auto_fix.get("enabled") {
        if !enabled.is_bool() {
            return Err(ConfigurationError::invalid("auto_fix.enabled", "must be a boolean"));
        }
    }
    if let Some(fixers) = auto_fix.get("fixers") {
        let valid = fixers
            .as_sequence()
            .is_some_and(|list| list.iter().all(Value::is_string));
        if !valid {
            return Err(ConfigurationError::invalid(
                "auto_fix.fixers",
                "must be a list of fixer names",
            ));
        }
    }
    Ok(())
}

fn validate_overrides(root: &Mapping) -> Result<()> {
    let Some(overrides) = section(root, "overrides")? else {
        return Ok(());
    };
    match overrides.get("enabled_keywords") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Sequence(list)) if list.iter().all(Value::is_string) => Ok(()),
        Some(_) => Err(ConfigurationError::invalid(
            "overrides.enabled_keywords",
            "must be a list of keywords",
        )),
    }
}

fn validate_execution(root: &Mapping) -> Result<()> {
    let Some(execution) = section(root, "execution")? else {
        return Ok(());
    };
    if let Some(workers) = execution.get("max_workers") {
        if !workers.is_null() {
            let count = non_negative_int(workers, "execution.max_workers")?;
            if count == 0 {
                return Err(ConfigurationError::invalid(
                    "execution.max_workers",
                    "must be at least 1",
                ));
            }
        }
    }
    if let Some(timeout) = execution.get("command_timeout_secs") {
        non_negative_int(timeout, "execution.command_timeout_secs")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;
    use crate::document::deep_merge;

    fn with_overlay(text: &str) -> Value {
        let mut doc = defaults::document().unwrap();
        deep_merge(&mut doc, serde_yaml::from_str(text).unwrap());
        doc
    }

    fn invalid_field(result: Result<()>) -> String {
        match result {
            Err(ConfigurationError::Invalid { field, .. }) => field,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_zone_paths_overlap() {
        let doc = with_overlay(
            "protection_zones:\n  red: [{path: domain, max_files: 1}]\n  yellow: [{path: domain/core, max_files: 3}]\n  green: []",
        );
        match validate(&doc) {
            Err(ConfigurationError::OverlappingZones { first, second }) => {
                assert_eq!(first, "domain");
                assert_eq!(second, "domain/core");
            }
            other => panic!("expected overlap, got {other:?}"),
        }
    }

    #[test]
    fn test_sibling_prefix_is_not_overlap() {
        let doc = with_overlay(
            "protection_zones:\n  red: [{path: domain, max_files: 1}]\n  yellow: [{path: domainx, max_files: 3}]\n  green: []",
        );
        validate(&doc).unwrap();
    }

    #[test]
    fn test_trailing_slash_duplicate_overlaps() {
        let doc = with_overlay(
            "protection_zones:\n  red: [{path: core/, max_files: 1}]\n  yellow: [{path: core, max_files: 3}]\n  green: []",
        );
        assert!(matches!(
            validate(&doc),
            Err(ConfigurationError::OverlappingZones { .. })
        ));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let doc = with_overlay("protection_zones:\n  purple: [{path: x, max_files: 1}]");
        assert_eq!(invalid_field(validate(&doc)), "protection_zones.purple");
    }

    #[test]
    fn test_negative_max_files_names_field() {
        let doc = with_overlay("protection_zones:\n  red: [{path: domain/core, max_files: -1}]");
        assert_eq!(invalid_field(validate(&doc)), "protection_zones.red[0].max_files");
    }

    #[test]
    fn test_absolute_zone_path_rejected() {
        let doc = with_overlay("protection_zones:\n  red: [{path: /etc, max_files: 1}]");
        assert_eq!(invalid_field(validate(&doc)), "protection_zones.red[0].path");
    }

    #[test]
    fn test_dot_segments_rejected() {
        for path in [".", "./domain", "domain/../core", "..\\shared"] {
            let doc = with_overlay(&format!(
                "protection_zones:\n  red: [{{path: '{path}', max_files: 1}}]"
            ));
            assert_eq!(invalid_field(validate(&doc)), "protection_zones.red[0].path", "{path}");
        }
    }

    #[test]
    fn test_dotted_names_accepted() {
        let doc = with_overlay("protection_zones:\n  red: [{path: src/.config, max_files: 1}]");
        validate(&doc).unwrap();
    }

    #[test]
    fn test_bad_strictness_rejected() {
        let doc = with_overlay("validators:\n  blast_radius: {strictness: lenient}");
        assert_eq!(invalid_field(validate(&doc)), "validators.blast_radius.strictness");
    }

    #[test]
    fn test_disabled_blast_radius_skips_checks() {
        let doc = with_overlay("validators:\n  blast_radius: {enabled: false, strictness: lenient}");
        validate(&doc).unwrap();
    }

    #[test]
    fn test_all_reporters_disabled() {
        let doc = with_overlay(
            "reporters:\n  console: {enabled: false}\n  log_file: {enabled: false}\n  metrics: {enabled: false}",
        );
        assert!(matches!(validate(&doc), Err(ConfigurationError::NoReporterEnabled)));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let doc = with_overlay("execution: {max_workers: 0}");
        assert_eq!(invalid_field(validate(&doc)), "execution.max_workers");
    }
}
