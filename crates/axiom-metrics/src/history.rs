//! One history entry per run.

use axiom_model::Violation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Module bucket for files at the project root.
const ROOT_MODULE: &str = "root";

/// Summary of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub execution_time_ms: f64,
    #[serde(default)]
    pub total_violations: usize,
    #[serde(default)]
    pub by_severity: BTreeMap<String, usize>,
    #[serde(default)]
    pub by_validator: BTreeMap<String, usize>,
    #[serde(default)]
    pub by_module: BTreeMap<String, usize>,
}

impl HistoryEntry {
    /// Summarizes the final violation set of a run.
    pub fn from_violations(violations: &[Violation], total_duration: Duration) -> Self {
        Self::at(Utc::now(), violations, total_duration)
    }

    /// Like [`from_violations`](Self::from_violations) with an explicit
    /// timestamp.
    pub fn at(timestamp: DateTime<Utc>, violations: &[Violation], total_duration: Duration) -> Self {
        let mut by_severity = BTreeMap::new();
        let mut by_validator = BTreeMap::new();
        let mut by_module = BTreeMap::new();

        for v in violations {
            *by_severity.entry(v.severity().as_str().to_string()).or_insert(0) += 1;
            *by_validator.entry(v.validator().to_string()).or_insert(0) += 1;
            *by_module.entry(module_of(v.file_path())).or_insert(0) += 1;
        }

        Self {
            timestamp,
            execution_time_ms: total_duration.as_secs_f64() * 1000.0,
            total_violations: violations.len(),
            by_severity,
            by_validator,
            by_module,
        }
    }

    /// Whether the run had at least one blocking violation.
    pub fn had_blocking(&self) -> bool {
        self.by_severity.get("blocking").copied().unwrap_or(0) > 0
    }
}

/// Module name of a violation path: its first directory component, or
/// `"root"` for a bare file name.
///
/// ```rust
/// use axiom_metrics::module_of;
///
/// assert_eq!(module_of("backend/src/lib.rs"), "backend");
/// assert_eq!(module_of("Cargo.toml"), "root");
/// assert_eq!(module_of("\\web\\index.ts"), "web");
/// ```
pub fn module_of(file_path: &str) -> String {
    let normalized = file_path.replace('\\', "/");
    let trimmed = normalized.trim_start_matches('/');
    match trimmed.split_once('/') {
        Some((first, _)) => first.to_string(),
        None => ROOT_MODULE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axiom_model::Severity;

    #[test]
    fn test_entry_counts() {
        let violations = vec![
            Violation::new("src/a.rs", "m", Severity::Blocking, "naming"),
            Violation::new("src/b.rs", "m", Severity::Warning, "naming"),
            Violation::new(".gitignore", "m", Severity::Warning, "gitignore"),
        ];
        let entry = HistoryEntry::from_violations(&violations, Duration::from_millis(250));

        assert_eq!(entry.total_violations, 3);
        assert_eq!(entry.by_severity["blocking"], 1);
        assert_eq!(entry.by_severity["warning"], 2);
        assert_eq!(entry.by_validator["naming"], 2);
        assert_eq!(entry.by_module["src"], 2);
        assert_eq!(entry.by_module["root"], 1);
        assert!(entry.had_blocking());
        assert!((entry.execution_time_ms - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_global_check_is_root_module() {
        assert_eq!(module_of("Global Check"), "root");
    }
}
