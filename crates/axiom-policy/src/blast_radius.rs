//! Global threshold and zone-limit checks.

use crate::zones::ZoneSet;
use axiom_config::{AxiomConfig, BlastRadiusSettings, ZoneLimitMode};
use axiom_model::{PolicyScope, Severity, Violation, ZoneCategory};
use tracing::debug;

/// Pseudo file path carried by the global-threshold violation.
pub const GLOBAL_CHECK_PATH: &str = "Global Check";

/// Number of offending files quoted in a zone message.
const QUOTED_FILES: usize = 3;

/// One policy overflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyViolation {
    pub scope: PolicyScope,
    pub severity: Severity,
    pub message: String,
    /// Files counted against the limit; empty for the global check.
    pub files: Vec<String>,
    pub actual: usize,
    pub limit: u64,
}

impl PolicyViolation {
    /// File the violation is attributed to: the first offending file, or
    /// [`GLOBAL_CHECK_PATH`].
    pub fn file_path(&self) -> &str {
        self.files
            .first()
            .map(String::as_str)
            .unwrap_or(GLOBAL_CHECK_PATH)
    }

    /// Converts into a scoped [`Violation`] attributed to `validator`.
    pub fn into_violation(self, validator: &str) -> Violation {
        let mut violation = Violation::new(self.file_path(), &self.message, self.severity, validator)
            .with_scope(self.scope);
        if self.files.len() > QUOTED_FILES {
            violation = violation.with_detail(format!("All files: {}", self.files.join(", ")));
        }
        violation.with_suggestion(match self.scope {
            PolicyScope::Global => "Split the change into smaller commits",
            PolicyScope::Zone(_) => "Touch fewer files in this protection zone per commit",
        })
    }
}

/// Enforces the global file-count threshold and per-zone limits.
///
/// # Example
///
/// ```rust
/// use axiom_config::load_defaults;
/// use axiom_policy::PolicyEngine;
///
/// let engine = PolicyEngine::from_config(&load_defaults().unwrap());
/// let files: Vec<String> = (0..12).map(|i| format!("src/f{i}.rs")).collect();
///
/// let findings = engine.check_limits(&files);
/// assert_eq!(findings.len(), 1);
/// assert!(findings[0].message.contains("12 > 10"));
/// ```
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    settings: BlastRadiusSettings,
    zones: ZoneSet,
}

impl PolicyEngine {
    pub fn new(settings: BlastRadiusSettings, zones: ZoneSet) -> Self {
        Self { settings, zones }
    }

    pub fn from_config(config: &AxiomConfig) -> Self {
        Self::new(config.blast_radius(), ZoneSet::from_config(config))
    }

    pub fn settings(&self) -> &BlastRadiusSettings {
        &self.settings
    }

    /// Runs both checks over `files`.
    ///
    /// The global finding, if any, comes first, followed by zone findings in
    /// red, yellow, green order. A disabled engine finds nothing.
    pub fn check_limits(&self, files: &[String]) -> Vec<PolicyViolation> {
        let mut findings = Vec::new();
        if !self.settings.enabled {
            debug!("Blast radius disabled, skipping {} files", files.len());
            return findings;
        }

        if let Some(global) = self.check_global(files) {
            findings.push(global);
        }
        findings.extend(self.check_zones(files));

        debug!(
            "Policy check over {} files produced {} findings",
            files.len(),
            findings.len()
        );
        findings
    }

    fn check_global(&self, files: &[String]) -> Option<PolicyViolation> {
        let threshold = self.settings.threshold;
        if files.len() as u64 <= threshold {
            return None;
        }
        Some(PolicyViolation {
            scope: PolicyScope::Global,
            severity: self.settings.strictness.global_severity(),
            message: format!(
                "BLAST RADIUS: Too many files changed ({} > {threshold}). Break this change down.",
                files.len()
            ),
            files: Vec::new(),
            actual: files.len(),
            limit: threshold,
        })
    }

    fn check_zones(&self, files: &[String]) -> Vec<PolicyViolation> {
        let mut findings = Vec::new();

        for category in ZoneCategory::PRECEDENCE {
            let entries = self.zones.entries(category);
            if entries.is_empty() {
                continue;
            }

            // Matched files per entry index
            let mut buckets: Vec<Vec<String>> = vec![Vec::new(); entries.len()];
            for file in files {
                if let Some(m) = self.zones.classify(file) {
                    if m.category == category {
                        buckets[m.entry].push(file.clone());
                    }
                }
            }

            match self.settings.zone_limits {
                ZoneLimitMode::PerZone => {
                    for (entry, matched) in entries.iter().zip(buckets) {
                        if let Some(v) = zone_overflow(
                            category,
                            Some(entry.path.as_str()),
                            matched,
                            entry.max_files,
                            entry.severity,
                        ) {
                            findings.push(v);
                        }
                    }
                }
                ZoneLimitMode::Category => {
                    let first = &entries[0];
                    let matched: Vec<String> = buckets.into_iter().flatten().collect();
                    if let Some(v) =
                        zone_overflow(category, None, matched, first.max_files, first.severity)
                    {
                        findings.push(v);
                    }
                }
            }
        }

        findings
    }
}

fn zone_overflow(
    category: ZoneCategory,
    zone_path: Option<&str>,
    matched: Vec<String>,
    limit: u64,
    configured: Option<Severity>,
) -> Option<PolicyViolation> {
    if matched.len() as u64 <= limit {
        return None;
    }

    let severity = match category {
        ZoneCategory::Red => Severity::Blocking,
        ZoneCategory::Yellow => configured.unwrap_or(Severity::Warning),
        ZoneCategory::Green => configured.unwrap_or(Severity::Info),
    };
    let zone = match zone_path {
        Some(path) => format!("{} Zone '{path}'", category.label()),
        None => format!("{} Zone", category.label()),
    };
    let quoted = matched
        .iter()
        .take(QUOTED_FILES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let ellipsis = if matched.len() > QUOTED_FILES { "..." } else { "" };

    Some(PolicyViolation {
        scope: PolicyScope::Zone(category),
        severity,
        message: format!(
            "ZONE LIMIT: {zone} limit exceeded ({} > {limit}). Files: {quoted}{ellipsis}",
            matched.len()
        ),
        actual: matched.len(),
        files: matched,
        limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axiom_config::{Strictness, ZoneEntry};
    use std::collections::BTreeMap;

    fn entry(path: &str, max_files: u64) -> ZoneEntry {
        ZoneEntry {
            path: path.to_string(),
            max_files,
            severity: None,
        }
    }

    fn engine(threshold: u64, strictness: Strictness, mode: ZoneLimitMode) -> PolicyEngine {
        let mut zones = BTreeMap::new();
        zones.insert(
            ZoneCategory::Red,
            vec![entry("domain/core", 1), entry("domain/model", 2)],
        );
        zones.insert(ZoneCategory::Yellow, vec![entry("infra/db", 1)]);
        zones.insert(ZoneCategory::Green, vec![entry("app", 1)]);
        PolicyEngine::new(
            BlastRadiusSettings {
                enabled: true,
                threshold,
                strictness,
                zone_limits: mode,
            },
            ZoneSet::new(zones),
        )
    }

    fn files(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}/f{i}.rs")).collect()
    }

    #[test]
    fn test_threshold_exactly_passes() {
        let e = engine(10, Strictness::Blocking, ZoneLimitMode::PerZone);
        assert!(e.check_limits(&files("src", 10)).is_empty());
    }

    #[test]
    fn test_threshold_plus_one_emits_single_violation() {
        let e = engine(10, Strictness::Blocking, ZoneLimitMode::PerZone);
        let findings = e.check_limits(&files("src", 11));

        assert_eq!(findings.len(), 1);
        let v = &findings[0];
        assert_eq!(v.scope, PolicyScope::Global);
        assert_eq!(v.severity, Severity::Blocking);
        assert!(v.message.contains("11 > 10"));
        assert_eq!(v.file_path(), GLOBAL_CHECK_PATH);
    }

    #[test]
    fn test_warning_and_hybrid_strictness() {
        for strictness in [Strictness::Warning, Strictness::Hybrid] {
            let e = engine(1, strictness, ZoneLimitMode::PerZone);
            let findings = e.check_limits(&files("src", 2));
            assert_eq!(findings[0].severity, Severity::Warning);
        }
    }

    #[test]
    fn test_red_overflow_always_blocking() {
        let e = engine(100, Strictness::Warning, ZoneLimitMode::PerZone);
        let findings = e.check_limits(&files("domain/core", 2));

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].scope, PolicyScope::Zone(ZoneCategory::Red));
        assert_eq!(findings[0].severity, Severity::Blocking);
        assert!(findings[0].message.contains("2 > 1"));
        assert_eq!(findings[0].file_path(), "domain/core/f0.rs");
    }

    #[test]
    fn test_tier_default_severities() {
        let e = engine(100, Strictness::Blocking, ZoneLimitMode::PerZone);
        let mut changed = files("infra/db", 2);
        changed.extend(files("app", 2));
        let findings = e.check_limits(&changed);

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].scope, PolicyScope::Zone(ZoneCategory::Yellow));
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[1].scope, PolicyScope::Zone(ZoneCategory::Green));
        assert_eq!(findings[1].severity, Severity::Info);
    }

    #[test]
    fn test_per_zone_uses_each_entry_limit() {
        // domain/model allows 2, so two files there pass in per_zone mode
        let e = engine(100, Strictness::Blocking, ZoneLimitMode::PerZone);
        assert!(e.check_limits(&files("domain/model", 2)).is_empty());
    }

    #[test]
    fn test_category_mode_uses_first_entry_limit() {
        // Pooled against domain/core's limit of 1
        let e = engine(100, Strictness::Blocking, ZoneLimitMode::Category);
        let findings = e.check_limits(&files("domain/model", 2));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.starts_with("ZONE LIMIT: Red Zone limit exceeded (2 > 1)"));
    }

    #[test]
    fn test_message_quotes_first_three_files() {
        let e = engine(100, Strictness::Blocking, ZoneLimitMode::PerZone);
        let findings = e.check_limits(&files("app", 5));
        let msg = &findings[0].message;
        assert!(msg.contains("app/f0.rs, app/f1.rs, app/f2.rs..."));
        assert!(!msg.contains("app/f3.rs"));

        let v = findings[0].clone().into_violation("blast_radius");
        assert_eq!(v.policy_scope(), Some(PolicyScope::Zone(ZoneCategory::Green)));
        assert!(v.detail().unwrap().contains("app/f4.rs"));
    }

    #[test]
    fn test_disabled_engine_finds_nothing() {
        let mut zones = BTreeMap::new();
        zones.insert(ZoneCategory::Red, vec![entry("domain", 0)]);
        let settings = BlastRadiusSettings {
            enabled: false,
            threshold: 0,
            ..BlastRadiusSettings::default()
        };
        let e = PolicyEngine::new(settings, ZoneSet::new(zones));
        assert!(e.check_limits(&files("domain", 3)).is_empty());
    }

    #[test]
    fn test_configured_entry_severity() {
        let mut zones = BTreeMap::new();
        zones.insert(
            ZoneCategory::Yellow,
            vec![ZoneEntry {
                path: "infra".to_string(),
                max_files: 0,
                severity: Some(Severity::Blocking),
            }],
        );
        let e = PolicyEngine::new(BlastRadiusSettings::default(), ZoneSet::new(zones));
        let findings = e.check_limits(&files("infra", 1));
        assert_eq!(findings[0].severity, Severity::Blocking);
    }
}
