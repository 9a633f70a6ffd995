//! Severity bucketing of validator output.

use axiom_model::{Severity, ValidationResult, Violation};
use axiom_policy::OverrideResult;
use std::collections::BTreeMap;

/// All violations of a run, grouped by severity and by validator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedViolations {
    pub blocking: Vec<Violation>,
    pub warning: Vec<Violation>,
    pub info: Vec<Violation>,
    pub by_validator: BTreeMap<String, Vec<Violation>>,
}

impl AggregatedViolations {
    /// Buckets every violation of `results`, preserving result order.
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let mut aggregated = Self::default();
        for violation in results.iter().flat_map(|r| r.violations.iter()) {
            aggregated.push(violation.clone());
        }
        aggregated
    }

    fn push(&mut self, violation: Violation) {
        self.by_validator
            .entry(violation.validator().to_string())
            .or_default()
            .push(violation.clone());
        match violation.severity() {
            Severity::Blocking => self.blocking.push(violation),
            Severity::Warning => self.warning.push(violation),
            Severity::Info => self.info.push(violation),
        }
    }

    pub fn total(&self) -> usize {
        self.blocking.len() + self.warning.len() + self.info.len()
    }

    pub fn has_blocking(&self) -> bool {
        !self.blocking.is_empty()
    }

    /// Every violation, blocking first.
    pub fn all(&self) -> Vec<Violation> {
        self.blocking
            .iter()
            .chain(&self.warning)
            .chain(&self.info)
            .cloned()
            .collect()
    }

    /// Downgrades blocking violations covered by `overrides` to warnings.
    ///
    /// Returns how many were downgraded.
    pub fn apply_overrides(&mut self, overrides: &OverrideResult) -> usize {
        if overrides.is_empty() || self.blocking.is_empty() {
            return 0;
        }

        let (covered, kept): (Vec<Violation>, Vec<Violation>) = std::mem::take(&mut self.blocking)
            .into_iter()
            .partition(|v| overrides.covers(v));
        if covered.is_empty() {
            self.blocking = kept;
            return 0;
        }

        let downgraded = covered.len();
        let mut rebuilt = Self::default();
        for violation in kept
            .into_iter()
            .chain(covered.iter().map(Violation::overridden))
            .chain(std::mem::take(&mut self.warning))
            .chain(std::mem::take(&mut self.info))
        {
            rebuilt.push(violation);
        }
        *self = rebuilt;
        downgraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axiom_model::{PolicyScope, ZoneCategory, OVERRIDDEN_PREFIX};

    fn result(validator: &str, violations: Vec<Violation>) -> ValidationResult {
        ValidationResult::new(validator, violations)
    }

    #[test]
    fn test_buckets_by_severity_and_validator() {
        let results = vec![
            result(
                "a",
                vec![
                    Violation::new("x", "1", Severity::Blocking, "a"),
                    Violation::new("y", "2", Severity::Info, "a"),
                ],
            ),
            result("b", vec![Violation::new("z", "3", Severity::Warning, "b")]),
        ];
        let agg = AggregatedViolations::from_results(&results);

        assert_eq!(agg.total(), 3);
        assert!(agg.has_blocking());
        assert_eq!(agg.by_validator["a"].len(), 2);
        assert_eq!(agg.by_validator["b"].len(), 1);
        assert_eq!(agg.all()[0].message(), "1");
    }

    #[test]
    fn test_override_downgrades_only_covered() {
        let global = Violation::new("Global Check", "too many", Severity::Blocking, "blast_radius")
            .with_scope(PolicyScope::Global);
        let red = Violation::new("domain/core/a.rs", "red", Severity::Blocking, "blast_radius")
            .with_scope(PolicyScope::Zone(ZoneCategory::Red));
        let other = Violation::new("src/a.rs", "lint", Severity::Blocking, "lint");
        let mut agg = AggregatedViolations::from_results(&[result("all", vec![global, red, other])]);

        let overrides = OverrideResult {
            bypass_zones: [ZoneCategory::Red].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(agg.apply_overrides(&overrides), 1);

        assert_eq!(agg.blocking.len(), 2);
        assert_eq!(agg.warning.len(), 1);
        assert!(agg.warning[0].message().starts_with(OVERRIDDEN_PREFIX));
        assert_eq!(agg.by_validator["blast_radius"].len(), 2);
        assert_eq!(agg.total(), 3);
    }

    #[test]
    fn test_empty_override_is_noop() {
        let v = Violation::new("Global Check", "m", Severity::Blocking, "blast_radius")
            .with_scope(PolicyScope::Global);
        let mut agg = AggregatedViolations::from_results(&[result("blast_radius", vec![v])]);
        let before = agg.clone();

        assert_eq!(agg.apply_overrides(&OverrideResult::default()), 0);
        assert_eq!(agg, before);
    }
}
