//! Commit-message override keywords.
//!
//! An override is an explicit, auditable waiver: the author writes a
//! keyword such as `BIGBANG_APPROVED` into the commit message and the
//! matching blocking policy violations are downgraded to warnings for that
//! run only. Nothing is persisted between runs.

use axiom_config::OverrideSettings;
use axiom_model::{PolicyScope, Violation, ZoneCategory};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// What a keyword waives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bypass {
    /// Every blast-radius finding, global and zone.
    BlastRadius,
    /// Zone-overflow findings of one category.
    Zone(ZoneCategory),
}

/// Recognized keywords, matched case-insensitively.
pub const BUILTIN_KEYWORDS: [(&str, Bypass); 4] = [
    ("BIGBANG_APPROVED", Bypass::BlastRadius),
    ("RED_ZONE_APPROVED", Bypass::Zone(ZoneCategory::Red)),
    ("YELLOW_ZONE_APPROVED", Bypass::Zone(ZoneCategory::Yellow)),
    ("GREEN_ZONE_APPROVED", Bypass::Zone(ZoneCategory::Green)),
];

/// Bypasses granted by one commit message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideResult {
    pub bypass_zones: BTreeSet<ZoneCategory>,
    pub bypass_blast_radius: bool,
    /// Keywords found, in canonical spelling.
    pub keywords: Vec<&'static str>,
}

impl OverrideResult {
    pub fn is_empty(&self) -> bool {
        !self.bypass_blast_radius && self.bypass_zones.is_empty()
    }

    /// Whether this result waives `violation`.
    ///
    /// Only policy findings can be waived; violations without a
    /// [`PolicyScope`] are never covered.
    pub fn covers(&self, violation: &Violation) -> bool {
        match violation.policy_scope() {
            Some(PolicyScope::Global) => self.bypass_blast_radius,
            Some(PolicyScope::Zone(category)) => {
                self.bypass_blast_radius || self.bypass_zones.contains(&category)
            }
            None => false,
        }
    }
}

/// Scans commit messages for override keywords.
#[derive(Debug, Clone)]
pub struct OverrideDetector {
    enabled: Vec<(&'static str, Bypass)>,
}

impl Default for OverrideDetector {
    fn default() -> Self {
        Self {
            enabled: BUILTIN_KEYWORDS.to_vec(),
        }
    }
}

impl OverrideDetector {
    /// A detector honoring every built-in keyword.
    pub fn new() -> Self {
        Self::default()
    }

    /// A detector honoring only `keywords`; an empty list honors all.
    ///
    /// Names that are not built-in keywords are ignored with a warning.
    pub fn with_enabled_keywords(keywords: &[String]) -> Self {
        if keywords.is_empty() {
            return Self::new();
        }

        for name in keywords {
            if !BUILTIN_KEYWORDS
                .iter()
                .any(|(token, _)| token.eq_ignore_ascii_case(name))
            {
                warn!("Ignoring unknown override keyword '{}'", name);
            }
        }

        let enabled = BUILTIN_KEYWORDS
            .iter()
            .filter(|(token, _)| keywords.iter().any(|k| k.eq_ignore_ascii_case(token)))
            .copied()
            .collect();
        Self { enabled }
    }

    pub fn from_settings(settings: &OverrideSettings) -> Self {
        Self::with_enabled_keywords(&settings.enabled_keywords)
    }

    /// Detects bypasses in `message`.
    ///
    /// `None` and empty messages yield an empty result. Several keywords
    /// may co-occur; their bypasses accumulate.
    pub fn detect(&self, message: Option<&str>) -> OverrideResult {
        let mut result = OverrideResult::default();
        let Some(message) = message.filter(|m| !m.trim().is_empty()) else {
            return result;
        };

        let haystack = message.to_ascii_uppercase();
        for (token, bypass) in &self.enabled {
            if !haystack.contains(*token) {
                continue;
            }
            result.keywords.push(*token);
            match bypass {
                Bypass::BlastRadius => result.bypass_blast_radius = true,
                Bypass::Zone(category) => {
                    result.bypass_zones.insert(*category);
                }
            }
        }

        if !result.is_empty() {
            debug!("Override keywords detected: {:?}", result.keywords);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axiom_model::Severity;

    #[test]
    fn test_bigbang_sets_blast_radius_bypass() {
        let result = OverrideDetector::new().detect(Some("feat: big refactor BIGBANG_APPROVED"));
        assert!(result.bypass_blast_radius);
        assert!(result.bypass_zones.is_empty());
        assert_eq!(result.keywords, vec!["BIGBANG_APPROVED"]);
    }

    #[test]
    fn test_empty_and_absent_messages() {
        let detector = OverrideDetector::new();
        assert!(detector.detect(Some("")).is_empty());
        assert!(detector.detect(None).is_empty());
        assert!(detector.detect(Some("   \n")).is_empty());
    }

    #[test]
    fn test_case_insensitive_and_accumulating() {
        let result = OverrideDetector::new()
            .detect(Some("red_zone_approved and Green_Zone_Approved please"));
        assert!(!result.bypass_blast_radius);
        assert!(result.bypass_zones.contains(&ZoneCategory::Red));
        assert!(result.bypass_zones.contains(&ZoneCategory::Green));
        assert!(!result.bypass_zones.contains(&ZoneCategory::Yellow));
    }

    #[test]
    fn test_enabled_keywords_restrict_detection() {
        let detector = OverrideDetector::with_enabled_keywords(&["RED_ZONE_APPROVED".to_string()]);
        let result = detector.detect(Some("BIGBANG_APPROVED RED_ZONE_APPROVED"));
        assert!(!result.bypass_blast_radius);
        assert!(result.bypass_zones.contains(&ZoneCategory::Red));
    }

    #[test]
    fn test_covers_by_scope() {
        let global = Violation::new("Global Check", "m", Severity::Blocking, "blast_radius")
            .with_scope(PolicyScope::Global);
        let red = Violation::new("domain/core/a.rs", "m", Severity::Blocking, "blast_radius")
            .with_scope(PolicyScope::Zone(ZoneCategory::Red));
        let unscoped = Violation::new(".gitignore", "m", Severity::Blocking, "gitignore");

        let bigbang = OverrideDetector::new().detect(Some("BIGBANG_APPROVED"));
        assert!(bigbang.covers(&global));
        assert!(bigbang.covers(&red));
        assert!(!bigbang.covers(&unscoped));

        let red_only = OverrideDetector::new().detect(Some("RED_ZONE_APPROVED"));
        assert!(!red_only.covers(&global));
        assert!(red_only.covers(&red));
    }
}
