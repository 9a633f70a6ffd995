//! Run decision and outcome types.

use crate::aggregate::AggregatedViolations;
use axiom_policy::OverrideResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Process exit code for an allowed commit.
pub const EXIT_PASS: i32 = 0;
/// Process exit code for a blocked commit.
pub const EXIT_BLOCKED: i32 = 1;
/// Process exit code for a run that could not complete.
pub const EXIT_ERROR: i32 = 2;

/// The final decision of a run.
///
/// - `Pass`: no blocking violations remain
/// - `Fail`: blocking violations remain, the commit is rejected
/// - `DryRun`: blocking violations remain but dry-run mode lets it through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Pass,
    Fail {
        /// Number of blocking violations.
        blocking: usize,
    },
    DryRun {
        /// Number of blocking violations that would have failed the run.
        blocking: usize,
    },
}

impl Decision {
    /// Derives the decision from the final aggregation.
    pub fn decide(violations: &AggregatedViolations, dry_run: bool) -> Self {
        let blocking = violations.blocking.len();
        match (blocking, dry_run) {
            (0, _) => Self::Pass,
            (_, true) => Self::DryRun { blocking },
            (_, false) => Self::Fail { blocking },
        }
    }

    /// Returns true if the commit may proceed.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Fail { .. })
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            EXIT_PASS
        } else {
            EXIT_BLOCKED
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail { blocking } => write!(f, "FAIL ({} blocking)", blocking),
            Self::DryRun { blocking } => {
                write!(f, "PASS (dry run, {} blocking ignored)", blocking)
            }
        }
    }
}

/// What the auto-fix stage did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FixOutcome {
    /// Auto-fix is disabled or there was nothing to do.
    #[default]
    Skipped,
    /// Fixes were kept.
    Committed { files: Vec<String> },
    /// Fixes introduced blocking violations and were undone.
    RolledBack { files: Vec<String> },
}

/// Full result of one orchestrated run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub decision: Decision,
    pub violations: AggregatedViolations,
    /// The changed files that were validated.
    pub files: Vec<String>,
    pub overrides: OverrideResult,
    pub fix: FixOutcome,
    /// Validators that errored or panicked and contributed nothing.
    pub failed_validators: Vec<String>,
    pub duration: Duration,
}

impl RunOutcome {
    /// Outcome for a run with nothing to validate.
    pub fn empty(duration: Duration) -> Self {
        Self {
            decision: Decision::Pass,
            violations: AggregatedViolations::default(),
            files: Vec::new(),
            overrides: OverrideResult::default(),
            fix: FixOutcome::Skipped,
            failed_validators: Vec::new(),
            duration,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.decision.exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axiom_model::{Severity, ValidationResult, Violation};

    fn with_blocking(n: usize) -> AggregatedViolations {
        let violations = (0..n)
            .map(|i| Violation::new(format!("f{i}"), "m", Severity::Blocking, "v"))
            .collect();
        AggregatedViolations::from_results(&[ValidationResult::new("v", violations)])
    }

    #[test]
    fn test_pass_without_blocking() {
        let decision = Decision::decide(&with_blocking(0), false);
        assert_eq!(decision, Decision::Pass);
        assert_eq!(decision.exit_code(), EXIT_PASS);
    }

    #[test]
    fn test_fail_with_blocking() {
        let decision = Decision::decide(&with_blocking(2), false);
        assert_eq!(decision, Decision::Fail { blocking: 2 });
        assert!(!decision.is_success());
        assert_eq!(decision.exit_code(), EXIT_BLOCKED);
        assert_eq!(decision.to_string(), "FAIL (2 blocking)");
    }

    #[test]
    fn test_dry_run_passes() {
        let decision = Decision::decide(&with_blocking(1), true);
        assert_eq!(decision, Decision::DryRun { blocking: 1 });
        assert_eq!(decision.exit_code(), EXIT_PASS);
    }

    #[test]
    fn test_empty_outcome() {
        let outcome = RunOutcome::empty(Duration::ZERO);
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(outcome.fix, FixOutcome::Skipped);
    }
}
