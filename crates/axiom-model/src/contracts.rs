//! Extension contracts for validators, reporters and fixers, plus the
//! outcome records they hand back to the orchestrator.

use crate::error::ComponentError;
use crate::violation::{Severity, Violation};
use std::time::Duration;

/// Outcome of one validator over one file set.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Identity of the validator.
    pub validator: String,
    /// Findings in the order the validator produced them.
    pub violations: Vec<Violation>,
    /// Wall-clock time spent validating.
    pub duration: Duration,
    /// False when at least one finding is blocking.
    pub success: bool,
}

impl ValidationResult {
    /// Builds a result, deriving `success` from the findings.
    pub fn new(validator: impl Into<String>, violations: Vec<Violation>) -> Self {
        let success = !violations.iter().any(|v| v.severity() == Severity::Blocking);
        Self {
            validator: validator.into(),
            violations,
            duration: Duration::ZERO,
            success,
        }
    }

    /// Records the measured execution time.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Outcome of one `fix` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FixResult {
    pub fixer: String,
    pub success: bool,
    /// Files mutated by this call. Empty on failure.
    pub fixed_files: Vec<String>,
    pub error: Option<String>,
    pub duration: Duration,
}

impl FixResult {
    /// Nothing applicable was found.
    pub fn nothing(fixer: impl Into<String>) -> Self {
        Self::fixed(fixer, Vec::new(), Duration::ZERO)
    }

    pub fn fixed(fixer: impl Into<String>, fixed_files: Vec<String>, duration: Duration) -> Self {
        Self {
            fixer: fixer.into(),
            success: true,
            fixed_files,
            error: None,
            duration,
        }
    }

    pub fn failed(fixer: impl Into<String>, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            fixer: fixer.into(),
            success: false,
            fixed_files: Vec::new(),
            error: Some(error.into()),
            duration,
        }
    }
}

/// Outcome of one `report` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportResult {
    pub reporter: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration: Duration,
}

impl ReportResult {
    pub fn delivered(reporter: impl Into<String>, duration: Duration) -> Self {
        Self {
            reporter: reporter.into(),
            success: true,
            error: None,
            duration,
        }
    }

    pub fn failed(reporter: impl Into<String>, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            reporter: reporter.into(),
            success: false,
            error: Some(error.into()),
            duration,
        }
    }
}

/// A check over a set of changed files.
///
/// Validators are run concurrently on a bounded pool, so they must be
/// `Send + Sync` and must not depend on each other. Returning `Err` (or
/// panicking) only drops this validator's result for the run.
pub trait Validator: Send + Sync {
    /// Stable identity, used for aggregation and metrics.
    fn name(&self) -> &str;

    /// Validates `files` (paths relative to the project root).
    fn validate(&self, files: &[String]) -> Result<ValidationResult, ComponentError>;
}

/// A sink for the final violation set.
///
/// Must be safe to call several times in one process.
pub trait Reporter: Send + Sync {
    fn name(&self) -> &str;

    fn report(
        &self,
        violations: &[Violation],
        total_duration: Duration,
    ) -> Result<ReportResult, ComponentError>;
}

/// A reversible remediation strategy.
///
/// `fix` may mutate files; the orchestrator later calls exactly one of
/// `commit` or `rollback`. Both are no-ops when nothing is pending.
pub trait Fixer: Send {
    fn name(&self) -> &str;

    /// Applies fixes for the violations this fixer recognizes.
    ///
    /// On any mutation failure the fixer restores everything it touched
    /// before returning a failed [`FixResult`].
    fn fix(&mut self, violations: &[Violation]) -> FixResult;

    /// Accepts pending mutations and discards their backups.
    fn commit(&mut self) -> Result<(), ComponentError>;

    /// Restores original content for every pending mutation.
    fn rollback(&mut self) -> Result<(), ComponentError>;
}
