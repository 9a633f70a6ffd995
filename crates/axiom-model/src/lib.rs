//! # AXIOM Model
//!
//! Shared vocabulary for the AXIOM Sentinel governance pipeline: the
//! immutable [`Violation`] record, per-component outcome records, and the
//! three extension contracts every pluggable component implements.
//!
//! ## Contracts
//!
//! | Contract | Operation | Outcome |
//! |----------|-----------|---------|
//! | [`Validator`] | `validate(files)` | [`ValidationResult`] or [`ComponentError`] |
//! | [`Reporter`] | `report(violations, duration)` | [`ReportResult`] or [`ComponentError`] |
//! | [`Fixer`] | `fix(violations)`, `commit()`, `rollback()` | [`FixResult`] |
//!
//! ## Auditability
//!
//! Violations are never mutated once created. Softening a blocking finding
//! (see [`Violation::overridden`]) produces a new record whose message
//! carries the [`OVERRIDDEN_PREFIX`], so the original finding stays intact
//! in every sink that already received it.

mod contracts;
mod error;
mod violation;

pub use contracts::{FixResult, Fixer, ReportResult, Reporter, ValidationResult, Validator};
pub use error::ComponentError;
pub use violation::{
    FixPayload, PolicyScope, Severity, Violation, ZoneCategory, OVERRIDDEN_PREFIX,
};
