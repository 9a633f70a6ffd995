//! # AXIOM Sentinel Core
//!
//! The pre-commit orchestrator. Runs a configurable battery of checks over
//! a changeset, lets authorized commit messages waive policy limits,
//! applies safe automatic fixes with verified rollback, records every run,
//! and decides whether the commit may proceed.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           Sentinel                               │
//! │                                                                  │
//! │  VcsProvider ──▶ files, message                                  │
//! │  ConfigStore ──▶ AxiomConfig ──▶ ComponentRegistry               │
//! │                                   │                              │
//! │        ┌──────────────────────────┼────────────────────┐         │
//! │        ▼                          ▼                    ▼         │
//! │  ┌───────────┐            ┌─────────────┐       ┌───────────┐    │
//! │  │ Validators│ (rayon) ──▶│ Aggregation │──────▶│  Fixers   │    │
//! │  └───────────┘            │ + Overrides │◀──────│ commit /  │    │
//! │                           └──────┬──────┘ verify│ rollback  │    │
//! │                                  ▼              └───────────┘    │
//! │                           ┌─────────────┐                        │
//! │                           │  Reporters  │──▶ console, log, metrics│
//! │                           └──────┬──────┘                        │
//! │                                  ▼                               │
//! │                              Decision                            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use axiom_core::{FixedChangeSet, Sentinel};
//!
//! let outcome = Sentinel::new(".")
//!     .with_vcs(FixedChangeSet::new(vec!["src/lib.rs".into()]))
//!     .with_dry_run(true)
//!     .run()?;
//!
//! println!("{}", outcome.decision);
//! # Ok::<(), axiom_core::SentinelError>(())
//! ```
//!
//! ## Failure Containment
//!
//! Only discovery, configuration and worker-pool failures abort a run.
//! Everything a component does wrong is logged and contained at the
//! component boundary.

pub mod aggregate;
pub mod decision;
pub mod error;
pub mod process;
pub mod registry;
pub mod reporters;
pub mod sentinel;
pub mod validators;
pub mod vcs;

pub use aggregate::AggregatedViolations;
pub use decision::{Decision, FixOutcome, RunOutcome, EXIT_BLOCKED, EXIT_ERROR, EXIT_PASS};
pub use error::SentinelError;
pub use registry::{BuildContext, ComponentRegistry, FixerContext};
pub use sentinel::Sentinel;
pub use vcs::{FixedChangeSet, GitCli, VcsError, VcsProvider};

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, SentinelError>;
