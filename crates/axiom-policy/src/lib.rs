//! # AXIOM Policy Engine
//!
//! Enforces how large a single changeset may be, and lets an authorized
//! commit message waive those limits for one run.
//!
//! ## Limits
//!
//! | Dimension | Scope | Severity on overflow |
//! |-----------|-------|----------------------|
//! | Global threshold | all changed files | configured strictness (`hybrid` warns) |
//! | Red zone | files under red paths | always `blocking` |
//! | Yellow zone | files under yellow paths | entry `severity`, else `warning` |
//! | Green zone | files under green paths | entry `severity`, else `info` |
//!
//! Each changed file belongs to at most one zone. Red patterns are tried
//! first, then yellow, then green; the first match wins.
//!
//! ## Architecture
//!
//! ```text
//!   changed files ──▶ ┌──────────────┐      ┌──────────────┐
//!                     │   ZoneSet    │─────▶│ PolicyEngine │──▶ [PolicyViolation]
//!                     │ (classify)   │      │ (count/cap)  │
//!                     └──────────────┘      └──────────────┘
//!
//!   commit message ─▶ ┌──────────────────┐
//!                     │ OverrideDetector │──▶ OverrideResult ──▶ covers(violation)?
//!                     └──────────────────┘
//! ```
//!
//! Policy findings carry a [`PolicyScope`](axiom_model::PolicyScope) so the
//! orchestrator can ask an [`OverrideResult`] whether a given blocking
//! violation has been waived.

mod blast_radius;
mod overrides;
mod zones;

pub use blast_radius::{PolicyEngine, PolicyViolation, GLOBAL_CHECK_PATH};
pub use overrides::{Bypass, OverrideDetector, OverrideResult, BUILTIN_KEYWORDS};
pub use zones::{ZoneMatch, ZoneSet};
