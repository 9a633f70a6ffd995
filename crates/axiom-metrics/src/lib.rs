//! # AXIOM Metrics & Trend Store
//!
//! Durable, bounded history of governance runs with derived statistics.
//!
//! ## Document Layout
//!
//! ```json
//! {
//!   "history": [
//!     {
//!       "timestamp": "2026-01-05T10:00:00Z",
//!       "execution_time_ms": 412.0,
//!       "total_violations": 3,
//!       "by_severity": { "warning": 2, "info": 1 },
//!       "by_validator": { "gitignore": 1, "blast_radius": 2 },
//!       "by_module": { "root": 1, "src": 2 }
//!     }
//!   ],
//!   "statistics": {
//!     "total_runs": 1,
//!     "avg_violations_per_run": 3.0,
//!     "pass_rate": 100.0,
//!     "most_common_validator": "blast_radius",
//!     "most_problematic_module": "src",
//!     "trend": "stable"
//!   }
//! }
//! ```
//!
//! ## Durability
//!
//! The document is written to a temporary file in the target directory,
//! synced, then renamed over the target. Readers see either the previous
//! document or the new one, never a torn write.
//!
//! A missing or unreadable document is replaced by a fresh one with a
//! logged warning; recording never fails because of prior state.
//!
//! ## Trend
//!
//! | Condition | Trend |
//! |-----------|-------|
//! | fewer than 2 runs, or no prior window | `stable` |
//! | prior mean 0, recent mean > 0 | `degrading` |
//! | recent mean below prior by more than 10% | `improving` |
//! | recent mean above prior by more than 10% | `degrading` |
//! | otherwise | `stable` |
//!
//! Windows are the last [`TREND_WINDOW`] runs and the [`TREND_WINDOW`]
//! runs before them.

mod error;
mod history;
mod reporter;
mod stats;
mod store;

pub use error::MetricsError;
pub use history::{module_of, HistoryEntry};
pub use reporter::MetricsReporter;
pub use stats::{Statistics, Trend, TREND_THRESHOLD, TREND_WINDOW};
pub use store::{MetricsDocument, MetricsStore, MAX_HISTORY};

/// Result type alias for metrics operations.
pub type Result<T> = std::result::Result<T, MetricsError>;
