//! # AXIOM Fixer
//!
//! Reversible, bounded file mutations for automatic remediation.
//!
//! ## Guarantee
//!
//! Every file a fixer touches is snapshotted before its first mutation in
//! a session. The session then ends in exactly one of two ways:
//!
//! - **commit**: mutations are accepted and the backups deleted.
//! - **rollback**: every touched file is restored byte-for-byte from its
//!   backup and the backups are consumed.
//!
//! A failure in the middle of a `fix` call rolls the whole session back
//! before the failure is reported, so a half-applied fix never survives.
//!
//! ## State Machine
//!
//! ```text
//!            fix() with work
//!   Idle ───────────────────▶ Fixing ──commit()──▶ Committed ──┐
//!     ▲                         │  │                           │
//!     │                         │  └─rollback()──▶ RolledBack ─┤
//!     │                         │                              │
//!     │                   write failure                        │
//!     │                         └────────────────▶ RolledBack ─┤
//!     │                                   backups drained      │
//!     └────────────────────────────────────────────────────────┘
//!
//! commit()/rollback() outside Fixing are no-ops. The last terminal
//! transition stays readable through `FixSession::last_outcome`.
//! ```
//!
//! ## Components
//!
//! | Type | Role |
//! |------|------|
//! | [`BackupSet`] | original → backup mapping, snapshot/discard/restore |
//! | [`FixSession`] | lifecycle state over a [`BackupSet`] |
//! | [`SimpleFixer`] | appends missing entries to list-like files |
//! | [`AppendWriter`] | the single mutation primitive [`SimpleFixer`] uses |

mod backup;
mod error;
mod session;
mod simple;

pub use backup::{BackupSet, BACKUP_MARKER};
pub use error::FixerError;
pub use session::{FixSession, FixState};
pub use simple::{AppendWriter, FsAppendWriter, SimpleFixer, AUTO_ADDED_MARKER, MISSING_ENTRIES_KEY};

/// Result type alias for fixer operations.
pub type Result<T> = std::result::Result<T, FixerError>;
