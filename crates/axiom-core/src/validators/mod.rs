//! Built-in validators.
//!
//! | Factory | Checks |
//! |---------|--------|
//! | `blast_radius` | changeset size against global and zone limits |
//! | `gitignore` | required entries in the project `.gitignore` |
//! | `command` | findings printed by an external analysis program |

mod blast_radius;
mod command;
mod gitignore;

pub use blast_radius::BlastRadiusValidator;
pub use command::{parse_finding, CommandValidator, FINDING_PREFIX};
pub use gitignore::{GitignoreValidator, DEFAULT_REQUIRED_ENTRIES};
