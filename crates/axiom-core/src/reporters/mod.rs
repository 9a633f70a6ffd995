//! Built-in reporters. The `metrics` reporter lives in `axiom-metrics`.

mod console;
mod log_file;

pub use console::ConsoleReporter;
pub use log_file::{render_entry, LogFileReporter};
