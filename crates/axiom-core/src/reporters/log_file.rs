use crate::registry::BuildContext;
use axiom_config::ConfigurationError;
use axiom_model::{ComponentError, ReportResult, Reporter, Severity, Violation};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error};

const DEFAULT_LOG_PATH: &str = ".axiom/validation.log";

/// Appends a human-readable section plus an embedded JSON record per run.
#[derive(Debug, Clone)]
pub struct LogFileReporter {
    path: PathBuf,
}

impl LogFileReporter {
    pub const FACTORY: &'static str = "log_file";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn from_context(ctx: &BuildContext<'_>) -> Result<Self, ConfigurationError> {
        let path = ctx
            .settings
            .option::<String>(&ctx.prefix("reporters"), "path")?
            .unwrap_or_else(|| DEFAULT_LOG_PATH.to_string());
        Ok(Self::new(ctx.resolve(&path)))
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(entry.as_bytes())
    }
}

/// Renders one log entry.
///
/// ```text
/// === Validation Run: 2026-01-01T00:00:00+00:00 ===
/// Summary: 1 violations found in 12.0ms
///
/// --- BLOCKING ---
/// [BLOCKING] Global Check - BLAST RADIUS: ...
///   Suggestion: ...
///
/// [JSON_ENTRY]
/// { ... }
/// [/JSON_ENTRY]
/// ----------------------------------------
/// ```
pub fn render_entry(
    violations: &[Violation],
    total_duration: Duration,
    timestamp: DateTime<Utc>,
) -> Result<String, ComponentError> {
    let ms = total_duration.as_secs_f64() * 1000.0;
    let mut out = String::new();
    let _ = writeln!(out, "=== Validation Run: {} ===", timestamp.to_rfc3339());
    let _ = writeln!(out, "Summary: {} violations found in {ms:.1}ms", violations.len());
    out.push('\n');

    if violations.is_empty() {
        out.push_str("No violations found.\n");
    }
    for severity in Severity::ALL {
        let group: Vec<&Violation> = violations.iter().filter(|v| v.severity() == severity).collect();
        if group.is_empty() {
            continue;
        }
        let _ = writeln!(out, "--- {} ---", severity.as_str().to_uppercase());
        for v in group {
            let _ = writeln!(out, "{v}");
            if let Some(detail) = v.detail() {
                let _ = writeln!(out, "  Detail: {detail}");
            }
            if let Some(suggestion) = v.suggestion() {
                let _ = writeln!(out, "  Suggestion: {suggestion}");
            }
        }
        out.push('\n');
    }

    let record = serde_json::json!({
        "timestamp": timestamp.to_rfc3339(),
        "total_execution_time_ms": ms,
        "violations": violations,
    });
    let _ = write!(
        out,
        "\n[JSON_ENTRY]\n{}\n[/JSON_ENTRY]\n",
        serde_json::to_string_pretty(&record)?
    );
    let _ = writeln!(out, "{}\n", "-".repeat(40));
    Ok(out)
}

impl Reporter for LogFileReporter {
    fn name(&self) -> &str {
        Self::FACTORY
    }

    fn report(
        &self,
        violations: &[Violation],
        total_duration: Duration,
    ) -> Result<ReportResult, ComponentError> {
        let start = Instant::now();
        let entry = render_entry(violations, total_duration, Utc::now())?;

        match self.append(&entry) {
            Ok(()) => {
                debug!("Appended run to {}", self.path.display());
                Ok(ReportResult::delivered(Self::FACTORY, start.elapsed()))
            }
            Err(e) => {
                error!("Failed to write log {}: {}", self.path.display(), e);
                Ok(ReportResult::failed(Self::FACTORY, e.to_string(), start.elapsed()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_entry_layout() {
        let violations = vec![Violation::new("Global Check", "too big", Severity::Blocking, "blast_radius")
            .with_detail("All files: a, b")
            .with_suggestion("split")];
        let entry = render_entry(&violations, Duration::from_millis(12), at()).unwrap();

        assert!(entry.starts_with("=== Validation Run: 2026-03-01T12:00:00+00:00 ===\n"));
        assert!(entry.contains("Summary: 1 violations found in 12.0ms\n\n--- BLOCKING ---\n"));
        assert!(entry.contains("[BLOCKING] Global Check - too big\n  Detail: All files: a, b\n  Suggestion: split\n"));
        assert!(entry.ends_with(&format!("[/JSON_ENTRY]\n{}\n\n", "-".repeat(40))));
    }

    #[test]
    fn test_json_block_parses() {
        let violations = vec![Violation::new("a.rs", "m", Severity::Info, "v").with_line(3)];
        let entry = render_entry(&violations, Duration::ZERO, at()).unwrap();

        let json = entry
            .split("[JSON_ENTRY]\n")
            .nth(1)
            .and_then(|rest| rest.split("\n[/JSON_ENTRY]").next())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["violations"][0]["line_number"], 3);
        assert_eq!(value["violations"][0]["validator_name"], "v");
    }

    #[test]
    fn test_clean_run_entry() {
        let entry = render_entry(&[], Duration::ZERO, at()).unwrap();
        assert!(entry.contains("No violations found.\n"));
    }

    #[test]
    fn test_report_appends() {
        let dir = TempDir::new().unwrap();
        let reporter = LogFileReporter::new(dir.path().join(".axiom/validation.log"));

        reporter.report(&[], Duration::ZERO).unwrap();
        reporter.report(&[], Duration::ZERO).unwrap();

        let text = fs::read_to_string(reporter.path()).unwrap();
        assert_eq!(text.matches("=== Validation Run:").count(), 2);
    }

    #[test]
    fn test_unwritable_path_reports_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let reporter = LogFileReporter::new(blocker.join("validation.log"));

        let result = reporter.report(&[], Duration::ZERO).unwrap();

        assert!(!result.success);
        assert!(result.error.is_some());
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
    }
}
