use crate::registry::BuildContext;
use axiom_config::ConfigurationError;
use axiom_model::{ComponentError, ReportResult, Reporter, Severity, Violation};
use owo_colors::OwoColorize;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Human-readable summary on stdout.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    color: bool,
}

impl ConsoleReporter {
    pub const FACTORY: &'static str = "console";

    /// Colors are used only when requested and `NO_COLOR` is unset.
    pub fn new(color: bool) -> Self {
        Self {
            color: color && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub(crate) fn from_context(ctx: &BuildContext<'_>) -> Result<Self, ConfigurationError> {
        let color = ctx
            .settings
            .option::<bool>(&ctx.prefix("reporters"), "color")?
            .unwrap_or(true);
        Ok(Self::new(color))
    }

    fn badge(&self, severity: Severity) -> String {
        let (icon, label) = match severity {
            Severity::Blocking => ("✖", "[BLOCKING]"),
            Severity::Warning => ("▲", "[WARNING]"),
            Severity::Info => ("◆", "[INFO]"),
        };
        if !self.color {
            return format!("{icon} {label}");
        }
        match severity {
            Severity::Blocking => format!("{} {}", icon.red(), label.red().bold()),
            Severity::Warning => format!("{} {}", icon.yellow(), label.yellow().bold()),
            Severity::Info => format!("{} {}", icon.blue(), label.blue().bold()),
        }
    }

    /// Renders the report text.
    pub fn render(&self, violations: &[Violation], total_duration: Duration) -> String {
        let mut out = String::new();
        let ms = total_duration.as_secs_f64() * 1000.0;

        if violations.is_empty() {
            let line = format!("✔ AXIOM Sentinel: no violations ({ms:.1}ms)");
            if self.color {
                let _ = writeln!(out, "{}", line.green().bold());
            } else {
                let _ = writeln!(out, "{line}");
            }
            return out;
        }

        let count = |s: Severity| violations.iter().filter(|v| v.severity() == s).count();
        let header = format!(
            "AXIOM Sentinel: {} violations ({} blocking, {} warning, {} info) in {ms:.1}ms",
            violations.len(),
            count(Severity::Blocking),
            count(Severity::Warning),
            count(Severity::Info),
        );
        if self.color {
            let _ = writeln!(out, "{}", header.bold());
        } else {
            let _ = writeln!(out, "{header}");
        }

        for severity in Severity::ALL {
            for v in violations.iter().filter(|v| v.severity() == severity) {
                let location = match v.line() {
                    Some(line) => format!("{}:{}", v.file_path(), line),
                    None => v.file_path().to_string(),
                };
                let location = if self.color {
                    location.bold().to_string()
                } else {
                    location
                };
                let _ = writeln!(
                    out,
                    "{} {} ❲{}❳ {}",
                    self.badge(severity),
                    location,
                    v.validator(),
                    v.message()
                );
                if let Some(suggestion) = v.suggestion() {
                    let hint = format!("    ↳ {suggestion}");
                    if self.color {
                        let _ = writeln!(out, "{}", hint.bright_black());
                    } else {
                        let _ = writeln!(out, "{hint}");
                    }
                }
            }
        }
        out
    }
}

impl Reporter for ConsoleReporter {
    fn name(&self) -> &str {
        Self::FACTORY
    }

    fn report(
        &self,
        violations: &[Violation],
        total_duration: Duration,
    ) -> Result<ReportResult, ComponentError> {
        let start = Instant::now();
        let text = self.render(violations, total_duration);
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        Ok(ReportResult::delivered(Self::FACTORY, start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_clean_run() {
        let text = ConsoleReporter::new(false).render(&[], Duration::from_millis(5));
        assert_eq!(text, "✔ AXIOM Sentinel: no violations (5.0ms)\n");
    }

    #[test]
    fn test_render_plain_groups_by_severity() {
        let violations = vec![
            Violation::new("a.rs", "info msg", Severity::Info, "v"),
            Violation::new("Global Check", "too big", Severity::Blocking, "blast_radius")
                .with_suggestion("split it"),
        ];
        let text = ConsoleReporter::new(false).render(&violations, Duration::ZERO);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].contains("2 violations (1 blocking, 0 warning, 1 info)"));
        assert_eq!(lines[1], "✖ [BLOCKING] Global Check ❲blast_radius❳ too big");
        assert_eq!(lines[2], "    ↳ split it");
        assert!(lines[3].starts_with("◆ [INFO] a.rs"));
    }
}
