use crate::process::{run_with_timeout, timeout_from_secs};
use crate::registry::BuildContext;
use axiom_config::ConfigurationError;
use axiom_model::{ComponentError, Severity, ValidationResult, Validator, Violation};
use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Leading field of every finding line an external program prints.
pub const FINDING_PREFIX: &str = "axiom-v1";

/// Runs an external analysis program over the changed files.
///
/// The program is invoked as `command... <file>...` from the project root
/// and reports one finding per stdout line:
///
/// ```text
/// axiom-v1|<severity>|<path>|<line or empty>|<message>
/// ```
///
/// Other lines are ignored. A non-zero exit status with no findings is
/// treated as a failure of the program itself.
#[derive(Debug, Clone)]
pub struct CommandValidator {
    name: String,
    root: PathBuf,
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandValidator {
    pub const FACTORY: &'static str = "command";

    /// # Errors
    ///
    /// Returns [`ConfigurationError::Invalid`] when `command` is empty.
    pub fn new(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        command: Vec<String>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        let mut parts = command.into_iter();
        let program = parts.next().filter(|p| !p.trim().is_empty()).ok_or_else(|| {
            ConfigurationError::invalid(
                format!("validators.{name}.command"),
                "must be a non-empty list",
            )
        })?;
        Ok(Self {
            name,
            root: root.into(),
            program,
            args: parts.collect(),
            timeout: None,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn from_context(ctx: &BuildContext<'_>) -> Result<Self, ConfigurationError> {
        let command = ctx
            .settings
            .option::<Vec<String>>(&ctx.prefix("validators"), "command")?
            .unwrap_or_default();
        let timeout = timeout_from_secs(ctx.config.execution.command_timeout_secs);
        Ok(Self::new(ctx.key, ctx.root, command)?.with_timeout(timeout))
    }
}

/// Parses one stdout line into a violation attributed to `validator`.
///
/// Returns `None` for lines that are not well-formed findings.
pub fn parse_finding(line: &str, validator: &str) -> Option<Violation> {
    let mut fields = line.trim_end().splitn(5, '|');
    if fields.next()? != FINDING_PREFIX {
        return None;
    }
    let severity: Severity = fields.next()?.trim().parse().ok()?;
    let path = fields.next()?.trim();
    let line_no = fields.next()?.trim();
    let message = fields.next()?.trim();
    if path.is_empty() || message.is_empty() {
        return None;
    }

    let violation = Violation::new(path, message, severity, validator);
    if line_no.is_empty() {
        return Some(violation);
    }
    line_no.parse().ok().map(|n| violation.with_line(n))
}

impl Validator for CommandValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, files: &[String]) -> Result<ValidationResult, ComponentError> {
        let start = Instant::now();
        if files.is_empty() {
            return Ok(ValidationResult::new(&self.name, Vec::new()));
        }

        let mut command = Command::new(&self.program);
        command.args(&self.args).args(files).current_dir(&self.root);
        debug!("Running '{}' over {} files", self.program, files.len());

        let output = run_with_timeout(command, self.timeout)?;
        let mut violations = Vec::new();
        for line in output.stdout.lines() {
            if let Some(v) = parse_finding(line, &self.name) {
                violations.push(v);
            } else if line.starts_with(FINDING_PREFIX) {
                warn!("{}: ignoring malformed finding: {}", self.name, line);
            }
        }

        if !output.status.success() && violations.is_empty() {
            let stderr = output.stderr.lines().next().unwrap_or_default().trim();
            return Err(ComponentError::ExternalProcess {
                program: self.program.clone(),
                reason: format!("exited with {}: {}", output.status, stderr),
            });
        }

        Ok(ValidationResult::new(&self.name, violations).with_duration(start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_finding() {
        let v = parse_finding("axiom-v1|blocking|src/a.rs|12|unwrap in library | code", "lint").unwrap();
        assert_eq!(v.file_path(), "src/a.rs");
        assert_eq!(v.line(), Some(12));
        assert_eq!(v.severity(), Severity::Blocking);
        assert_eq!(v.message(), "unwrap in library | code");
        assert_eq!(v.validator(), "lint");
    }

    #[test]
    fn test_parse_without_line() {
        let v = parse_finding("axiom-v1|info|README.md||typo", "docs").unwrap();
        assert_eq!(v.line(), None);
    }

    #[test]
    fn test_parse_rejects_noise() {
        assert!(parse_finding("compiling...", "x").is_none());
        assert!(parse_finding("axiom-v1|fatal|a|1|m", "x").is_none());
        assert!(parse_finding("axiom-v1|info|a|abc|m", "x").is_none());
        assert!(parse_finding("axiom-v1|info|a|1", "x").is_none());
    }

    #[test]
    fn test_empty_command_rejected() {
        let err = CommandValidator::new("lint", ".", Vec::new()).unwrap_err();
        assert!(err.to_string().contains("validators.lint.command"));
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_program_over_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = "for f in \"$@\"; do echo \"axiom-v1|warning|$f|1|checked\"; done";
        let validator = CommandValidator::new(
            "lint",
            dir.path(),
            vec!["sh".into(), "-c".into(), script.into(), "sh".into()],
        )
        .unwrap();

        let result = validator
            .validate(&["a.rs".to_string(), "b.rs".to_string()])
            .unwrap();
        assert_eq!(result.violations.len(), 2);
        assert_eq!(result.violations[1].file_path(), "b.rs");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program_without_findings_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let validator = CommandValidator::new(
            "lint",
            dir.path(),
            vec!["sh".into(), "-c".into(), "echo boom >&2; exit 2".into(), "sh".into()],
        )
        .unwrap();

        let err = validator.validate(&["a.rs".to_string()]).unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
