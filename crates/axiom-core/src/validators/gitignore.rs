use crate::registry::BuildContext;
use axiom_config::ConfigurationError;
use axiom_fixer::MISSING_ENTRIES_KEY;
use axiom_model::{ComponentError, FixPayload, Severity, ValidationResult, Validator, Violation};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// Entries required when none are configured.
pub const DEFAULT_REQUIRED_ENTRIES: [&str; 4] = [".env", "*.log", "node_modules", "target"];

const GITIGNORE: &str = ".gitignore";

/// Checks the project `.gitignore` for required entries.
///
/// Runs on every invocation regardless of which files changed. A missing
/// `.gitignore` is blocking. Missing entries are reported at the configured
/// severity and, unless that severity is blocking, carry a fix payload the
/// `simple` fixer can apply.
#[derive(Debug, Clone)]
pub struct GitignoreValidator {
    name: String,
    root: PathBuf,
    required: Vec<String>,
    severity: Severity,
}

impl GitignoreValidator {
    pub const FACTORY: &'static str = "gitignore";

    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            required: DEFAULT_REQUIRED_ENTRIES.iter().map(|s| s.to_string()).collect(),
            severity: Severity::Warning,
        }
    }

    #[must_use]
    pub fn with_required(mut self, required: Vec<String>) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub(crate) fn from_context(ctx: &BuildContext<'_>) -> Result<Self, ConfigurationError> {
        let prefix = ctx.prefix("validators");
        let mut validator = Self::new(ctx.key, ctx.root);
        if let Some(required) = ctx.settings.option::<Vec<String>>(&prefix, "required_entries")? {
            validator = validator.with_required(required);
        }
        if let Some(severity) = ctx.settings.option::<Severity>(&prefix, "severity")? {
            validator = validator.with_severity(severity);
        }
        Ok(validator)
    }

    fn missing_file(&self) -> Violation {
        Violation::new(GITIGNORE, "Missing .gitignore file", Severity::Blocking, &self.name)
            .with_suggestion(format!(
                "Create a .gitignore containing at least: {}",
                self.required.join(", ")
            ))
    }

    fn missing_entries(&self, missing: Vec<String>) -> Violation {
        let mut violation = Violation::new(
            GITIGNORE,
            format!("Missing .gitignore entries: {}", missing.join(", ")),
            self.severity,
            &self.name,
        )
        .with_suggestion("Add the missing entries to .gitignore");

        if self.severity != Severity::Blocking {
            let mut payload = FixPayload::new();
            payload.insert(MISSING_ENTRIES_KEY.to_string(), serde_json::json!(missing));
            violation = violation.with_fix(payload);
        }
        violation
    }
}

/// Normalizes a pattern so `/target`, `target/` and `target` compare equal.
fn normalize(entry: &str) -> &str {
    entry.trim().trim_start_matches('/').trim_end_matches('/')
}

impl Validator for GitignoreValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, _files: &[String]) -> Result<ValidationResult, ComponentError> {
        let start = Instant::now();
        let path = self.root.join(GITIGNORE);

        if !path.is_file() {
            return Ok(ValidationResult::new(&self.name, vec![self.missing_file()])
                .with_duration(start.elapsed()));
        }

        let content = fs::read_to_string(&path)?;
        let present: BTreeSet<&str> = content
            .lines()
            .map(normalize)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|entry| !present.contains(normalize(entry)))
            .cloned()
            .collect();

        let violations = if missing.is_empty() {
            Vec::new()
        } else {
            vec![self.missing_entries(missing)]
        };
        Ok(ValidationResult::new(&self.name, violations).with_duration(start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_blocking() {
        let dir = TempDir::new().unwrap();
        let result = GitignoreValidator::new("gitignore", dir.path()).validate(&[]).unwrap();

        assert_eq!(result.violations.len(), 1);
        assert!(result.violations[0].is_blocking());
        assert!(!result.violations[0].auto_fixable());
    }

    #[test]
    fn test_missing_entries_are_fixable() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "/target/\n*.log\n").unwrap();

        let result = GitignoreValidator::new("gitignore", dir.path()).validate(&[]).unwrap();
        assert_eq!(result.violations.len(), 1);
        let v = &result.violations[0];
        assert_eq!(v.severity(), Severity::Warning);
        assert!(v.is_fix_candidate(MISSING_ENTRIES_KEY));
        assert_eq!(
            v.fix_data().unwrap()[MISSING_ENTRIES_KEY],
            serde_json::json!([".env", "node_modules"])
        );
    }

    #[test]
    fn test_complete_file_is_clean() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), ".env\n*.log\nnode_modules/\ntarget\n").unwrap();

        let result = GitignoreValidator::new("gitignore", dir.path()).validate(&[]).unwrap();
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_blocking_severity_has_no_payload() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "").unwrap();

        let result = GitignoreValidator::new("gitignore", dir.path())
            .with_required(vec![".env".to_string()])
            .with_severity(Severity::Blocking)
            .validate(&[])
            .unwrap();
        assert!(result.violations[0].is_blocking());
        assert!(result.violations[0].fix_data().is_none());
    }
}
