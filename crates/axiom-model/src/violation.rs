//! The violation record and its classification enums.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Message prefix carried by violations softened through an override.
pub const OVERRIDDEN_PREFIX: &str = "[OVERRIDDEN]";

/// Opaque remediation payload, only interpreted by a matching fixer.
pub type FixPayload = BTreeMap<String, serde_json::Value>;

/// How strongly a finding affects the pass/fail decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails the run.
    Blocking,
    /// Reported, does not fail the run.
    Warning,
    /// Informational only.
    Info,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 3] = [Severity::Blocking, Severity::Warning, Severity::Info];

    /// Lowercase identifier used in documents and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Blocking => "blocking",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blocking" => Ok(Severity::Blocking),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Protection-zone tier.
///
/// Declaration order is classification precedence: a file matching both a
/// red and a green pattern belongs to red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneCategory {
    /// Core domain logic. Overflow is always blocking.
    Red,
    /// Sensitive infrastructure.
    Yellow,
    /// Everyday application code.
    Green,
}

impl ZoneCategory {
    /// Categories in classification order.
    pub const PRECEDENCE: [ZoneCategory; 3] =
        [ZoneCategory::Red, ZoneCategory::Yellow, ZoneCategory::Green];

    /// Lowercase identifier, as used in configuration keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneCategory::Red => "red",
            ZoneCategory::Yellow => "yellow",
            ZoneCategory::Green => "green",
        }
    }

    /// Capitalized label for human-readable messages.
    pub fn label(&self) -> &'static str {
        match self {
            ZoneCategory::Red => "Red",
            ZoneCategory::Yellow => "Yellow",
            ZoneCategory::Green => "Green",
        }
    }
}

impl fmt::Display for ZoneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(ZoneCategory::Red),
            "yellow" => Ok(ZoneCategory::Yellow),
            "green" => Ok(ZoneCategory::Green),
            other => Err(format!("unknown zone category '{other}'")),
        }
    }
}

/// Which policy dimension produced a violation.
///
/// Only policy findings carry a scope; override keywords can only soften
/// violations whose scope they cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyScope {
    /// The global changed-file threshold.
    Global,
    /// A per-category protection-zone limit.
    Zone(ZoneCategory),
}

/// One concrete finding from a check.
///
/// Fields are private: a violation is built once by its validator through
/// the `with_*` methods and then only read.
///
/// # Example
///
/// ```rust
/// use axiom_model::{Severity, Violation};
///
/// let v = Violation::new("src/lib.rs", "empty method body", Severity::Warning, "lazy_code")
///     .with_line(42)
///     .with_suggestion("implement or remove the method");
///
/// assert_eq!(v.line(), Some(42));
/// assert!(!v.is_blocking());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    file_path: String,
    message: String,
    severity: Severity,
    #[serde(rename = "validator_name")]
    validator: String,
    #[serde(rename = "line_number", default)]
    line: Option<u32>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    auto_fixable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fix_data: Option<FixPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    policy_scope: Option<PolicyScope>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Violation {
    /// Creates a violation with the mandatory fields.
    pub fn new(
        file_path: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        validator: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            message: message.into(),
            severity,
            validator: validator.into(),
            line: None,
            detail: None,
            suggestion: None,
            auto_fixable: false,
            fix_data: None,
            policy_scope: None,
        }
    }

    /// Sets the 1-based line number.
    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Attaches detail text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attaches a remediation suggestion for humans.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Marks the violation auto-fixable with the given payload.
    #[must_use]
    pub fn with_fix(mut self, payload: FixPayload) -> Self {
        self.auto_fixable = true;
        self.fix_data = Some(payload);
        self
    }

    /// Tags the violation with the policy dimension that produced it.
    #[must_use]
    pub fn with_scope(mut self, scope: PolicyScope) -> Self {
        self.policy_scope = Some(scope);
        self
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Identity of the validator that produced this finding.
    pub fn validator(&self) -> &str {
        &self.validator
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    pub fn auto_fixable(&self) -> bool {
        self.auto_fixable
    }

    pub fn fix_data(&self) -> Option<&FixPayload> {
        self.fix_data.as_ref()
    }

    pub fn policy_scope(&self) -> Option<PolicyScope> {
        self.policy_scope
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }

    /// True when a fixer that understands `payload_key` may act on this
    /// violation: auto-fixable, not blocking, and carrying that key.
    pub fn is_fix_candidate(&self, payload_key: &str) -> bool {
        self.auto_fixable
            && !self.is_blocking()
            && self
                .fix_data
                .as_ref()
                .is_some_and(|data| data.contains_key(payload_key))
    }

    /// Returns a warning-severity copy annotated as overridden.
    ///
    /// The receiver is left untouched.
    #[must_use]
    pub fn overridden(&self) -> Self {
        Self {
            message: format!("{} {}", OVERRIDDEN_PREFIX, self.message),
            severity: Severity::Warning,
            ..self.clone()
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.as_str().to_uppercase(), self.file_path)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        write!(f, " - {}", self.message)
    }
}
