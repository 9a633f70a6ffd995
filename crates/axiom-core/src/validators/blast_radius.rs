use crate::registry::BuildContext;
use axiom_config::BlastRadiusSettings;
use axiom_model::{ComponentError, ValidationResult, Validator};
use axiom_policy::{PolicyEngine, ZoneSet};
use std::time::Instant;

/// Adapts the [`PolicyEngine`] to the validator contract.
#[derive(Debug, Clone)]
pub struct BlastRadiusValidator {
    name: String,
    engine: PolicyEngine,
}

impl BlastRadiusValidator {
    pub const FACTORY: &'static str = "blast_radius";

    pub fn new(name: impl Into<String>, engine: PolicyEngine) -> Self {
        Self {
            name: name.into(),
            engine,
        }
    }

    pub(crate) fn from_context(ctx: &BuildContext<'_>) -> Self {
        let settings = BlastRadiusSettings {
            enabled: true,
            ..ctx.config.blast_radius()
        };
        Self::new(ctx.key, PolicyEngine::new(settings, ZoneSet::from_config(ctx.config)))
    }
}

impl Validator for BlastRadiusValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, files: &[String]) -> Result<ValidationResult, ComponentError> {
        let start = Instant::now();
        let violations = self
            .engine
            .check_limits(files)
            .into_iter()
            .map(|finding| finding.into_violation(&self.name))
            .collect();
        Ok(ValidationResult::new(&self.name, violations).with_duration(start.elapsed()))
    }
}
