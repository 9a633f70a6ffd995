//! The pipeline controller.
//!
//! [`Sentinel`] wires the configuration store, component registry, policy
//! engine, override detector, fixers and reporters into one run and turns
//! the result into a [`Decision`].

use crate::{
    aggregate::AggregatedViolations,
    decision::{Decision, FixOutcome, RunOutcome},
    error::SentinelError,
    process::timeout_from_secs,
    registry::ComponentRegistry,
    vcs::{GitCli, VcsProvider},
    Result,
};

use axiom_config::{load_defaults, AxiomConfig, ConfigStore, DEFAULT_CONFIG_PATH};
use axiom_model::{FixResult, Fixer, Reporter, ValidationResult, Validator, Violation};
use axiom_policy::{OverrideDetector, OverrideResult};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// The AXIOM pre-commit orchestrator.
///
/// # Pipeline
///
/// 1. Discover changed files (empty ⇒ pass, nothing else runs)
/// 2. Load configuration (fatal on invalid documents)
/// 3. Instantiate enabled validators, reporters and fixers
/// 4. Validate on a bounded worker pool, isolating failures
/// 5. Aggregate by severity and validator
/// 6. Apply commit-message overrides
/// 7. Auto-fix, verify, then commit or roll back
/// 8. Report the final violation set to every reporter
/// 9. Decide
///
/// A validator that errors or panics contributes nothing to the run. A
/// reporter that errors or panics does not stop the others. Neither
/// affects the decision by itself.
///
/// # Example
///
/// ```rust,no_run
/// use axiom_core::Sentinel;
///
/// let outcome = Sentinel::new(".").run()?;
/// std::process::exit(outcome.exit_code());
/// # Ok::<(), axiom_core::SentinelError>(())
/// ```
pub struct Sentinel {
    root: PathBuf,
    config_path: PathBuf,
    dry_run: bool,
    vcs: Box<dyn VcsProvider>,
    registry: ComponentRegistry,
    store: Arc<ConfigStore>,
}

impl Sentinel {
    /// A Sentinel for the git working tree at `root`, using the built-in
    /// components and `<root>/axiom.config.yaml`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_path: root.join(DEFAULT_CONFIG_PATH),
            vcs: Box::new(GitCli::new(&root)),
            registry: ComponentRegistry::with_builtins(),
            store: Arc::new(ConfigStore::new()),
            dry_run: false,
            root,
        }
    }

    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn with_vcs(mut self, vcs: impl VcsProvider + 'static) -> Self {
        self.vcs = Box::new(vcs);
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_config_store(mut self, store: Arc<ConfigStore>) -> Self {
        self.store = store;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Runs the full pipeline once.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The changed-file set cannot be obtained
    /// - The configuration is invalid or names an unknown component
    /// - The validator worker pool cannot be built
    pub fn run(&self) -> Result<RunOutcome> {
        let start = Instant::now();

        // Phase 1: Discover
        let files = self.vcs.changed_files()?;
        if files.is_empty() {
            info!("No changed files, nothing to validate");
            return Ok(RunOutcome::empty(start.elapsed()));
        }
        info!("Validating {} changed files", files.len());

        // Phase 2: Configure
        let config = self.load_config()?;

        // Phase 3: Instantiate
        let validators = self.registry.build_validators(&self.root, &config)?;
        let reporters = self.registry.build_reporters(&self.root, &config)?;
        let mut fixers = self.registry.build_fixers(&self.root, &config)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.execution.worker_count())
            .thread_name(|i| format!("axiom-validator-{i}"))
            .build()
            .map_err(|e| SentinelError::WorkerPool(e.to_string()))?;
        debug!(
            "Instantiated {} validators, {} reporters, {} fixers",
            validators.len(),
            reporters.len(),
            fixers.len()
        );

        // Phases 4 and 5: Validate, Aggregate
        let (results, mut failed_validators) = run_validators(&pool, &validators, &files);
        let mut violations = AggregatedViolations::from_results(&results);

        // Phase 6: Override
        let overrides = self.detect_overrides(&config);
        let downgraded = violations.apply_overrides(&overrides);
        if downgraded > 0 {
            info!("Overrides downgraded {} blocking violations", downgraded);
        }

        // Phase 7: Auto-fix
        let fix = if fixers.is_empty() {
            FixOutcome::Skipped
        } else {
            let (fixed, outcome, failed) =
                auto_fix(&pool, &validators, &mut fixers, &files, &overrides, violations);
            violations = fixed;
            if let Some(failed) = failed {
                failed_validators = failed;
            }
            outcome
        };

        // Phase 8: Report
        let duration = start.elapsed();
        report(&reporters, &violations.all(), duration);

        // Phase 9: Decide
        let decision = Decision::decide(&violations, self.dry_run);
        match decision {
            Decision::Pass => info!("Decision: {}", decision),
            Decision::Fail { .. } => error!("Decision: {}", decision),
            Decision::DryRun { blocking } => {
                warn!("Dry run: {} blocking violations would have failed this commit", blocking)
            }
        }

        Ok(RunOutcome {
            decision,
            violations,
            files,
            overrides,
            fix,
            failed_validators,
            duration,
        })
    }

    fn load_config(&self) -> Result<Arc<AxiomConfig>> {
        match self.store.load(&self.config_path) {
            Ok(config) => Ok(config),
            Err(e) if !e.is_fatal() => {
                warn!("Configuration could not be read ({}), using built-in defaults", e);
                Ok(Arc::new(load_defaults()?))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn detect_overrides(&self, config: &AxiomConfig) -> OverrideResult {
        let timeout = timeout_from_secs(config.execution.command_timeout_secs);
        let message = match self.vcs.commit_message_within(timeout) {
            Ok(message) => message,
            Err(e) => {
                warn!("Could not read commit message, assuming none: {}", e);
                None
            }
        };

        let overrides = OverrideDetector::from_settings(&config.overrides).detect(message.as_deref());
        if !overrides.is_empty() {
            info!("Override keywords active: {}", overrides.keywords.join(", "));
        }
        overrides
    }
}

/// Runs every validator over `files` on `pool`.
///
/// Results keep validator order. Returns the successful results and the
/// names of validators that failed.
fn run_validators(
    pool: &ThreadPool,
    validators: &[Box<dyn Validator>],
    files: &[String],
) -> (Vec<ValidationResult>, Vec<String>) {
    let outcomes: Vec<std::result::Result<ValidationResult, String>> = pool.install(|| {
        validators
            .par_iter()
            .map(|validator| run_validator(validator.as_ref(), files))
            .collect()
    });

    let mut results = Vec::with_capacity(outcomes.len());
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(name) => failed.push(name),
        }
    }
    (results, failed)
}

fn run_validator(
    validator: &dyn Validator,
    files: &[String],
) -> std::result::Result<ValidationResult, String> {
    let name = validator.name().to_string();
    match panic::catch_unwind(AssertUnwindSafe(|| validator.validate(files))) {
        Ok(Ok(result)) => {
            debug!(
                validator = %name,
                violations = result.violations.len(),
                "Validator finished in {:?}",
                result.duration
            );
            Ok(result)
        }
        Ok(Err(e)) => {
            error!(validator = %name, "Validator failed, ignoring its result: {}", e);
            Err(name)
        }
        Err(payload) => {
            error!(
                validator = %name,
                "Validator panicked, ignoring its result: {}",
                panic_message(payload.as_ref())
            );
            Err(name)
        }
    }
}

/// Applies fixes, verifies them, and commits or rolls back.
///
/// Returns the final aggregation, the fix outcome, and the failed
/// validators of the full re-validation when one ran.
fn auto_fix(
    pool: &ThreadPool,
    validators: &[Box<dyn Validator>],
    fixers: &mut [Box<dyn Fixer>],
    files: &[String],
    overrides: &OverrideResult,
    before: AggregatedViolations,
) -> (AggregatedViolations, FixOutcome, Option<Vec<String>>) {
    let candidates = before.all();
    let mut touched = BTreeSet::new();

    for fixer in fixers.iter_mut() {
        let result = run_fixer(fixer.as_mut(), &candidates);
        if result.success {
            touched.extend(result.fixed_files);
        } else {
            warn!(
                fixer = %result.fixer,
                "Fixer failed and undid its changes: {}",
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if touched.is_empty() {
        debug!("Auto-fix changed nothing");
        return (before, FixOutcome::Skipped, None);
    }

    let touched: Vec<String> = touched.into_iter().collect();
    info!("Auto-fix modified {} files, verifying", touched.len());

    let (results, _) = run_validators(pool, validators, &touched);
    let mut check = AggregatedViolations::from_results(&results);
    check.apply_overrides(overrides);

    if check.has_blocking() {
        warn!(
            "Auto-fix introduced {} blocking violations, rolling back",
            check.blocking.len()
        );
        for fixer in fixers.iter_mut() {
            if let Err(e) = fixer.rollback() {
                error!(fixer = %fixer.name(), "Rollback failed: {}", e);
            }
        }
        return (before, FixOutcome::RolledBack { files: touched }, None);
    }

    for fixer in fixers.iter_mut() {
        if let Err(e) = fixer.commit() {
            error!(fixer = %fixer.name(), "Commit failed: {}", e);
        }
    }
    info!("Auto-fix committed, re-validating full changeset");

    let (results, failed) = run_validators(pool, validators, files);
    let mut after = AggregatedViolations::from_results(&results);
    after.apply_overrides(overrides);
    (after, FixOutcome::Committed { files: touched }, Some(failed))
}

fn run_fixer(fixer: &mut dyn Fixer, violations: &[Violation]) -> FixResult {
    let name = fixer.name().to_string();
    match panic::catch_unwind(AssertUnwindSafe(|| fixer.fix(violations))) {
        Ok(result) => result,
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            error!(fixer = %name, "Fixer panicked, rolling back: {}", reason);
            if let Err(e) = fixer.rollback() {
                error!(fixer = %name, "Rollback failed: {}", e);
            }
            FixResult::failed(name, format!("panicked: {reason}"), Duration::ZERO)
        }
    }
}

/// Delivers `violations` to every reporter in order.
fn report(reporters: &[Box<dyn Reporter>], violations: &[Violation], duration: Duration) {
    for reporter in reporters {
        let name = reporter.name();
        match panic::catch_unwind(AssertUnwindSafe(|| reporter.report(violations, duration))) {
            Ok(Ok(result)) if result.success => {
                debug!(reporter = %name, "Report delivered");
            }
            Ok(Ok(result)) => {
                warn!(
                    reporter = %name,
                    "Report not delivered: {}",
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            Ok(Err(e)) => error!(reporter = %name, "Reporter failed: {}", e),
            Err(payload) => {
                error!(reporter = %name, "Reporter panicked: {}", panic_message(payload.as_ref()))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
