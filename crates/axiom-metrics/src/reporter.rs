use crate::store::MetricsStore;
use axiom_model::{ComponentError, ReportResult, Reporter, Violation};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Reporter that records every run into a [`MetricsStore`].
///
/// A persistence failure is reported as an unsuccessful [`ReportResult`]
/// rather than an error, so it never affects the run decision.
#[derive(Debug, Clone)]
pub struct MetricsReporter {
    store: MetricsStore,
}

impl MetricsReporter {
    pub const NAME: &'static str = "metrics";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_store(MetricsStore::new(path))
    }

    pub fn with_store(store: MetricsStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &MetricsStore {
        &self.store
    }
}

impl Reporter for MetricsReporter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn report(
        &self,
        violations: &[Violation],
        total_duration: Duration,
    ) -> Result<ReportResult, ComponentError> {
        let start = Instant::now();
        match self.store.record(violations, total_duration) {
            Ok(document) => {
                if let Some(stats) = &document.statistics {
                    info!(
                        "Metrics updated: {} runs, pass rate {}%, trend {}",
                        stats.total_runs, stats.pass_rate, stats.trend
                    );
                }
                Ok(ReportResult::delivered(Self::NAME, start.elapsed()))
            }
            Err(e) => {
                error!("Failed to update metrics at {}: {}", self.store.path().display(), e);
                Ok(ReportResult::failed(Self::NAME, e.to_string(), start.elapsed()))
            }
        }
    }
}
