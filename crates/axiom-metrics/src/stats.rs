//! Derived statistics and trend classification.

use crate::history::HistoryEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Runs per trend window.
pub const TREND_WINDOW: usize = 5;

/// Relative change beyond which a trend is not `stable`.
pub const TREND_THRESHOLD: f64 = 0.10;

/// Direction of run quality over recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Degrading,
    Stable,
}

impl Trend {
    /// Classifies `history` (oldest first).
    pub fn classify(history: &[HistoryEntry]) -> Self {
        if history.len() < 2 {
            return Trend::Stable;
        }

        let split = history.len().saturating_sub(TREND_WINDOW);
        let recent = &history[split..];
        let previous = &history[split.saturating_sub(TREND_WINDOW)..split];
        if previous.is_empty() {
            return Trend::Stable;
        }

        let avg_recent = mean_violations(recent);
        let avg_previous = mean_violations(previous);

        if avg_previous == 0.0 {
            return if avg_recent > 0.0 {
                Trend::Degrading
            } else {
                Trend::Stable
            };
        }

        let change = (avg_recent - avg_previous) / avg_previous;
        if change < -TREND_THRESHOLD {
            Trend::Improving
        } else if change > TREND_THRESHOLD {
            Trend::Degrading
        } else {
            Trend::Stable
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Improving => "improving",
            Trend::Degrading => "degrading",
            Trend::Stable => "stable",
        })
    }
}

fn mean_violations(window: &[HistoryEntry]) -> f64 {
    let total: usize = window.iter().map(|h| h.total_violations).sum();
    total as f64 / window.len() as f64
}

/// Aggregates over the retained history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_runs: usize,
    /// Mean violations per run, two decimals.
    pub avg_violations_per_run: f64,
    /// Percentage of runs without a blocking violation, one decimal.
    pub pass_rate: f64,
    pub most_common_validator: Option<String>,
    pub most_problematic_module: Option<String>,
    pub trend: Trend,
}

impl Statistics {
    /// Computes statistics, or `None` for an empty history.
    pub fn compute(history: &[HistoryEntry]) -> Option<Self> {
        if history.is_empty() {
            return None;
        }

        let total_runs = history.len();
        let total_violations: usize = history.iter().map(|h| h.total_violations).sum();
        let passing = history.iter().filter(|h| !h.had_blocking()).count();

        let mut validators: BTreeMap<&str, usize> = BTreeMap::new();
        let mut modules: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in history {
            for (name, count) in &entry.by_validator {
                *validators.entry(name.as_str()).or_insert(0) += count;
            }
            for (name, count) in &entry.by_module {
                *modules.entry(name.as_str()).or_insert(0) += count;
            }
        }

        Some(Self {
            total_runs,
            avg_violations_per_run: round_to(total_violations as f64 / total_runs as f64, 2),
            pass_rate: round_to(passing as f64 / total_runs as f64 * 100.0, 1),
            most_common_validator: arg_max(&validators),
            most_problematic_module: arg_max(&modules),
            trend: Trend::classify(history),
        })
    }
}

/// Highest count; ties go to the lexicographically first key.
fn arg_max(counts: &BTreeMap<&str, usize>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for (name, count) in counts {
        if best.map_or(true, |(_, top)| *count > top) {
            best = Some((*name, *count));
        }
    }
    best.map(|(name, _)| name.to_string())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(total: usize, blocking: usize) -> HistoryEntry {
        let mut by_severity = BTreeMap::new();
        if blocking > 0 {
            by_severity.insert("blocking".to_string(), blocking);
        }
        HistoryEntry {
            timestamp: Utc::now(),
            execution_time_ms: 1.0,
            total_violations: total,
            by_severity,
            by_validator: BTreeMap::new(),
            by_module: BTreeMap::new(),
        }
    }

    fn runs(counts: &[(usize, usize)]) -> Vec<HistoryEntry> {
        counts
            .iter()
            .flat_map(|&(n, total)| std::iter::repeat_with(move || entry(total, 0)).take(n))
            .collect()
    }

    #[test]
    fn test_trend_short_history_is_stable() {
        assert_eq!(Trend::classify(&[]), Trend::Stable);
        assert_eq!(Trend::classify(&runs(&[(1, 50)])), Trend::Stable);
        // Two runs but no prior window
        assert_eq!(Trend::classify(&runs(&[(1, 0), (1, 50)])), Trend::Stable);
    }

    #[test]
    fn test_trend_improving_then_degrading_then_stable() {
        let mut history = runs(&[(5, 15), (5, 5)]);
        assert_eq!(Trend::classify(&history), Trend::Improving);

        history.extend(runs(&[(5, 20)]));
        assert_eq!(Trend::classify(&history), Trend::Degrading);

        history.extend(runs(&[(5, 21)]));
        assert_eq!(Trend::classify(&history), Trend::Stable);
    }

    #[test]
    fn test_trend_from_zero_baseline() {
        assert_eq!(Trend::classify(&runs(&[(5, 0), (5, 1)])), Trend::Degrading);
        assert_eq!(Trend::classify(&runs(&[(5, 0), (5, 0)])), Trend::Stable);
    }

    #[test]
    fn test_partial_prior_window() {
        // Prior window holds 2 runs averaging 10; recent averages 5
        assert_eq!(Trend::classify(&runs(&[(2, 10), (5, 5)])), Trend::Improving);
    }

    #[test]
    fn test_statistics_values() {
        let history = vec![entry(3, 1), entry(0, 0), entry(1, 0)];
        let stats = Statistics::compute(&history).unwrap();

        assert_eq!(stats.total_runs, 3);
        assert_eq!(stats.avg_violations_per_run, 1.33);
        assert_eq!(stats.pass_rate, 66.7);
        assert_eq!(stats.trend, Trend::Stable);
        assert!(Statistics::compute(&[]).is_none());
    }

    #[test]
    fn test_arg_max_tie_breaks_lexicographically() {
        let mut counts = BTreeMap::new();
        counts.insert("naming", 4);
        counts.insert("boundary", 4);
        counts.insert("security", 1);
        assert_eq!(arg_max(&counts).as_deref(), Some("boundary"));
        assert_eq!(arg_max(&BTreeMap::new()), None);
    }
}
