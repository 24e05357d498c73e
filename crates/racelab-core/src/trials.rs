//! Repeated runs and side-by-side mode comparison.
//!
//! A single unsafe run proves nothing either way; the race shows up as a
//! rate across trials. Comparison runs every mode over the same units and
//! expresses each elapsed time as a speedup over `sequential`.

use std::time::Duration;

use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::info;

use crate::{
    domain::WorkUnit,
    harness::{run, RunOptions, RunReport},
    mode::ExecutionMode,
    Error, Result,
};

/// Aggregate over repeated runs of one mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialSummary {
    pub mode: ExecutionMode,
    pub trials: usize,
    pub corrupted_runs: usize,
    pub expected_len: usize,
    pub min_observed_len: usize,
    pub max_observed_len: usize,
    pub lost_updates: usize,
    #[serde(rename = "mean_elapsed_ms", serialize_with = "crate::serde_duration::serialize")]
    pub mean_elapsed: Duration,
}

impl TrialSummary {
    /// Fraction of trials whose log was corrupted, in `[0, 1]`.
    #[must_use]
    pub fn corruption_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.corrupted_runs as f64 / self.trials as f64
        }
    }
}

/// Run `mode` `trials` times over the same units.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if `trials` is zero, plus anything
/// [`run`] returns.
pub async fn run_trials(
    units: &[WorkUnit],
    mode: ExecutionMode,
    options: RunOptions,
    trials: usize,
) -> Result<TrialSummary> {
    if trials == 0 {
        return Err(Error::invalid_input("trials must be at least 1"));
    }

    let mut reports = Vec::with_capacity(trials);
    for trial in 1..=trials {
        let report = run(units, mode, options).await?;
        info!(
            trial,
            corrupted = report.corruption_detected,
            entries = report.final_log.len(),
            "trial finished"
        );
        reports.push(report);
    }

    Ok(summarize(mode, units.len(), &reports))
}

fn summarize(mode: ExecutionMode, expected_len: usize, reports: &[RunReport]) -> TrialSummary {
    let lengths = reports.iter().map(|r| r.final_log.len());
    let total_elapsed: Duration = reports.iter().map(|r| r.elapsed).sum();
    let count = u32::try_from(reports.len()).unwrap_or(u32::MAX).max(1);

    TrialSummary {
        mode,
        trials: reports.len(),
        corrupted_runs: reports.iter().filter(|r| r.corruption_detected).count(),
        expected_len,
        min_observed_len: lengths.clone().min().unwrap_or(0),
        max_observed_len: lengths.max().unwrap_or(0),
        lost_updates: reports.iter().map(|r| r.audit.lost_updates()).sum(),
        mean_elapsed: total_elapsed / count,
    }
}

/// One row of a [`Comparison`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeTiming {
    pub mode: ExecutionMode,
    #[serde(rename = "elapsed_ms", serialize_with = "crate::serde_duration::serialize")]
    pub elapsed: Duration,
    pub corruption_detected: bool,
    pub observed_len: usize,
    /// `sequential.elapsed / self.elapsed`
    pub speedup: f64,
}

/// All three modes over identical input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub expected_len: usize,
    pub timings: Vec<ModeTiming>,
}

impl Comparison {
    /// Row for `mode`, if it was run.
    #[must_use]
    pub fn timing(&self, mode: ExecutionMode) -> Option<&ModeTiming> {
        self.timings.iter().find(|t| t.mode == mode)
    }
}

/// Run every mode once, sequential first, and compute speedups.
pub async fn compare_modes(units: &[WorkUnit], options: RunOptions) -> Result<Comparison> {
    let mut reports = Vec::new();
    for mode in ExecutionMode::iter() {
        reports.push(run(units, mode, options).await?);
    }

    let baseline = reports
        .iter()
        .find(|r| r.mode == ExecutionMode::Sequential)
        .map(|r| r.elapsed.as_secs_f64())
        .ok_or_else(|| Error::execution("sequential baseline missing"))?;

    let timings = reports
        .into_iter()
        .map(|report| {
            let elapsed = report.elapsed.as_secs_f64();
            ModeTiming {
                mode: report.mode,
                elapsed: report.elapsed,
                corruption_detected: report.corruption_detected,
                observed_len: report.final_log.len(),
                speedup: if elapsed > 0.0 { baseline / elapsed } else { 0.0 },
            }
        })
        .collect();

    Ok(Comparison {
        expected_len: units.len(),
        timings,
    })
}
