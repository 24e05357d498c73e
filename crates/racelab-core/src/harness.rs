//! Runs work units against a fresh [`SharedLog`] under an [`ExecutionMode`].
//!
//! Every unit does the same two things:
//!
//! 1. Simulated call: `tokio::time::sleep(latency)`. Never under any lock.
//! 2. Read-modify-write on the log: snapshot, suspend for the interleave
//!    window, append its record to the snapshot, store the snapshot back.
//!
//! The modes differ only in scheduling and in whether step 2 runs under the
//! log's exclusive guard:
//!
//! | Mode               | Scheduling        | Step 2 guarded | Elapsed (approx.)           |
//! |--------------------|-------------------|----------------|-----------------------------|
//! | `sequential`       | one after another | not needed     | sum(latency + window)       |
//! | `parallel-unsafe`  | all spawned       | no             | max(latency) + window       |
//! | `parallel-guarded` | all spawned       | yes            | max(latency) + N * window   |
//!
//! Timing uses `tokio::time::Instant`, so runs on a paused test clock are
//! deterministic.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use serde::Serialize;
use tokio::{
    task::JoinSet,
    time::{sleep, Instant},
};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::{
    audit::Audit,
    domain::{LogRecord, UnitId, WorkUnit, WorkUnitState},
    mode::ExecutionMode,
    shared_log::SharedLog,
    Error, Result,
};

/// Knobs that apply to every unit of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOptions {
    /// Suspension between a unit's snapshot and its store.
    pub window: Duration,
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: ExecutionMode,
    /// Unit ids in the order they were fed in.
    pub units: Vec<UnitId>,
    pub final_log: Vec<LogRecord>,
    #[serde(rename = "elapsed_ms", serialize_with = "crate::serde_duration::serialize")]
    pub elapsed: Duration,
    pub corruption_detected: bool,
    pub audit: Audit,
    pub states: BTreeMap<UnitId, WorkUnitState>,
}

impl RunReport {
    /// Distinct payloads present in the final log.
    #[must_use]
    pub fn payloads(&self) -> BTreeSet<&str> {
        self.final_log.iter().map(|r| r.payload.as_str()).collect()
    }
}

/// Per-unit lifecycle bookkeeping.
///
/// Always locked: it records what happened, it is not the resource under
/// study.
#[derive(Debug)]
struct StatusBoard {
    states: Mutex<BTreeMap<UnitId, WorkUnitState>>,
}

impl StatusBoard {
    fn new(units: &[WorkUnit]) -> Self {
        let states = units
            .iter()
            .map(|unit| (unit.id().clone(), WorkUnitState::NotStarted))
            .collect();
        Self {
            states: Mutex::new(states),
        }
    }

    fn advance(&self, id: &UnitId, next: WorkUnitState) -> Result<()> {
        let mut states = self.states.lock()?;
        let current = states
            .get_mut(id)
            .ok_or_else(|| Error::execution(format!("unit '{id}' is not on the board")))?;
        *current = current.transition(next)?;
        drop(states); // Release lock early
        Ok(())
    }

    fn snapshot(&self) -> Result<BTreeMap<UnitId, WorkUnitState>> {
        Ok(self.states.lock()?.clone())
    }
}

/// Reject inputs the demonstration cannot run with.
///
/// Latency is already positive by construction of [`WorkUnit`].
fn validate(units: &[WorkUnit]) -> Result<()> {
    if units.is_empty() {
        return Err(Error::invalid_input("at least one work unit is required"));
    }
    let mut seen = HashSet::with_capacity(units.len());
    if let Some(duplicate) = units.iter().find(|unit| !seen.insert(unit.id())) {
        return Err(Error::invalid_input(format!(
            "duplicate work unit id '{}'",
            duplicate.id()
        )));
    }
    Ok(())
}

/// Execute `units` against a new shared log and report what happened.
///
/// # Errors
///
/// - `Error::InvalidInput` before anything runs, for an empty or
///   duplicate-id input.
/// - `Error::Execution` if a worker task panics or a lock is poisoned.
///
/// A corrupted log is not an error; see [`RunReport::corruption_detected`].
pub async fn run(
    units: &[WorkUnit],
    mode: ExecutionMode,
    options: RunOptions,
) -> Result<RunReport> {
    validate(units)?;

    let span = info_span!("run", %mode, units = units.len());
    async move {
        let log = Arc::new(SharedLog::new());
        let board = Arc::new(StatusBoard::new(units));

        let started = Instant::now();
        if mode.is_concurrent() {
            let guarded = mode.guarantees_integrity();
            run_concurrently(units, &log, &board, guarded, options.window).await?;
        } else {
            for unit in units {
                execute_unit(unit.clone(), &log, &board, false, options.window).await?;
            }
        }
        let elapsed = started.elapsed();

        // Every mode stores at least once; lost updates shrink the log, never empty it.
        if log.is_empty()? {
            return Err(Error::execution("no unit stored to the shared log"));
        }
        let stored = log.len()?;
        debug!(stored, "run finished");

        let states = board.snapshot()?;
        if let Some((id, state)) = states.iter().find(|(_, state)| !state.is_terminal()) {
            return Err(Error::execution(format!(
                "unit '{id}' finished the run in state {state}"
            )));
        }

        let final_log: Vec<LogRecord> = log.snapshot()?.into_iter().collect();
        let audit = Audit::inspect(units, &final_log);
        let corruption_detected = audit.corruption_detected();

        if corruption_detected {
            warn!(
                expected = audit.expected,
                observed = audit.observed,
                lost = audit.lost_updates(),
                "shared log corrupted: appends were lost"
            );
        } else {
            info!(
                entries = audit.observed,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                "shared log complete"
            );
        }

        Ok(RunReport {
            mode,
            units: units.iter().map(|unit| unit.id().clone()).collect(),
            final_log,
            elapsed,
            corruption_detected,
            audit,
            states,
        })
    }
    .instrument(span)
    .await
}

async fn run_concurrently(
    units: &[WorkUnit],
    log: &Arc<SharedLog>,
    board: &Arc<StatusBoard>,
    guarded: bool,
    window: Duration,
) -> Result<()> {
    let mut tasks = JoinSet::new();
    for unit in units {
        let unit = unit.clone();
        let log = Arc::clone(log);
        let board = Arc::clone(board);
        tasks.spawn(
            async move { execute_unit(unit, &log, &board, guarded, window).await }
                .in_current_span(),
        );
    }

    while let Some(joined) = tasks.join_next().await {
        joined??;
    }
    Ok(())
}

async fn execute_unit(
    unit: WorkUnit,
    log: &SharedLog,
    board: &StatusBoard,
    guarded: bool,
    window: Duration,
) -> Result<()> {
    board.advance(unit.id(), WorkUnitState::Running)?;
    let started = Instant::now();
    info!(unit = %unit.id(), latency_ms = unit.latency().as_secs_f64() * 1000.0, "starting work");

    simulate_call(&unit).await;

    if guarded {
        let _exclusive = log.exclusive().await;
        read_modify_write(log, &unit, window).await?;
    } else {
        read_modify_write(log, &unit, window).await?;
    }

    board.advance(unit.id(), WorkUnitState::Appended)?;
    info!(
        unit = %unit.id(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "finished work"
    );
    Ok(())
}

/// Stand-in for an I/O-bound call, such as a model request.
async fn simulate_call(unit: &WorkUnit) {
    sleep(unit.latency()).await;
}

/// Snapshot, suspend, append, store: four steps, no atomicity of its own.
async fn read_modify_write(log: &SharedLog, unit: &WorkUnit, window: Duration) -> Result<()> {
    let mut records = log.snapshot()?;
    let position = records.len();
    debug!(unit = %unit.id(), position, "read snapshot");

    if !window.is_zero() {
        sleep(window).await;
    }

    records.push_back(LogRecord::for_unit(unit, position));
    let written = records.len();
    log.store(records)?;
    debug!(unit = %unit.id(), written, "stored log");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(count: usize, latency: Duration) -> Result<Vec<WorkUnit>> {
        (0..count)
            .map(|i| {
                let id = UnitId::parse(format!("agent-{i}"))?;
                let payload = format!("{id}: result");
                WorkUnit::new(id, latency, payload)
            })
            .collect()
    }

    fn window(ms: u64) -> RunOptions {
        RunOptions {
            window: Duration::from_millis(ms),
        }
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let result = run(&[], ExecutionMode::Sequential, RunOptions::default()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected() -> Result<()> {
        let mut input = units(2, Duration::from_millis(1))?;
        input.push(input[0].clone());
        let result = run(&input, ExecutionMode::ParallelGuarded, window(1)).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_is_complete_and_ordered() -> Result<()> {
        let input = units(4, Duration::from_millis(100))?;
        let report = run(&input, ExecutionMode::Sequential, window(10)).await?;

        assert!(!report.corruption_detected);
        assert_eq!(report.final_log.len(), 4);
        let order: Vec<_> = report.final_log.iter().map(|r| r.unit.clone()).collect();
        assert_eq!(order, report.units);
        assert_eq!(report.audit.position_mismatches, 0);
        assert!(report.elapsed >= Duration::from_millis(440));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsafe_with_identical_latencies_loses_updates() -> Result<()> {
        let input = units(5, Duration::from_millis(100))?;
        let report = run(&input, ExecutionMode::ParallelUnsafe, window(10)).await?;

        assert!(report.corruption_detected);
        assert!(report.final_log.len() < 5);
        assert!(report.elapsed < Duration::from_millis(200));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_guarded_keeps_every_append() -> Result<()> {
        let input = units(5, Duration::from_millis(100))?;
        let report = run(&input, ExecutionMode::ParallelGuarded, window(10)).await?;

        assert!(!report.corruption_detected);
        assert_eq!(report.final_log.len(), 5);
        assert_eq!(report.audit.position_mismatches, 0);
        // latency overlaps, the critical sections queue up
        assert!(report.elapsed >= Duration::from_millis(150));
        assert!(report.elapsed < Duration::from_millis(500));
        Ok(())
    }

    #[tokio::test]
    async fn test_every_unit_ends_appended() -> Result<()> {
        let input = units(3, Duration::from_millis(2))?;
        for mode in [
            ExecutionMode::Sequential,
            ExecutionMode::ParallelUnsafe,
            ExecutionMode::ParallelGuarded,
        ] {
            let report = run(&input, mode, window(1)).await?;
            assert_eq!(report.states.len(), 3);
            assert!(report
                .states
                .values()
                .all(|state| *state == WorkUnitState::Appended));
        }
        Ok(())
    }

    #[test]
    fn test_board_rejects_unknown_unit() -> Result<()> {
        let board = StatusBoard::new(&units(1, Duration::from_millis(1))?);
        let stranger = UnitId::parse("stranger")?;
        assert!(board.advance(&stranger, WorkUnitState::Running).is_err());
        Ok(())
    }

    #[test]
    fn test_board_rejects_double_start() -> Result<()> {
        let input = units(1, Duration::from_millis(1))?;
        let board = StatusBoard::new(&input);
        board.advance(input[0].id(), WorkUnitState::Running)?;
        let again = board.advance(input[0].id(), WorkUnitState::Running);
        assert!(matches!(again, Err(Error::InvalidTransition { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_report_serializes_elapsed_ms() -> Result<()> {
        let input = units(1, Duration::from_millis(1))?;
        let report = run(&input, ExecutionMode::Sequential, window(0)).await?;
        let json = serde_json::to_value(&report).map_err(|e| Error::execution(e.to_string()))?;
        assert_eq!(json["mode"], "sequential");
        assert!(json["elapsed_ms"].as_f64().is_some_and(|ms| ms >= 1.0));
        assert_eq!(json["states"]["agent-0"], "appended");
        Ok(())
    }

    #[test]
    fn test_zero_window_on_current_thread_never_interleaves() -> Result<()> {
        // No suspension between snapshot and store: a single-threaded
        // scheduler cannot switch tasks inside the read-modify-write.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| Error::execution(e.to_string()))?;
        let input = units(16, Duration::from_millis(1))?;

        for _ in 0..20 {
            let report = runtime.block_on(run(&input, ExecutionMode::ParallelUnsafe, window(0)))?;
            assert!(!report.corruption_detected);
            assert_eq!(report.final_log.len(), 16);
        }
        Ok(())
    }
}
