//! Lost-update counter on OS threads.
//!
//! The same race as the shared log, stripped down to an integer and moved
//! from cooperative tasks to preemptive threads. Each of `threads` workers
//! increments a shared counter `increments` times:
//!
//! - `unsafe`: atomic `load`, yield, atomic `store(value + 1)`. Each access
//!   is sound; the increment is not.
//! - `guarded`: the increment runs under a `std::sync::Mutex`.
//! - `atomic`: a single `fetch_add`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, VariantNames};
use tracing::{info, warn};

use crate::{Error, Result};

/// How each increment touches the shared counter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    EnumIter,
    VariantNames,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CounterMode {
    Unsafe,
    Guarded,
    Atomic,
}

/// Upper bound on `CounterPlan::threads`.
pub const MAX_THREADS: usize = 256;

/// Shape of one counter run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterPlan {
    pub threads: usize,
    pub increments: u64,
    pub mode: CounterMode,
}

impl Default for CounterPlan {
    fn default() -> Self {
        Self {
            threads: 10,
            increments: 5000,
            mode: CounterMode::Unsafe,
        }
    }
}

/// Outcome of one counter run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterReport {
    pub mode: CounterMode,
    pub threads: usize,
    pub expected: u64,
    pub actual: u64,
    #[serde(rename = "elapsed_ms", serialize_with = "crate::serde_duration::serialize")]
    pub elapsed: Duration,
}

impl CounterReport {
    #[must_use]
    pub const fn lost(&self) -> u64 {
        self.expected.saturating_sub(self.actual)
    }

    /// Lost increments as a percentage of expected.
    #[must_use]
    pub fn loss_percentage(&self) -> f64 {
        if self.expected == 0 {
            0.0
        } else {
            self.lost() as f64 / self.expected as f64 * 100.0
        }
    }
}

/// Run `plan.threads` threads of `plan.increments` increments each.
///
/// # Errors
///
/// - `Error::InvalidInput` for zero threads, more than [`MAX_THREADS`]
///   threads, or zero increments.
/// - `Error::Execution` if the OS refuses to start a worker thread.
/// - `Error::Execution` if a worker thread panics or the mutex is poisoned.
pub fn run_counter(plan: CounterPlan) -> Result<CounterReport> {
    if plan.threads == 0 {
        return Err(Error::invalid_input("threads must be at least 1"));
    }
    if plan.threads > MAX_THREADS {
        return Err(Error::invalid_input(format!(
            "threads must be at most {MAX_THREADS}"
        )));
    }
    if plan.increments == 0 {
        return Err(Error::invalid_input("increments must be at least 1"));
    }
    let threads = u64::try_from(plan.threads)
        .map_err(|_| Error::invalid_input("too many threads"))?;
    let expected = threads
        .checked_mul(plan.increments)
        .ok_or_else(|| Error::invalid_input("threads * increments overflows u64"))?;

    info!(mode = %plan.mode, threads = plan.threads, increments = plan.increments, "counter start");
    let started = Instant::now();
    let actual = match plan.mode {
        CounterMode::Unsafe => {
            let counter = AtomicU64::new(0);
            spawn_workers(plan, || {
                let current = counter.load(Ordering::SeqCst);
                thread::yield_now();
                counter.store(current + 1, Ordering::SeqCst);
                Ok(())
            })?;
            counter.into_inner()
        }
        CounterMode::Guarded => {
            let counter = Mutex::new(0_u64);
            spawn_workers(plan, || {
                let mut value = counter.lock()?;
                let current = *value;
                thread::yield_now();
                *value = current + 1;
                drop(value);
                Ok(())
            })?;
            counter.into_inner()?
        }
        CounterMode::Atomic => {
            let counter = AtomicU64::new(0);
            spawn_workers(plan, || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })?;
            counter.into_inner()
        }
    };
    let report = CounterReport {
        mode: plan.mode,
        threads: plan.threads,
        expected,
        actual,
        elapsed: started.elapsed(),
    };

    if report.lost() > 0 {
        warn!(lost = report.lost(), "counter lost increments");
    }
    Ok(report)
}

fn spawn_workers<F>(plan: CounterPlan, increment: F) -> Result<()>
where
    F: Fn() -> Result<()> + Sync,
{
    thread::scope(|scope| {
        // Threads spawned before a failure are joined when the scope ends.
        let workers = (0..plan.threads)
            .map(|index| {
                thread::Builder::new()
                    .name(format!("counter-{index}"))
                    .spawn_scoped(scope, || {
                        (0..plan.increments).try_for_each(|_| increment())
                    })
                    .map_err(|e| Error::execution(format!("failed to spawn counter thread: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        workers.into_iter().try_for_each(|worker| {
            worker
                .join()
                .map_err(|_| Error::execution("counter thread panicked"))?
        })
    })
}
