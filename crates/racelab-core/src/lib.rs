//! # Racelab Core
//!
//! Small, honest demonstrations of what happens when independent workers
//! ("agents") share mutable state.
//!
//! A run feeds a fixed set of [`WorkUnit`]s into a fresh [`SharedLog`] under
//! one of three [`ExecutionMode`]s and returns a [`RunReport`] with the final
//! log, the elapsed time, and whether the log was corrupted:
//!
//! ```no_run
//! use racelab_core::{roster, run, DemoConfig, ExecutionMode};
//!
//! # async fn demo() -> racelab_core::Result<()> {
//! let config = DemoConfig::from_env()?;
//! let units = roster::generate(&config)?;
//! let report = run(&units, ExecutionMode::ParallelUnsafe, config.run_options()).await?;
//! println!("{} of {} appends survived", report.final_log.len(), units.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` / `expect()` / `panic!()` - returns `Result` instead
//! - No `unsafe` - the unsafe mode is a *logical* race, not a data race
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`]. A corrupted log is not an
//! error: it is the observation the demonstration exists to produce.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod audit;
pub mod config;
pub mod counter;
pub mod domain;
mod error;
pub mod harness;
pub mod mode;
pub mod roster;
mod serde_duration;
pub mod shared_log;
pub mod trials;

pub use audit::Audit;
pub use config::{DemoConfig, DemoConfigBuilder};
pub use counter::{run_counter, CounterMode, CounterReport, CounterPlan};
pub use domain::{LogRecord, UnitId, WorkUnit, WorkUnitState};
pub use error::{Error, Result};
pub use harness::{run, RunOptions, RunReport};
pub use mode::ExecutionMode;
pub use shared_log::SharedLog;
pub use trials::{compare_modes, run_trials, Comparison, ModeTiming, TrialSummary};
