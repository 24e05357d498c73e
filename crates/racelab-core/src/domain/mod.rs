//! # Domain Layer
//!
//! Pure types with no I/O and no async:
//!
//! - [`UnitId`] - validated work unit identifier (parse-once)
//! - [`WorkUnit`] - immutable simulated agent: id, latency, payload
//! - [`WorkUnitState`] - `not_started -> running -> appended`
//! - [`LogRecord`] - one entry of the shared log

pub mod identifiers;
pub mod record;
pub mod work_unit;

pub use identifiers::UnitId;
pub use record::LogRecord;
pub use work_unit::{WorkUnit, WorkUnitState};
