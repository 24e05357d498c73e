//! Post-run inspection of a shared log.
//!
//! The corruption verdict is exactly: the log length differs from the number
//! of units, or some unit's payload is absent. Position mismatches (a record
//! whose observed index differs from its final index) are reported next to
//! it as the visible trace of an interleaved read-modify-write, but they do
//! not change the verdict.

use itertools::Itertools;
use serde::Serialize;

use crate::domain::{LogRecord, UnitId, WorkUnit};

/// What a finished log says about the run that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Audit {
    pub expected: usize,
    pub observed: usize,
    /// Units whose payload never made it into the final log.
    pub missing: Vec<UnitId>,
    /// Payloads present more than once.
    pub duplicated: Vec<String>,
    pub position_mismatches: usize,
}

impl Audit {
    /// Compare the final `records` against the `units` that wrote them.
    #[must_use]
    pub fn inspect(units: &[WorkUnit], records: &[LogRecord]) -> Self {
        let counts = records.iter().map(|r| r.payload.as_str()).counts();

        let missing = units
            .iter()
            .filter(|unit| !counts.contains_key(unit.payload()))
            .map(|unit| unit.id().clone())
            .collect();

        let duplicated = counts
            .iter()
            .filter(|&(_, &n)| n > 1)
            .map(|(payload, _)| (*payload).to_string())
            .sorted()
            .collect();

        let position_mismatches = records
            .iter()
            .enumerate()
            .filter(|(index, record)| record.position != *index)
            .count();

        Self {
            expected: units.len(),
            observed: records.len(),
            missing,
            duplicated,
            position_mismatches,
        }
    }

    /// `observed != expected || any payload missing`
    #[must_use]
    pub fn corruption_detected(&self) -> bool {
        self.observed != self.expected || !self.missing.is_empty()
    }

    /// Appends that were overwritten away.
    #[must_use]
    pub const fn lost_updates(&self) -> usize {
        self.expected.saturating_sub(self.observed)
    }
}
