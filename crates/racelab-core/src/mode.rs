//! Execution modes of the demonstrator.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, VariantNames};

/// How a run schedules its work units against the shared log.
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
pub enum ExecutionMode {
    /// One unit at a time; total order, no contention.
    Sequential,
    /// All units at once; unguarded read-modify-write may lose updates.
    ParallelUnsafe,
    /// All units at once; read-modify-write under the log's exclusive guard.
    ParallelGuarded,
}

impl ExecutionMode {
    /// Whether units overlap in time.
    #[must_use]
    pub const fn is_concurrent(self) -> bool {
        !matches!(self, Self::Sequential)
    }

    /// Whether the run is expected to preserve every append.
    #[must_use]
    pub const fn guarantees_integrity(self) -> bool {
        !matches!(self, Self::ParallelUnsafe)
    }
}
