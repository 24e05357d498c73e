use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{UnitId, WorkUnit};

/// One entry of the shared log.
///
/// `position` is the log length the writer *observed when it read*, so in a
/// healthy log it equals the record's final index. A mismatch means someone
/// else wrote between this unit's read and its write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub unit: UnitId,
    pub payload: String,
    pub position: usize,
    pub written_at: DateTime<Utc>,
}

impl LogRecord {
    /// Build the record `unit` writes after observing `position` entries.
    #[must_use]
    pub fn for_unit(unit: &WorkUnit, position: usize) -> Self {
        Self {
            unit: unit.id().clone(),
            payload: unit.payload().to_string(),
            position,
            written_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::Result;

    #[test]
    fn test_record_copies_unit_fields() -> Result<()> {
        let unit = WorkUnit::new(
            UnitId::parse("Critic")?,
            Duration::from_millis(5),
            "Critic: review",
        )?;
        let record = LogRecord::for_unit(&unit, 3);
        assert_eq!(record.unit, *unit.id());
        assert_eq!(record.payload, "Critic: review");
        assert_eq!(record.position, 3);
        Ok(())
    }
}
