//! The shared, ordered log every work unit appends to.
//!
//! The log deliberately exposes its read-modify-write as two separate
//! operations, [`SharedLog::snapshot`] and [`SharedLog::store`]. Each call is
//! memory safe on its own (a short `RwLock` access), but nothing ties a
//! snapshot to the store that follows it. Two units that both snapshot before
//! either stores will each write back a sequence missing the other's record:
//! a lost update, with no undefined behaviour involved.
//!
//! [`SharedLog::exclusive`] hands out the single mutual-exclusion guard that
//! makes a snapshot/store pair atomic with respect to every other holder.
//! Only the guarded runner takes it.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::sync::RwLock;

use im::Vector;
use tokio::sync::{Mutex, MutexGuard};

use crate::{domain::LogRecord, Result};

/// Ordered sequence of [`LogRecord`]s shared by all units of one run.
///
/// Share it as `Arc<SharedLog>`; it is created empty and dropped with the run.
#[derive(Debug, Default)]
pub struct SharedLog {
    records: RwLock<Vector<LogRecord>>,
    exclusive: Mutex<()>,
}

impl SharedLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read step: a cheap structural-sharing copy of the current contents.
    ///
    /// # Errors
    ///
    /// Returns `Error::Execution` if the lock is poisoned
    pub fn snapshot(&self) -> Result<Vector<LogRecord>> {
        let records = self.records.read()?;
        Ok(records.clone())
    }

    /// Write step: replace the whole log with `records`.
    ///
    /// Whatever was stored since the caller's snapshot is discarded.
    ///
    /// # Errors
    ///
    /// Returns `Error::Execution` if the lock is poisoned
    pub fn store(&self, records: Vector<LogRecord>) -> Result<()> {
        let mut current = self.records.write()?;
        *current = records;
        drop(current); // Release lock early
        Ok(())
    }

    /// Acquire the log's mutual-exclusion guard.
    ///
    /// Hold it only around a snapshot/store pair, never across simulated
    /// latency.
    pub async fn exclusive(&self) -> MutexGuard<'_, ()> {
        self.exclusive.lock().await
    }

    /// Number of records currently stored.
    ///
    /// # Errors
    ///
    /// Returns `Error::Execution` if the lock is poisoned
    pub fn len(&self) -> Result<usize> {
        Ok(self.records.read()?.len())
    }

    /// Whether the log holds no records.
    ///
    /// # Errors
    ///
    /// Returns `Error::Execution` if the lock is poisoned
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.records.read()?.is_empty())
    }

    /// Final contents as an owned `Vec`, in log order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Execution` if the lock is poisoned
    pub fn into_records(self) -> Result<Vec<LogRecord>> {
        let records = self.records.into_inner()?;
        Ok(records.into_iter().collect())
    }
}
