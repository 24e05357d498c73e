//! Work units and their lifecycle.
//!
//! # State Machine
//!
//! ```text
//! not_started -> running -> appended
//! ```
//!
//! `appended` is terminal. There are no retries and no failure states: a unit
//! that reached `appended` *attempted* its write, whether or not the write
//! survived a concurrent overwrite.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::UnitId;
use crate::{Error, Result};

/// Lifecycle state of a single work unit during one run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkUnitState {
    #[default]
    NotStarted,
    Running,
    Appended,
}

impl WorkUnitState {
    /// Returns true if no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Appended)
    }

    /// Returns true if a transition from `self` to `next` is valid.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Running) | (Self::Running, Self::Appended)
        )
    }

    /// Move to `next`, rejecting anything but the forward edge.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` for any other transition.
    pub fn transition(self, next: Self) -> Result<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(Error::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

/// One simulated agent: an id, how long its "call" takes, and what it writes.
///
/// Immutable once created; validated by [`WorkUnit::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkUnit {
    id: UnitId,
    #[serde(rename = "latency_ms", serialize_with = "crate::serde_duration::serialize")]
    latency: Duration,
    payload: String,
}

impl WorkUnit {
    /// Create a work unit.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `latency` is zero.
    pub fn new(id: UnitId, latency: Duration, payload: impl Into<String>) -> Result<Self> {
        if latency.is_zero() {
            return Err(Error::invalid_input(format!(
                "work unit '{id}' must have a positive latency"
            )));
        }
        Ok(Self {
            id,
            latency,
            payload: payload.into(),
        })
    }

    #[must_use]
    pub const fn id(&self) -> &UnitId {
        &self.id
    }

    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }

    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}
