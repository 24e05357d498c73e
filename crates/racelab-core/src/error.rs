//! Error types for racelab with categorization:
//!
//! - **Validation errors**: bad input or configuration (exit code 1)
//! - **Execution errors**: worker tasks that panicked, poisoned locks (exit code 2)
//! - **State errors**: illegal work unit state transitions (exit code 4)
//!
//! A corrupted shared log is *not* an error. It is an observation carried by
//! [`crate::Audit`].

use thiserror::Error;

use crate::domain::WorkUnitState;

/// Top-level error type for every fallible racelab operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Run input violated a precondition (empty units, zero latency, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration value could not be parsed or is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Identifier failed validation.
    #[error("Invalid {field} '{value}': {reason}")]
    InvalidId {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A work unit attempted a transition its state machine forbids.
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: WorkUnitState,
        to: WorkUnitState,
    },

    /// A worker task or lock failed while the run was executing.
    #[error("Execution failed: {0}")]
    Execution(String),
}

impl Error {
    /// Create an input validation error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an execution error.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Returns the process exit code for this error.
    ///
    /// Exit code scheme:
    /// - 1: User error (validation, invalid input, bad configuration)
    /// - 2: Runtime failure (panicked worker, poisoned lock)
    /// - 4: Invalid state (state machine violation)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput(_) | Self::InvalidConfig(_) | Self::InvalidId { .. } => 1,
            Self::Execution(_) => 2,
            Self::InvalidTransition { .. } => 4,
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::execution(format!("worker task failed: {err}"))
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::execution(format!("lock poisoned: {err}"))
    }
}

/// Result alias used throughout racelab.
pub type Result<T> = std::result::Result<T, Error>;
