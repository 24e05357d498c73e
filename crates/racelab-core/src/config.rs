//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Environment variables: `RACELAB_*`
//! 3. CLI flags (command-specific)
//!
//! There is no configuration file.
//!
//! # Environment
//!
//! | Variable             | Meaning                                   |
//! |----------------------|-------------------------------------------|
//! | `RACELAB_UNITS`      | number of work units                      |
//! | `RACELAB_LATENCY_MS` | base simulated latency per unit           |
//! | `RACELAB_JITTER_MS`  | extra uniform latency in `[0, jitter]`    |
//! | `RACELAB_WINDOW_MS`  | suspension between a unit's read and write|
//! | `RACELAB_SEED`       | seed for reproducible jitter              |

use std::time::Duration;

use serde::Serialize;

use crate::{harness::RunOptions, Error, Result};

pub const ENV_UNITS: &str = "RACELAB_UNITS";
pub const ENV_LATENCY_MS: &str = "RACELAB_LATENCY_MS";
pub const ENV_JITTER_MS: &str = "RACELAB_JITTER_MS";
pub const ENV_WINDOW_MS: &str = "RACELAB_WINDOW_MS";
pub const ENV_SEED: &str = "RACELAB_SEED";

/// One of each roster agent.
pub const DEFAULT_UNITS: usize = 6;
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(100);
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(10);

/// Validated demonstration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoConfig {
    pub units: usize,
    #[serde(rename = "latency_ms", serialize_with = "crate::serde_duration::serialize")]
    pub latency: Duration,
    #[serde(rename = "jitter_ms", serialize_with = "crate::serde_duration::serialize")]
    pub jitter: Duration,
    #[serde(rename = "window_ms", serialize_with = "crate::serde_duration::serialize")]
    pub window: Duration,
    pub seed: Option<u64>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            units: DEFAULT_UNITS,
            latency: DEFAULT_LATENCY,
            jitter: Duration::ZERO,
            window: DEFAULT_WINDOW,
            seed: None,
        }
    }
}

impl DemoConfig {
    /// Create a new config builder starting from the defaults.
    #[must_use]
    pub fn builder() -> DemoConfigBuilder {
        DemoConfigBuilder::new()
    }

    /// Defaults with `RACELAB_*` overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `RACELAB_*` environment variables on top of `self`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(units) = env_number(ENV_UNITS)? {
            self.units = usize::try_from(units)
                .map_err(|e| Error::invalid_config(format!("Invalid {ENV_UNITS} value: {e}")))?;
        }
        if let Some(ms) = env_number(ENV_LATENCY_MS)? {
            self.latency = Duration::from_millis(ms);
        }
        if let Some(ms) = env_number(ENV_JITTER_MS)? {
            self.jitter = Duration::from_millis(ms);
        }
        if let Some(ms) = env_number(ENV_WINDOW_MS)? {
            self.window = Duration::from_millis(ms);
        }
        if let Some(seed) = env_number(ENV_SEED)? {
            self.seed = Some(seed);
        }
        Ok(())
    }

    /// Check the input constraints every run relies on.
    ///
    /// A zero window is allowed. On a current-thread runtime it removes the
    /// race entirely; on a multi-threaded runtime it only makes it rarer.
    pub fn validate(&self) -> Result<()> {
        if self.units == 0 {
            return Err(Error::invalid_config("units must be at least 1"));
        }
        if self.latency.is_zero() {
            return Err(Error::invalid_config("latency must be positive"));
        }
        Ok(())
    }

    /// Harness options derived from this config.
    #[must_use]
    pub const fn run_options(&self) -> RunOptions {
        RunOptions {
            window: self.window,
        }
    }
}

fn env_number(key: &str) -> Result<Option<u64>> {
    std::env::var(key).ok().map_or(Ok(None), |value| {
        value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| Error::invalid_config(format!("Invalid {key} value '{value}': {e}")))
    })
}

/// Builder with fallible construction.
#[derive(Debug, Clone, Default)]
pub struct DemoConfigBuilder {
    config: DemoConfig,
}

impl DemoConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing config (e.g. one with env overrides applied).
    #[must_use]
    pub const fn from_config(config: DemoConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn with_units(mut self, units: usize) -> Self {
        self.config.units = units;
        self
    }

    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.config.latency = latency;
        self
    }

    #[must_use]
    pub const fn with_jitter(mut self, jitter: Duration) -> Self {
        self.config.jitter = jitter;
        self
    }

    #[must_use]
    pub const fn with_window(mut self, window: Duration) -> Self {
        self.config.window = window;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.config.seed = seed;
        self
    }

    /// Build the configuration, returning an error if validation fails.
    pub fn build(self) -> Result<DemoConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
