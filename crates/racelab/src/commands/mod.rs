//! Command implementations

pub mod compare;
pub mod counter;
pub mod run;
pub mod trials;

use std::time::Duration;

use anyhow::{Context, Result};
use racelab_core::{roster, DemoConfig, DemoConfigBuilder, WorkUnit};
use serde::Serialize;

/// Roster flags as given on the command line; `None` defers to the
/// environment, then to the defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct RosterFlags {
    pub units: Option<usize>,
    pub latency_ms: Option<u64>,
    pub jitter_ms: Option<u64>,
    pub window_ms: Option<u64>,
    pub seed: Option<u64>,
}

impl RosterFlags {
    /// Defaults, then `RACELAB_*`, then these flags.
    pub fn resolve(self) -> Result<DemoConfig> {
        let mut base = DemoConfig::default();
        base.apply_env_overrides()?;

        let mut builder = DemoConfigBuilder::from_config(base);
        if let Some(units) = self.units {
            builder = builder.with_units(units);
        }
        if let Some(ms) = self.latency_ms {
            builder = builder.with_latency(Duration::from_millis(ms));
        }
        if let Some(ms) = self.jitter_ms {
            builder = builder.with_jitter(Duration::from_millis(ms));
        }
        if let Some(ms) = self.window_ms {
            builder = builder.with_window(Duration::from_millis(ms));
        }
        if self.seed.is_some() {
            builder = builder.with_seed(self.seed);
        }
        Ok(builder.build()?)
    }

    /// Resolve the config and generate its roster.
    pub fn units(self) -> Result<(DemoConfig, Vec<WorkUnit>)> {
        let config = self.resolve()?;
        let units = roster::generate(&config)?;
        Ok((config, units))
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

pub fn format_ms(elapsed: Duration) -> String {
    format!("{:.1}ms", elapsed.as_secs_f64() * 1000.0)
}
