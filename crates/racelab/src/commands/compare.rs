//! `racelab compare` - every mode over the same units

use anyhow::Result;
use racelab_core::{trials, Comparison, ExecutionMode};
use tracing::info;

use super::{format_ms, print_json, RosterFlags};

#[derive(Debug, Clone, Copy)]
pub struct CompareOptions {
    pub roster: RosterFlags,
    pub json: bool,
}

pub async fn run(options: CompareOptions) -> Result<()> {
    let (config, units) = options.roster.units()?;
    info!(units = units.len(), "comparing modes");

    let comparison = trials::compare_modes(&units, config.run_options()).await?;

    if options.json {
        print_json(&comparison)
    } else {
        println!("{}", render(&comparison));
        Ok(())
    }
}

pub fn render(comparison: &Comparison) -> String {
    let mut lines = vec![
        format!("Expected entries: {}", comparison.expected_len),
        format!(
            "{:<18} {:>10} {:>8} {:>8}  {}",
            "MODE", "ELAPSED", "SPEEDUP", "ENTRIES", "VERDICT"
        ),
    ];
    lines.extend(comparison.timings.iter().map(|timing| {
        format!(
            "{:<18} {:>10} {:>7.2}x {:>8}  {}",
            timing.mode.to_string(),
            format_ms(timing.elapsed),
            timing.speedup,
            timing.observed_len,
            if timing.corruption_detected { "CORRUPTED" } else { "OK" }
        )
    }));
    if let (Some(unsafe_run), Some(guarded)) = (
        comparison.timing(ExecutionMode::ParallelUnsafe),
        comparison.timing(ExecutionMode::ParallelGuarded),
    ) {
        lines.push(format!(
            "Guard cost: {} over {}",
            format_ms(guarded.elapsed.saturating_sub(unsafe_run.elapsed)),
            unsafe_run.mode
        ));
    }
    lines.join("\n")
}
