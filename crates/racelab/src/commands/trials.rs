//! `racelab trials` - corruption rate over repeated runs

use anyhow::Result;
use racelab_core::{trials, ExecutionMode, TrialSummary};
use tracing::info;

use super::{format_ms, print_json, RosterFlags};

#[derive(Debug, Clone, Copy)]
pub struct TrialsOptions {
    pub mode: ExecutionMode,
    pub trials: usize,
    pub roster: RosterFlags,
    pub json: bool,
}

pub async fn run(options: TrialsOptions) -> Result<()> {
    let (config, units) = options.roster.units()?;
    info!(mode = %options.mode, trials = options.trials, "running trials");

    let summary =
        trials::run_trials(&units, options.mode, config.run_options(), options.trials).await?;

    if options.json {
        print_json(&summary)
    } else {
        println!("{}", render(&summary));
        Ok(())
    }
}

pub fn render(summary: &TrialSummary) -> String {
    [
        format!("Mode: {}", summary.mode),
        format!(
            "Corrupted runs: {}/{} ({:.1}%)",
            summary.corrupted_runs,
            summary.trials,
            summary.corruption_rate() * 100.0
        ),
        format!(
            "Entries per run: {}..={} of {}",
            summary.min_observed_len, summary.max_observed_len, summary.expected_len
        ),
        format!("Lost updates: {}", summary.lost_updates),
        format!("Mean elapsed: {}", format_ms(summary.mean_elapsed)),
    ]
    .join("\n")
}
