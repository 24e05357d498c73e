//! `racelab counter` - the same race on a plain integer

use anyhow::{Context, Result};
use racelab_core::{counter, CounterReport, CounterPlan};

use super::{format_ms, print_json};

/// Threads block, so the run is moved off the async runtime.
pub async fn run(plan: CounterPlan, json: bool) -> Result<()> {
    let report = tokio::task::spawn_blocking(move || counter::run_counter(plan))
        .await
        .context("counter worker failed")??;

    if json {
        print_json(&report)
    } else {
        println!("{}", render(&report));
        Ok(())
    }
}

pub fn render(report: &CounterReport) -> String {
    [
        format!("Mode: {} ({} threads)", report.mode, report.threads),
        format!("Expected: {}", report.expected),
        format!(
            "Actual:   {} ({} lost, {:.2}%)",
            report.actual,
            report.lost(),
            report.loss_percentage()
        ),
        format!("Elapsed:  {}", format_ms(report.elapsed)),
    ]
    .join("\n")
}
