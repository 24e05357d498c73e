//! `racelab run` - one mode, one report

use anyhow::Result;
use itertools::Itertools;
use racelab_core::{harness, ExecutionMode, RunReport};
use tracing::info;

use super::{format_ms, print_json, RosterFlags};

#[derive(Debug, Clone, Copy)]
pub struct RunCommandOptions {
    pub mode: ExecutionMode,
    pub roster: RosterFlags,
    pub json: bool,
}

pub async fn run(options: RunCommandOptions) -> Result<()> {
    let (config, units) = options.roster.units()?;
    info!(mode = %options.mode, units = units.len(), "run requested");

    let report = harness::run(&units, options.mode, config.run_options()).await?;

    if options.json {
        print_json(&report)
    } else {
        println!("{}", render(&report));
        Ok(())
    }
}

/// One-line verdict for a finished run.
pub fn verdict(report: &RunReport) -> String {
    let audit = &report.audit;
    if !report.corruption_detected {
        return format!("OK - all {} appends present", audit.expected);
    }
    let mut detail = format!(
        "CORRUPTED - expected {} entries, found {}",
        audit.expected, audit.observed
    );
    if !audit.missing.is_empty() {
        detail.push_str(&format!("; missing: {}", audit.missing.iter().join(", ")));
    }
    if !audit.duplicated.is_empty() {
        detail.push_str(&format!("; duplicated: {}", audit.duplicated.len()));
    }
    detail
}

pub fn render(report: &RunReport) -> String {
    let mut lines = vec![
        format!("Mode: {}", report.mode),
        format!(
            "Work units ({}): {}",
            report.units.len(),
            report.units.iter().join(", ")
        ),
        format!("Shared log ({} entries):", report.final_log.len()),
    ];
    lines.extend(report.final_log.iter().enumerate().map(|(index, record)| {
        let observed = if record.position == index {
            String::new()
        } else {
            format!(" (observed position {})", record.position)
        };
        format!("  [{index}] {}{observed}: {}", record.unit, record.payload)
    }));
    lines.push(format!("Elapsed: {}", format_ms(report.elapsed)));
    lines.push(format!("Verdict: {}", verdict(report)));
    lines.join("\n")
}
