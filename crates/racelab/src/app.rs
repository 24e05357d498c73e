//! Command dispatch

use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ArgMatches;
use racelab_core::{CounterMode, CounterPlan, ExecutionMode};

use crate::{
    cli::build_cli,
    commands::{self, RosterFlags},
};

fn required<'a, T>(matches: &'a ArgMatches, name: &str) -> Result<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    matches
        .get_one::<T>(name)
        .with_context(|| format!("missing --{name}"))
}

fn execution_mode(matches: &ArgMatches) -> Result<ExecutionMode> {
    let name = required::<String>(matches, "mode")?;
    ExecutionMode::from_str(name).with_context(|| format!("unknown mode '{name}'"))
}

fn roster_flags(matches: &ArgMatches) -> RosterFlags {
    RosterFlags {
        units: matches.get_one::<usize>("units").copied(),
        latency_ms: matches.get_one::<u64>("latency-ms").copied(),
        jitter_ms: matches.get_one::<u64>("jitter-ms").copied(),
        window_ms: matches.get_one::<u64>("window-ms").copied(),
        seed: matches.get_one::<u64>("seed").copied(),
    }
}

pub async fn run_cli() -> Result<()> {
    let mut cli = build_cli();
    let matches = cli.clone().get_matches();

    match matches.subcommand() {
        Some(("run", sub)) => {
            commands::run::run(commands::run::RunCommandOptions {
                mode: execution_mode(sub)?,
                roster: roster_flags(sub),
                json: sub.get_flag("json"),
            })
            .await
        }
        Some(("compare", sub)) => {
            commands::compare::run(commands::compare::CompareOptions {
                roster: roster_flags(sub),
                json: sub.get_flag("json"),
            })
            .await
        }
        Some(("trials", sub)) => {
            commands::trials::run(commands::trials::TrialsOptions {
                mode: execution_mode(sub)?,
                trials: *required::<usize>(sub, "trials")?,
                roster: roster_flags(sub),
                json: sub.get_flag("json"),
            })
            .await
        }
        Some(("counter", sub)) => {
            let name = required::<String>(sub, "mode")?;
            let plan = CounterPlan {
                threads: *required::<usize>(sub, "threads")?,
                increments: *required::<u64>(sub, "increments")?,
                mode: CounterMode::from_str(name)
                    .with_context(|| format!("unknown counter mode '{name}'"))?,
            };
            commands::counter::run(plan, sub.get_flag("json")).await
        }
        _ => {
            cli.print_help()?;
            println!();
            Ok(())
        }
    }
}
