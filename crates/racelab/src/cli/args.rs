//! CLI command definitions using `clap`

use clap::{builder::PossibleValuesParser, value_parser, Arg, ArgAction, Command as ClapCommand};
use racelab_core::{config, counter, CounterMode, ExecutionMode};
use strum::VariantNames;

pub fn after_help_text(examples: &[&str]) -> String {
    let mut text = String::from("EXAMPLES:\n");
    for example in examples {
        text.push_str("  ");
        text.push_str(example);
        text.push('\n');
    }
    text
}

fn arg_json() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn arg_mode() -> Arg {
    Arg::new("mode")
        .long("mode")
        .short('m')
        .required(true)
        .value_parser(PossibleValuesParser::new(ExecutionMode::VARIANTS.iter().copied()))
        .help("Execution mode")
}

/// Flags shared by every command that builds a roster of work units.
///
/// Each one overrides the matching `RACELAB_*` environment variable.
fn roster_args() -> [Arg; 5] {
    [
        Arg::new("units")
            .long("units")
            .short('n')
            .value_parser(value_parser!(usize))
            .help(format!("Number of work units [env: {}]", config::ENV_UNITS)),
        Arg::new("latency-ms")
            .long("latency-ms")
            .value_parser(value_parser!(u64))
            .help(format!(
                "Simulated call latency per unit, in ms [env: {}]",
                config::ENV_LATENCY_MS
            )),
        Arg::new("jitter-ms")
            .long("jitter-ms")
            .value_parser(value_parser!(u64))
            .help(format!(
                "Maximum random extra latency per unit, in ms [env: {}]",
                config::ENV_JITTER_MS
            )),
        Arg::new("window-ms")
            .long("window-ms")
            .value_parser(value_parser!(u64))
            .help(format!(
                "Pause between reading and writing the log, in ms [env: {}]",
                config::ENV_WINDOW_MS
            )),
        Arg::new("seed")
            .long("seed")
            .value_parser(value_parser!(u64))
            .help(format!("Seed for the jitter generator [env: {}]", config::ENV_SEED)),
    ]
}

pub fn cmd_run() -> ClapCommand {
    ClapCommand::new("run")
        .about("Feed the work units into a fresh shared log under one mode")
        .arg(arg_mode())
        .args(roster_args())
        .arg(arg_json())
        .after_help(after_help_text(&[
            "racelab run --mode sequential               One unit at a time",
            "racelab run --mode parallel-unsafe          Overlapping read-modify-writes",
            "racelab run --mode parallel-guarded -n 10   Concurrent calls, serialized appends",
            "racelab run -m parallel-unsafe --json       Machine-readable report",
        ]))
}

pub fn cmd_compare() -> ClapCommand {
    ClapCommand::new("compare")
        .about("Run every mode over the same units and compare timings")
        .args(roster_args())
        .arg(arg_json())
        .after_help(after_help_text(&[
            "racelab compare                             Default roster, all modes",
            "racelab compare --latency-ms 50 --json      Faster calls, JSON table",
        ]))
}

pub fn cmd_trials() -> ClapCommand {
    ClapCommand::new("trials")
        .about("Repeat one mode and report how often the log was corrupted")
        .arg(arg_mode())
        .arg(
            Arg::new("trials")
                .long("trials")
                .short('t')
                .value_parser(value_parser!(usize))
                .default_value("20")
                .help("Number of runs"),
        )
        .args(roster_args())
        .arg(arg_json())
        .after_help(after_help_text(&[
            "racelab trials -m parallel-unsafe --jitter-ms 5     Race rate with jitter",
            "racelab trials -m parallel-guarded -t 100           Should never corrupt",
        ]))
}

pub fn cmd_counter() -> ClapCommand {
    ClapCommand::new("counter")
        .about("Increment a shared integer from OS threads")
        .arg(
            Arg::new("mode")
                .long("mode")
                .short('m')
                .value_parser(PossibleValuesParser::new(CounterMode::VARIANTS.iter().copied()))
                .default_value("unsafe")
                .help("How each increment touches the counter"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .value_parser(value_parser!(usize))
                .default_value("10")
                .help(format!("Number of threads (at most {})", counter::MAX_THREADS)),
        )
        .arg(
            Arg::new("increments")
                .long("increments")
                .value_parser(value_parser!(u64))
                .default_value("5000")
                .help("Increments per thread"),
        )
        .arg(arg_json())
        .after_help(after_help_text(&[
            "racelab counter                             Unsafe increments, 10 threads",
            "racelab counter -m atomic --threads 32      fetch_add, never loses",
        ]))
}

pub fn build_cli() -> ClapCommand {
    ClapCommand::new("racelab")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Lost updates, locks and timing for concurrent agents")
        .subcommand(cmd_run())
        .subcommand(cmd_compare())
        .subcommand(cmd_trials())
        .subcommand(cmd_counter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_run_requires_mode() {
        let result = build_cli().try_get_matches_from(["racelab", "run"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_rejects_unknown_mode() {
        let result = build_cli().try_get_matches_from(["racelab", "run", "--mode", "yolo"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_parses_roster_flags() -> anyhow::Result<()> {
        let matches = build_cli().try_get_matches_from([
            "racelab",
            "run",
            "--mode",
            "parallel-guarded",
            "--units",
            "3",
            "--window-ms",
            "0",
            "--json",
        ])?;
        let sub = matches
            .subcommand_matches("run")
            .ok_or_else(|| anyhow::anyhow!("run not matched"))?;
        assert_eq!(
            sub.get_one::<String>("mode").map(String::as_str),
            Some("parallel-guarded")
        );
        assert_eq!(sub.get_one::<usize>("units"), Some(&3));
        assert_eq!(sub.get_one::<u64>("window-ms"), Some(&0));
        assert_eq!(sub.get_one::<u64>("latency-ms"), None);
        assert!(sub.get_flag("json"));
        Ok(())
    }

    #[test]
    fn test_counter_defaults() -> anyhow::Result<()> {
        let matches = build_cli().try_get_matches_from(["racelab", "counter"])?;
        let sub = matches
            .subcommand_matches("counter")
            .ok_or_else(|| anyhow::anyhow!("counter not matched"))?;
        assert_eq!(sub.get_one::<String>("mode").map(String::as_str), Some("unsafe"));
        assert_eq!(sub.get_one::<usize>("threads"), Some(&10));
        assert_eq!(sub.get_one::<u64>("increments"), Some(&5000));
        Ok(())
    }
}
