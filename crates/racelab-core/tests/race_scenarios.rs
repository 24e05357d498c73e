//! End-to-end scenarios for the three execution modes.
//!
//! Timing assertions run on tokio's paused clock, so "0.5 s" is exact
//! rather than a flaky wall-clock bound. The corruption-rate test runs on
//! the real multi-threaded runtime with jittered latencies.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use racelab_core::{
    roster, run, run_trials, DemoConfig, Error, ExecutionMode, RunOptions, UnitId, WorkUnit,
};

fn five_by_100ms() -> Vec<WorkUnit> {
    let config = DemoConfig::builder()
        .with_units(5)
        .with_latency(Duration::from_millis(100))
        .with_window(Duration::ZERO)
        .build()
        .expect("valid config");
    roster::generate(&config).expect("units")
}

const SCENARIO_WINDOW: RunOptions = RunOptions {
    window: Duration::from_millis(2),
};

#[tokio::test(start_paused = true)]
async fn scenario_sequential_takes_the_sum() {
    let units = five_by_100ms();
    let report = run(&units, ExecutionMode::Sequential, SCENARIO_WINDOW)
        .await
        .expect("run");

    assert_eq!(report.final_log.len(), 5);
    assert!(!report.corruption_detected);
    assert!(report.elapsed >= Duration::from_millis(500));
    assert!(report.elapsed < Duration::from_millis(550));
}

#[tokio::test(start_paused = true)]
async fn scenario_unsafe_takes_the_max_and_loses_appends() {
    let units = five_by_100ms();
    let report = run(&units, ExecutionMode::ParallelUnsafe, SCENARIO_WINDOW)
        .await
        .expect("run");

    assert!(report.elapsed >= Duration::from_millis(100));
    assert!(report.elapsed < Duration::from_millis(150));
    assert!(report.final_log.len() <= 5);
    // identical latencies put every read before every write
    assert!(report.corruption_detected);
    assert!(report.audit.lost_updates() > 0);
}

#[tokio::test(start_paused = true)]
async fn scenario_guarded_takes_the_max_plus_critical_sections() {
    let units = five_by_100ms();
    let report = run(&units, ExecutionMode::ParallelGuarded, SCENARIO_WINDOW)
        .await
        .expect("run");

    assert_eq!(report.final_log.len(), 5);
    assert!(!report.corruption_detected);
    assert!(report.elapsed >= Duration::from_millis(110));
    assert!(report.elapsed < Duration::from_millis(150));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unsafe_corruption_rate_is_nonzero_under_load() {
    let config = DemoConfig::builder()
        .with_units(8)
        .with_latency(Duration::from_millis(5))
        .with_jitter(Duration::from_millis(3))
        .with_window(Duration::from_millis(2))
        .with_seed(Some(11))
        .build()
        .expect("valid config");
    let units = roster::generate(&config).expect("units");

    let summary = run_trials(&units, ExecutionMode::ParallelUnsafe, config.run_options(), 20)
        .await
        .expect("trials");

    assert_eq!(summary.trials, 20);
    assert!(summary.corruption_rate() > 0.0, "race never reproduced: {summary:?}");
    assert!(summary.max_observed_len <= 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn guarded_rate_is_zero_under_the_same_load() {
    let config = DemoConfig::builder()
        .with_units(8)
        .with_latency(Duration::from_millis(5))
        .with_jitter(Duration::from_millis(3))
        .with_window(Duration::from_millis(2))
        .with_seed(Some(11))
        .build()
        .expect("valid config");
    let units = roster::generate(&config).expect("units");

    let summary = run_trials(&units, ExecutionMode::ParallelGuarded, config.run_options(), 20)
        .await
        .expect("trials");

    assert_eq!(summary.corrupted_runs, 0);
    assert_eq!(summary.min_observed_len, 8);
}

#[tokio::test]
async fn invalid_input_fails_before_running() {
    let result = run(&[], ExecutionMode::ParallelUnsafe, RunOptions::default()).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    let zero_latency = WorkUnit::new(
        UnitId::parse("Researcher").expect("id"),
        Duration::ZERO,
        "Researcher: nothing",
    );
    assert!(matches!(zero_latency, Err(Error::InvalidInput(_))));
}
