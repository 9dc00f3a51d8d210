use std::process::Command;
use std::time::Duration;

use intersection_sync::simulation::{
    Direction, SimConfig, SimWorld, DEFAULT_THREADS, DEFAULT_VEHICLES_PER_THREAD,
};

fn small_config(seed: u64) -> SimConfig {
    SimConfig {
        threads: 6,
        vehicles_per_thread: 25,
        crossing_time: Duration::from_micros(200),
        max_arrival_delay: Duration::from_micros(300),
        seed: Some(seed),
    }
}

/// Run the binary with a small workload and return its stderr
fn run_headless(args: &[&str]) -> (bool, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_intersection_sync"))
        .args(args)
        .env("RUST_LOG", "warn,intersection_sync=info")
        .output()
        .expect("Failed to execute simulation");

    (
        output.status.success(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

/// Parse the number after `label` on the first log line containing it
fn logged_count(stderr: &str, label: &str) -> usize {
    let line = stderr
        .lines()
        .find(|line| line.contains(label))
        .unwrap_or_else(|| panic!("Could not find '{}' line", label));

    let parts: Vec<&str> = line.split(label).collect();
    parts
        .get(1)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(|| panic!("Could not parse count from line: {}", line))
}

#[test]
fn test_seeded_run_is_clean() {
    let config = small_config(42);
    let expected = config.total_vehicles();

    let report = SimWorld::new(config).run().unwrap();
    assert!(report.is_clean(), "report: {:?}", report);
    assert_eq!(report.vehicles, expected);
    assert_eq!(report.intersection.admitted, expected as u64);
    assert_eq!(report.intersection.exited, expected as u64);
    assert_eq!(report.intersection.unmatched_exits, 0);

    let per_direction: usize = Direction::ALL
        .iter()
        .map(|d| report.approach(*d).vehicles)
        .sum();
    assert_eq!(per_direction, expected);
}

#[test]
fn test_unseeded_run_with_instant_crossings() {
    let report = SimWorld::new(SimConfig {
        threads: 8,
        vehicles_per_thread: 50,
        crossing_time: Duration::ZERO,
        max_arrival_delay: Duration::ZERO,
        seed: None,
    })
    .run()
    .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.vehicles, 400);
}

#[test]
fn test_default_world_with_seed() {
    let world = SimWorld::new_with_seed(3);
    assert_eq!(world.config().seed, Some(3));
    assert_eq!(world.config().threads, DEFAULT_THREADS);

    let report = world.run().unwrap();
    assert!(report.is_clean());
    assert_eq!(report.vehicles, DEFAULT_THREADS * DEFAULT_VEHICLES_PER_THREAD);
    assert!(report.intersection.peak_occupancy >= 1);
}

#[test]
fn test_zero_threads_is_rejected() {
    let config = SimConfig {
        threads: 0,
        ..SimConfig::default()
    };
    assert!(SimWorld::new(config).run().is_err());
}

#[test]
fn test_zero_vehicles_runs_empty() {
    let report = SimWorld::new(SimConfig {
        vehicles_per_thread: 0,
        ..small_config(1)
    })
    .run()
    .unwrap();

    assert_eq!(report.vehicles, 0);
    assert_eq!(report.intersection.admitted, 0);
    assert!(report.is_clean());
}

#[test]
fn test_headless_simulation_runs() {
    let (success, stderr) = run_headless(&[
        "--threads", "4", "--vehicles", "10", "--crossing-ms", "0", "--arrival-ms", "1", "--seed",
        "7",
    ]);

    assert!(
        success,
        "Simulation failed to run in headless mode. stderr: {}",
        stderr
    );
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );
    assert_eq!(logged_count(&stderr, "Total vehicles:"), 40);
    assert_eq!(logged_count(&stderr, "Admitted:"), 40);
    assert_eq!(logged_count(&stderr, "Collisions:"), 0);
    assert_eq!(logged_count(&stderr, "Residual occupants:"), 0);
}

#[test]
fn test_headless_rejects_zero_threads() {
    let (success, stderr) = run_headless(&["--threads", "0"]);
    assert!(!success);
    assert!(
        stderr.contains("at least one vehicle thread"),
        "Unexpected stderr: {}",
        stderr
    );
}
