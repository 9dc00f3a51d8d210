//! Simulation harness that drives vehicle threads through the intersection
//!
//! This is the outside world from the monitor's point of view: it owns the
//! vehicle threads, their timing and the random choice of movements. The
//! monitor itself only sees `request_entry` and `report_exit`.

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::checker::CollisionChecker;
use super::intersection::Intersection;
use super::movement::Movement;
use super::stats::{Approaches, SimReport};
use super::types::{
    Direction, DEFAULT_CROSSING_TIME, DEFAULT_MAX_ARRIVAL_DELAY, DEFAULT_THREADS,
    DEFAULT_VEHICLES_PER_THREAD,
};

/// Parameters for one simulation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Number of concurrent vehicle threads
    pub threads: usize,
    /// Vehicles each thread sends through, one after another
    pub vehicles_per_thread: usize,
    /// Time each vehicle spends inside the intersection
    pub crossing_time: Duration,
    /// Upper bound on the random pause before each arrival
    pub max_arrival_delay: Duration,
    /// Base seed; thread `i` uses `seed + i`. Unseeded runs draw from the thread rng
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            vehicles_per_thread: DEFAULT_VEHICLES_PER_THREAD,
            crossing_time: DEFAULT_CROSSING_TIME,
            max_arrival_delay: DEFAULT_MAX_ARRIVAL_DELAY,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            bail!("simulation needs at least one vehicle thread");
        }
        Ok(())
    }

    pub fn total_vehicles(&self) -> usize {
        self.threads * self.vehicles_per_thread
    }
}

/// Runs the full `init -> vehicles -> teardown` sequence
pub struct SimWorld {
    config: SimConfig,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimWorld {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Create a world with default parameters and a fixed seed
    pub fn new_with_seed(seed: u64) -> Self {
        Self::new(SimConfig {
            seed: Some(seed),
            ..SimConfig::default()
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run the simulation to completion
    ///
    /// Fails if the configuration is invalid, a vehicle thread cannot be
    /// spawned, or a vehicle thread panics. Collisions and leftover occupants
    /// are reported in the returned [`SimReport`], not as errors.
    pub fn run(&self) -> Result<SimReport> {
        self.config.validate()?;

        let intersection = Arc::new(Intersection::init());
        let checker = Arc::new(CollisionChecker::new());
        let started = Instant::now();

        let mut handles = Vec::with_capacity(self.config.threads);
        for index in 0..self.config.threads {
            let intersection = Arc::clone(&intersection);
            let checker = Arc::clone(&checker);
            let config = self.config.clone();

            let handle = thread::Builder::new()
                .name(format!("vehicle-{}", index))
                .spawn(move || drive_vehicles(index, &config, &intersection, &checker))
                .with_context(|| format!("Failed to spawn vehicle thread {}", index))?;
            handles.push(handle);
        }
        info!("Spawned {} vehicle threads", handles.len());

        let mut approaches = Approaches::default();
        for (index, handle) in handles.into_iter().enumerate() {
            let thread_approaches = handle
                .join()
                .map_err(|_| anyhow!("Vehicle thread {} panicked", index))?
                .with_context(|| format!("Vehicle thread {} failed", index))?;
            for (total, approach) in approaches.iter_mut().zip(thread_approaches.iter()) {
                total.merge(approach);
            }
        }
        let elapsed = started.elapsed();

        let intersection = Arc::try_unwrap(intersection)
            .map_err(|_| anyhow!("Intersection still shared after all vehicle threads joined"))?;
        let teardown = intersection.teardown();

        Ok(SimReport {
            vehicles: approaches.iter().map(|a| a.vehicles).sum(),
            elapsed,
            approaches,
            intersection: teardown.stats,
            collisions: checker.violations(),
            residual: teardown.residual,
        })
    }
}

/// Pick a movement the way vehicles arrive: any approach, any other exit
fn random_movement(rng: &mut StdRng) -> Result<Movement> {
    let origin = Direction::ALL[rng.random_range(0..4)];
    let destination = Direction::ALL[(origin.index() + rng.random_range(1..4)) % 4];
    Movement::new(origin, destination)
}

/// Body of one vehicle thread
fn drive_vehicles(
    index: usize,
    config: &SimConfig,
    intersection: &Intersection,
    checker: &CollisionChecker,
) -> Result<Approaches> {
    let seed = match config.seed {
        Some(seed) => seed.wrapping_add(index as u64),
        None => rand::rng().random(),
    };
    debug!("vehicle thread {} using seed {}", index, seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let max_delay_micros = u64::try_from(config.max_arrival_delay.as_micros()).unwrap_or(u64::MAX);
    let mut approaches = Approaches::default();

    for _ in 0..config.vehicles_per_thread {
        if max_delay_micros > 0 {
            thread::sleep(Duration::from_micros(rng.random_range(0..=max_delay_micros)));
        }

        let movement = random_movement(&mut rng)?;
        let (origin, destination) = (movement.origin(), movement.destination());

        let arrived = Instant::now();
        intersection.request_entry(origin, destination);
        approaches[origin.index()].record(arrived.elapsed());

        checker.enter(movement);
        if !config.crossing_time.is_zero() {
            thread::sleep(config.crossing_time);
        }
        checker.exit(movement);

        intersection.report_exit(origin, destination);
    }

    Ok(approaches)
}
