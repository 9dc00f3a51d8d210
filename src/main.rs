use anyhow::{bail, Result};
use clap::Parser;
use log::info;
use std::time::Duration;

use intersection_sync::simulation::{
    SimConfig, SimWorld, DEFAULT_CROSSING_TIME, DEFAULT_MAX_ARRIVAL_DELAY, DEFAULT_THREADS,
    DEFAULT_VEHICLES_PER_THREAD,
};

#[derive(Parser)]
#[command(name = "intersection_sync")]
#[command(about = "Four-way intersection synchronization simulation")]
struct Cli {
    /// Number of concurrent vehicle threads
    #[arg(long, default_value_t = DEFAULT_THREADS)]
    threads: usize,

    /// Number of vehicles each thread sends through the intersection
    #[arg(long, default_value_t = DEFAULT_VEHICLES_PER_THREAD)]
    vehicles: usize,

    /// Time a vehicle spends inside the intersection, in milliseconds
    #[arg(long, default_value_t = DEFAULT_CROSSING_TIME.as_millis() as u64)]
    crossing_ms: u64,

    /// Maximum random pause before each arrival, in milliseconds
    #[arg(long, default_value_t = DEFAULT_MAX_ARRIVAL_DELAY.as_millis() as u64)]
    arrival_ms: u64,

    /// Seed for reproducible movement choices
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn into_config(self) -> SimConfig {
        SimConfig {
            threads: self.threads,
            vehicles_per_thread: self.vehicles,
            crossing_time: Duration::from_millis(self.crossing_ms),
            max_arrival_delay: Duration::from_millis(self.arrival_ms),
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run_headless(cli.into_config())
}

/// Run the simulation without any interactive output
fn run_headless(config: SimConfig) -> Result<()> {
    info!("Running intersection simulation in headless mode...");
    info!(
        "Threads: {}, vehicles per thread: {}, crossing: {:?}, max arrival delay: {:?}",
        config.threads, config.vehicles_per_thread, config.crossing_time, config.max_arrival_delay
    );
    if let Some(seed) = config.seed {
        info!("Seed: {}", seed);
    }

    let report = SimWorld::new(config).run()?;
    report.log_summary();

    if report.collisions > 0 {
        bail!("{} collision(s) detected in the intersection", report.collisions);
    }
    if !report.residual.is_empty() {
        bail!(
            "{} vehicle(s) left in the intersection at teardown",
            report.residual.len()
        );
    }
    Ok(())
}
