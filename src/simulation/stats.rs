//! Statistics gathered over one simulation run

use log::info;
use std::time::Duration;

use super::intersection::IntersectionStats;
use super::movement::Movement;
use super::types::Direction;

/// Wait times for vehicles arriving from one direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApproachStats {
    pub vehicles: usize,
    /// Time spent inside `request_entry`, summed over all vehicles
    pub total_wait: Duration,
    pub max_wait: Duration,
}

impl ApproachStats {
    pub fn record(&mut self, wait: Duration) {
        self.vehicles += 1;
        self.total_wait += wait;
        self.max_wait = self.max_wait.max(wait);
    }

    pub fn merge(&mut self, other: &ApproachStats) {
        self.vehicles += other.vehicles;
        self.total_wait += other.total_wait;
        self.max_wait = self.max_wait.max(other.max_wait);
    }

    pub fn mean_wait(&self) -> Duration {
        match u32::try_from(self.vehicles) {
            Ok(0) => Duration::ZERO,
            Ok(count) => self.total_wait / count,
            Err(_) => Duration::from_secs_f64(self.total_wait.as_secs_f64() / self.vehicles as f64),
        }
    }
}

/// Per-approach statistics indexed by [`Direction::index`]
pub type Approaches = [ApproachStats; 4];

/// Outcome of a [`SimWorld`](super::SimWorld) run
#[derive(Debug, Clone)]
pub struct SimReport {
    pub vehicles: usize,
    pub elapsed: Duration,
    pub approaches: Approaches,
    pub intersection: IntersectionStats,
    /// Entries the collision checker flagged
    pub collisions: usize,
    /// Movements left inside at teardown
    pub residual: Vec<Movement>,
}

impl SimReport {
    pub fn approach(&self, direction: Direction) -> &ApproachStats {
        &self.approaches[direction.index()]
    }

    /// No collisions and nothing left inside
    pub fn is_clean(&self) -> bool {
        self.collisions == 0 && self.residual.is_empty()
    }

    /// Log the run summary at info level
    pub fn log_summary(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.3}s", self.elapsed.as_secs_f64());
        info!("Total vehicles: {}", self.vehicles);
        info!("Admitted: {}", self.intersection.admitted);
        info!("Exited: {}", self.intersection.exited);
        info!("Waits: {}", self.intersection.waits);
        info!("Peak occupancy: {}", self.intersection.peak_occupancy);
        for direction in Direction::ALL {
            let approach = self.approach(direction);
            info!(
                "  from {:<5}: vehicles={}, mean wait={:.3}ms, max wait={:.3}ms",
                direction.name(),
                approach.vehicles,
                approach.mean_wait().as_secs_f64() * 1000.0,
                approach.max_wait.as_secs_f64() * 1000.0
            );
        }
        info!("Collisions: {}", self.collisions);
        info!("Residual occupants: {}", self.residual.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_wait() {
        let mut approach = ApproachStats::default();
        assert_eq!(approach.mean_wait(), Duration::ZERO);

        approach.record(Duration::from_millis(2));
        approach.record(Duration::from_millis(4));
        assert_eq!(approach.vehicles, 2);
        assert_eq!(approach.mean_wait(), Duration::from_millis(3));
        assert_eq!(approach.max_wait, Duration::from_millis(4));
    }

    #[test]
    fn test_merge() {
        let mut a = ApproachStats::default();
        a.record(Duration::from_millis(1));
        let mut b = ApproachStats::default();
        b.record(Duration::from_millis(5));
        b.record(Duration::from_millis(3));

        a.merge(&b);
        assert_eq!(a.vehicles, 3);
        assert_eq!(a.total_wait, Duration::from_millis(9));
        assert_eq!(a.max_wait, Duration::from_millis(5));
    }
}
