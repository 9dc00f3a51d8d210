//! Intersection monitor for the traffic simulation
//!
//! Decides which vehicles may occupy the shared four-way intersection at the
//! same time. One mutex guards the occupancy set and one condition variable
//! parks vehicles that cannot enter yet. Every exit wakes all parked vehicles,
//! and each one rescans the live occupants before entering. Which of several
//! eligible waiters gets in first is left to the scheduler; only
//! collision-freedom is guaranteed.

use log::{debug, trace, warn};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use super::movement::Movement;
use super::types::Direction;

/// Counters kept by the monitor under its lock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntersectionStats {
    /// Movements admitted into the intersection
    pub admitted: u64,
    /// Movements removed by a matching exit
    pub exited: u64,
    /// Times a requester was parked on the condition variable
    pub waits: u64,
    /// Exits that matched no occupant
    pub unmatched_exits: u64,
    /// Largest occupancy observed right after an admission
    pub peak_occupancy: usize,
}

#[derive(Debug, Default)]
struct Occupancy {
    /// Admitted movements in insertion order
    movements: Vec<Movement>,
    stats: IntersectionStats,
}

/// State left behind once the simulation is over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teardown {
    pub stats: IntersectionStats,
    /// Movements still inside; empty when every entry was paired with an exit
    pub residual: Vec<Movement>,
}

impl Teardown {
    pub fn is_clean(&self) -> bool {
        self.residual.is_empty()
    }
}

/// The shared intersection
///
/// Construct once with [`Intersection::init`] before any vehicle thread starts
/// and share it by reference (usually an `Arc`). Consume it with
/// [`Intersection::teardown`] after every vehicle thread has been joined.
#[derive(Debug)]
pub struct Intersection {
    occupancy: Mutex<Occupancy>,
    changed: Condvar,
}

impl Intersection {
    /// Build the lock, the condition variable and an empty occupancy set
    pub fn init() -> Self {
        debug!("intersection initialised");
        Self {
            occupancy: Mutex::new(Occupancy::default()),
            changed: Condvar::new(),
        }
    }

    /// Destroy the intersection and report what was left inside
    pub fn teardown(self) -> Teardown {
        let occupancy = self
            .occupancy
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        if !occupancy.movements.is_empty() {
            warn!(
                "intersection torn down with {} vehicle(s) still inside",
                occupancy.movements.len()
            );
        }
        debug!("intersection torn down: {:?}", occupancy.stats);

        Teardown {
            stats: occupancy.stats,
            residual: occupancy.movements,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Occupancy> {
        self.occupancy
            .lock()
            .unwrap_or_else(|_| panic!("intersection lock poisoned by a panicking vehicle thread"))
    }

    /// Block until a vehicle going from `origin` to `destination` may enter
    ///
    /// The movement is checked against every current occupant. On any
    /// conflict the caller parks until the next exit and then rescans from
    /// the start, since the occupants may have changed arbitrarily.
    ///
    /// # Panics
    ///
    /// Panics if `origin == destination` or if the lock is poisoned.
    pub fn request_entry(&self, origin: Direction, destination: Direction) {
        let incoming = match Movement::new(origin, destination) {
            Ok(movement) => movement,
            Err(e) => panic!("request_entry precondition violated: {:#}", e),
        };

        let mut occupancy = self.lock();
        loop {
            let blocker = occupancy
                .movements
                .iter()
                .find(|existing| !incoming.compatible(existing))
                .copied();

            match blocker {
                None => break,
                Some(blocker) => {
                    trace!("{} waits for {} to clear", incoming, blocker);
                    occupancy.stats.waits += 1;
                    occupancy = self.changed.wait(occupancy).unwrap_or_else(|_| {
                        panic!("intersection lock poisoned while {} waited", incoming)
                    });
                }
            }
        }

        occupancy.movements.push(incoming);
        occupancy.stats.admitted += 1;
        let inside = occupancy.movements.len();
        occupancy.stats.peak_occupancy = occupancy.stats.peak_occupancy.max(inside);
        trace!("{} entered ({} inside)", incoming, inside);
    }

    /// Record that a vehicle going from `origin` to `destination` has left
    ///
    /// Removes the first occupant with the same origin and destination and
    /// wakes every parked requester. Returns false, leaving the occupants
    /// untouched, when nothing matches.
    pub fn report_exit(&self, origin: Direction, destination: Direction) -> bool {
        let mut occupancy = self.lock();

        let position = occupancy
            .movements
            .iter()
            .position(|m| m.origin() == origin && m.destination() == destination);

        match position {
            Some(index) => {
                let leaving = occupancy.movements.remove(index);
                occupancy.stats.exited += 1;
                self.changed.notify_all();
                trace!(
                    "{} exited ({} inside)",
                    leaving,
                    occupancy.movements.len()
                );
                true
            }
            None => {
                occupancy.stats.unmatched_exits += 1;
                warn!(
                    "exit {}->{} matches no vehicle in the intersection",
                    origin, destination
                );
                false
            }
        }
    }

    /// Enter the intersection and get a guard that reports the exit on drop
    pub fn enter(&self, origin: Direction, destination: Direction) -> Crossing<'_> {
        self.request_entry(origin, destination);
        Crossing {
            intersection: self,
            origin,
            destination,
        }
    }

    /// Snapshot of the movements currently inside, in admission order
    pub fn occupants(&self) -> Vec<Movement> {
        self.lock().movements.clone()
    }

    pub fn occupancy(&self) -> usize {
        self.lock().movements.len()
    }

    pub fn stats(&self) -> IntersectionStats {
        self.lock().stats
    }
}

impl Default for Intersection {
    fn default() -> Self {
        Self::init()
    }
}

/// A vehicle inside the intersection
///
/// Dropping it reports the exit, so the exit always uses the same origin and
/// destination the vehicle entered with.
#[derive(Debug)]
pub struct Crossing<'a> {
    intersection: &'a Intersection,
    origin: Direction,
    destination: Direction,
}

impl Crossing<'_> {
    pub fn origin(&self) -> Direction {
        self.origin
    }

    pub fn destination(&self) -> Direction {
        self.destination
    }
}

impl Drop for Crossing<'_> {
    fn drop(&mut self) {
        self.intersection.report_exit(self.origin, self.destination);
    }
}
