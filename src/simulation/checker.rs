//! Independent collision checker used by the simulation harness
//!
//! Keeps its own record of which movements are inside the intersection and
//! re-validates every entry against it, so a broken monitor shows up as a
//! counted violation instead of going unnoticed.

use log::error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::movement::Movement;

#[derive(Debug, Default)]
pub struct CollisionChecker {
    inside: Mutex<Vec<Movement>>,
    violations: AtomicUsize,
}

impl CollisionChecker {
    pub fn new() -> Self {
        Self::default()
    }

    fn inside(&self) -> MutexGuard<'_, Vec<Movement>> {
        self.inside.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a vehicle that was just admitted
    ///
    /// Call after `request_entry` returns. Returns the occupant it collides
    /// with, if any; the vehicle is recorded either way.
    pub fn enter(&self, movement: Movement) -> Option<Movement> {
        let mut inside = self.inside();
        let collision = inside.iter().find(|other| movement.conflicts_with(other)).copied();
        if let Some(other) = collision {
            self.violations.fetch_add(1, Ordering::Relaxed);
            error!("collision: {} entered while {} was inside", movement, other);
        }
        inside.push(movement);
        collision
    }

    /// Forget a vehicle that is about to leave
    ///
    /// Call before `report_exit`, so a waiter woken by that exit never sees a
    /// stale entry here.
    pub fn exit(&self, movement: Movement) -> bool {
        let mut inside = self.inside();
        match inside.iter().position(|m| *m == movement) {
            Some(index) => {
                inside.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn violations(&self) -> usize {
        self.violations.load(Ordering::Relaxed)
    }

    pub fn inside_count(&self) -> usize {
        self.inside().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::types::Direction::*;

    #[test]
    fn test_detects_conflicting_entry() {
        let checker = CollisionChecker::new();
        let a = Movement::new(North, East).unwrap();
        let b = Movement::new(South, East).unwrap();

        assert_eq!(checker.enter(a), None);
        assert_eq!(checker.enter(b), Some(a));
        assert_eq!(checker.violations(), 1);
        assert_eq!(checker.inside_count(), 2);
    }

    #[test]
    fn test_exit_clears_conflict() {
        let checker = CollisionChecker::new();
        let a = Movement::new(North, East).unwrap();
        let b = Movement::new(South, East).unwrap();

        checker.enter(a);
        assert!(checker.exit(a));
        assert!(!checker.exit(a));
        assert_eq!(checker.enter(b), None);
        assert_eq!(checker.violations(), 0);
    }
}
