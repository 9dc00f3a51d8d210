//! Core types for the intersection simulation
//!
//! Directions, turn classes and the harness defaults.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// One of the four approaches to the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Every direction, clockwise starting at north
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The direction directly across the intersection
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Position in [`Direction::ALL`]
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Direction::North),
            "e" | "east" => Ok(Direction::East),
            "s" | "south" => Ok(Direction::South),
            "w" | "west" => Ok(Direction::West),
            other => bail!("unknown direction '{}'", other),
        }
    }
}

/// How a movement crosses the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    /// Turning into the nearest exit; only conflicts on a shared destination
    Right,
    /// Driving through to the opposite side
    Straight,
    /// Crossing the oncoming lanes
    Left,
}

/// Default number of concurrent vehicle threads
pub const DEFAULT_THREADS: usize = 10;

/// Default number of vehicles each thread drives through the intersection
pub const DEFAULT_VEHICLES_PER_THREAD: usize = 20;

/// Default time a vehicle spends inside the intersection
pub const DEFAULT_CROSSING_TIME: Duration = Duration::from_millis(1);

/// Default upper bound on the pause between two arrivals from one thread
pub const DEFAULT_MAX_ARRIVAL_DELAY: Duration = Duration::from_millis(2);
