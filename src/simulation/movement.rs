//! Vehicle movements and the pairwise conflict rules
//!
//! Pure value types with no shared state. The intersection monitor evaluates
//! these predicates against its live occupants on every check.

use anyhow::{bail, Result};
use std::fmt;

use super::types::{Direction, Turn};

/// The path a vehicle takes through the intersection
///
/// Two movements with the same origin and destination are interchangeable;
/// no per-vehicle identity is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Movement {
    origin: Direction,
    destination: Direction,
}

impl Movement {
    /// Create a movement, rejecting a vehicle that leaves the way it came
    pub fn new(origin: Direction, destination: Direction) -> Result<Self> {
        if origin == destination {
            bail!(
                "movement origin and destination are both {}; u-turns are not modelled",
                origin
            );
        }
        Ok(Self {
            origin,
            destination,
        })
    }

    /// All twelve valid movements
    pub fn all() -> impl Iterator<Item = Movement> {
        Direction::ALL.into_iter().flat_map(|origin| {
            Direction::ALL
                .into_iter()
                .filter(move |destination| *destination != origin)
                .map(move |destination| Movement {
                    origin,
                    destination,
                })
        })
    }

    pub fn origin(&self) -> Direction {
        self.origin
    }

    pub fn destination(&self) -> Direction {
        self.destination
    }

    /// True for exactly west->south, south->east, east->north and north->west
    pub fn is_right_turn(&self) -> bool {
        matches!(
            (self.origin, self.destination),
            (Direction::West, Direction::South)
                | (Direction::South, Direction::East)
                | (Direction::East, Direction::North)
                | (Direction::North, Direction::West)
        )
    }

    pub fn turn(&self) -> Turn {
        if self.is_right_turn() {
            Turn::Right
        } else if self.destination == self.origin.opposite() {
            Turn::Straight
        } else {
            Turn::Left
        }
    }

    /// Whether both movements may be inside the intersection at once
    ///
    /// Symmetric. Holds when the vehicles share an approach, drive exact
    /// reverse paths, or one of them turns right into a different exit.
    pub fn compatible(&self, other: &Movement) -> bool {
        if self.origin == other.origin {
            return true;
        }
        if self.origin == other.destination && self.destination == other.origin {
            return true;
        }
        (self.is_right_turn() || other.is_right_turn()) && self.destination != other.destination
    }

    pub fn conflicts_with(&self, other: &Movement) -> bool {
        !self.compatible(other)
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.origin, self.destination)
    }
}

/// Free-function form of [`Movement::is_right_turn`]
pub fn is_right_turn(movement: &Movement) -> bool {
    movement.is_right_turn()
}

/// Free-function form of [`Movement::compatible`]
pub fn compatible(a: &Movement, b: &Movement) -> bool {
    a.compatible(b)
}
