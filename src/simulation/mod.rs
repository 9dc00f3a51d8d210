//! Four-way intersection synchronization
//!
//! The monitor in [`intersection`] decides which vehicle threads may be inside
//! the intersection together. [`SimWorld`] is a harness that drives random
//! vehicles through it and checks the result.

mod checker;
mod intersection;
mod movement;
mod stats;
mod types;
mod world;

pub use checker::CollisionChecker;
pub use intersection::{Crossing, Intersection, IntersectionStats, Teardown};
pub use movement::{compatible, is_right_turn, Movement};
pub use stats::{ApproachStats, Approaches, SimReport};
pub use types::{
    Direction, Turn, DEFAULT_CROSSING_TIME, DEFAULT_MAX_ARRIVAL_DELAY, DEFAULT_THREADS,
    DEFAULT_VEHICLES_PER_THREAD,
};
pub use world::{SimConfig, SimWorld};
