//! Intersection Synchronization Library
//!
//! A monitor that lets concurrent vehicle threads share a four-way
//! intersection without colliding, plus a headless harness to exercise it.

pub mod simulation;
