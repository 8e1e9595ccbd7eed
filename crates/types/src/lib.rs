//! Shared types for Tickbus simulations.
//!
//! Everything that travels over the message bus lives here, together with the
//! occupancy grid the sample modules operate on. This crate has no knowledge
//! of the bus or the scheduler.

mod map;
mod messages;

pub use map::{GridMap, MapError};
pub use messages::{
    AltitudeReading, ControlMsg, Direction, LidarPoint, LidarScanMsg, ParseDirectionError,
    ThrustCommand, TrueStateMsg,
};

/// Simulated time in nanoseconds since the start of a run.
pub type SimTime = u64;
