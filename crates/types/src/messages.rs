//! Message payloads exchanged between simulation modules.
//!
//! Every message is a plain value: it is cloned into each subscriber queue,
//! so a receiver is free to mutate its copy.

use crate::SimTime;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A grid direction. Rows grow towards +y, so `Up` decreases `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in declaration order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Cell offset `(dx, dy)` for a single step in this direction.
    ///
    /// Exactly one axis changes, by exactly one cell.
    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Apply one step in this direction to `(x, y)`.
    pub fn step(self, x: i64, y: i64) -> (i64, i64) {
        let (dx, dy) = self.offset();
        (x + dx, y + dy)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// Error returned when parsing an unknown direction name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown direction: {0}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Request to move the robot one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlMsg {
    /// Requested direction of travel.
    pub direction: Direction,
    /// Time the command was issued.
    pub time_ns: SimTime,
}

impl ControlMsg {
    pub fn new(direction: Direction, time_ns: SimTime) -> Self {
        Self { direction, time_ns }
    }
}

/// Ground-truth grid position of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrueStateMsg {
    pub x: i64,
    pub y: i64,
    /// Time the position was observed.
    pub time_ns: SimTime,
}

impl TrueStateMsg {
    pub fn new(x: i64, y: i64, time_ns: SimTime) -> Self {
        Self { x, y, time_ns }
    }
}

/// A single LiDAR return in polar coordinates relative to the robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LidarPoint {
    /// Beam angle in radians.
    pub theta: f64,
    /// Distance to the first occupied cell along the beam.
    pub range: f64,
}

impl LidarPoint {
    pub fn new(theta: f64, range: f64) -> Self {
        Self { theta, range }
    }
}

/// One full LiDAR sweep.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LidarScanMsg {
    /// Returns, one per beam that hit an obstacle within range.
    pub points: Vec<LidarPoint>,
    /// Time of the robot state the scan was taken from.
    pub time_ns: SimTime,
}

impl LidarScanMsg {
    pub fn new(points: Vec<LidarPoint>, time_ns: SimTime) -> Self {
        Self { points, time_ns }
    }
}

/// Throttle request for the vertical thrust plant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustCommand {
    /// Fraction of maximum thrust. Values outside `[0, 1]` are clamped by the plant.
    pub fraction: f64,
    pub time_ns: SimTime,
}

impl ThrustCommand {
    pub fn new(fraction: f64, time_ns: SimTime) -> Self {
        Self { fraction, time_ns }
    }
}

/// Sensor reading published by the vertical thrust plant.
///
/// `position` is exact; `velocity` and `acceleration` carry sensor noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeReading {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub time_ns: SimTime,
}
