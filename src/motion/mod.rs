// src/motion/mod.rs - Motion planning and cable kinematics for the camera rig

pub mod geometry;
pub mod kinematics;
pub mod planner;
pub mod sampler;
pub mod trajectory;

pub use geometry::AnchorPoints;
pub use kinematics::{CableLengths, Kinematics, SpidercamKinematics};
pub use planner::{MoveRecord, ResolveReport, ScheduleResolver, Termination, TrajectorySink};
pub use sampler::AxisSeries;
pub use trajectory::{StageVector, TrapezoidalProfile};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::scene::Command;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Schedule index {index} out of range for {len} commands")]
    ScheduleIndex { index: usize, len: usize },
    #[error("Division by zero: move at command level {index} has zero length")]
    DivisionByZero { index: usize },
    #[error("Time {t}s is outside the move duration [0, {duration}]s")]
    OutOfRange { t: f64, duration: f64 },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// A point (or extent) in workspace coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(coords: [f64; 3]) -> Self {
        Self::new(coords[0], coords[1], coords[2])
    }

    /// Euclidean distance between two points.
    pub fn distance_to(&self, other: &Point3) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{}]", self.x, self.y, self.z)
    }
}

/// Straight-line move between two consecutive command targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    /// Command level the move starts from
    pub index: usize,
    pub start: Point3,
    pub end: Point3,
    /// Euclidean length of the move
    pub delta: f64,
}

impl Move {
    pub fn new(index: usize, start: Point3, end: Point3) -> Self {
        Self {
            index,
            start,
            end,
            delta: start.distance_to(&end),
        }
    }

    /// Build the move from command `index` to command `index + 1`.
    pub fn between(commands: &[Command], index: usize) -> Result<Self, MotionError> {
        let from = command_at(commands, index)?;
        let to = command_at(commands, index + 1)?;
        Ok(Self::new(index, from.target, to.target))
    }
}

/// Bounds-checked command access.
pub(crate) fn command_at(commands: &[Command], index: usize) -> Result<&Command, MotionError> {
    commands.get(index).ok_or(MotionError::ScheduleIndex {
        index,
        len: commands.len(),
    })
}
