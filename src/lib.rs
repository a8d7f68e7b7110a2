//! # spidercam-rs
//!
//! Motion planning and cable kinematics for a four-winch cable-suspended camera rig.
//!
//! A scene (workspace extents, motion limits and a timestamped list of target
//! positions) is resolved move by move: each move follows a trapezoidal
//! velocity profile, is sampled at a fixed rate, and is converted to the four
//! cable lengths that realize it. Moves that cannot finish before the next
//! command is due defer the command after next.
//!
//! ## Modules
//!
//! - [`scene`]: workspace parameters, commands and the scene file parser
//! - [`motion`]: profile math, sampling, cable kinematics and schedule resolution
//! - [`file_manager`]: output tables and in-memory sinks
//! - [`config`]: optional TOML run settings

pub mod config;
pub mod file_manager;
pub mod motion;
pub mod scene;

pub use config::{ConfigError, Settings};
pub use file_manager::{OutputError, OutputWriter, RecordingSink};
pub use motion::{MotionError, Point3, ResolveReport, ScheduleResolver, Termination, TrajectorySink};
pub use scene::{Command, Scene, WorkspaceConfig};
