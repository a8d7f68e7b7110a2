// src/scene/mod.rs - Workspace parameters and the timestamped command schedule

pub mod parser;

pub use parser::parse_scene;

use std::fmt;
use std::path::Path;

use crate::config::ConfigError;
use crate::motion::{MotionError, Point3};

/// One timestamped target position. Its index in the schedule is the command level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    pub timestamp: f64,
    pub target: Point3,
}

impl Command {
    pub const fn new(timestamp: f64, target: Point3) -> Self {
        Self { timestamp, target }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s at {}", self.timestamp, self.target)
    }
}

/// Workspace parameters. Limits left unset in the scene file stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorkspaceConfig {
    /// Bounding-box extents; `dim.z` is the anchor height
    pub dim: Point3,
    /// Rig position before the first command
    pub start: Point3,
    /// Cruise speed
    pub vmax: Option<f64>,
    /// Acceleration magnitude
    pub amax: Option<f64>,
    /// Sampling rate in samples per second
    pub freq: Option<f64>,
}

impl WorkspaceConfig {
    pub fn vmax(&self) -> Result<f64, MotionError> {
        positive("vmax", self.vmax)
    }

    pub fn amax(&self) -> Result<f64, MotionError> {
        positive("amax", self.amax)
    }

    pub fn freq(&self) -> Result<f64, MotionError> {
        positive("freq", self.freq)
    }
}

fn positive(name: &str, value: Option<f64>) -> Result<f64, MotionError> {
    match value {
        None => Err(MotionError::Configuration(format!("{} is not set", name))),
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(v) => Err(MotionError::Configuration(format!(
            "{} must be a positive number, got {}",
            name, v
        ))),
    }
}

/// A loaded scene: workspace parameters plus the user commands in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub config: WorkspaceConfig,
    pub commands: Vec<Command>,
}

impl Scene {
    /// Command list ready for resolution, led by the synthetic start command.
    pub fn into_commands(self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(self.commands.len() + 1);
        commands.push(Command::new(0.0, self.config.start));
        commands.extend(self.commands);
        commands
    }
}

/// Read and parse a scene file.
pub fn load_scene(path: &Path) -> Result<Scene, ConfigError> {
    tracing::info!("Reading scene file: {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read scene file '{}': {}", path.display(), e);
        ConfigError::Io(e)
    })?;
    let scene = parse_scene(&contents)?;
    tracing::info!("Loaded {} commands from {}", scene.commands.len(), path.display());
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_limits_are_configuration_errors() {
        let config = WorkspaceConfig::default();
        assert!(matches!(config.vmax(), Err(MotionError::Configuration(_))));
        assert!(matches!(config.amax(), Err(MotionError::Configuration(_))));
        assert!(matches!(config.freq(), Err(MotionError::Configuration(_))));

        let config = WorkspaceConfig {
            vmax: Some(0.0),
            amax: Some(2.0),
            freq: Some(-5.0),
            ..WorkspaceConfig::default()
        };
        assert!(config.vmax().is_err());
        assert_eq!(config.amax().unwrap(), 2.0);
        assert!(config.freq().is_err());
    }

    #[test]
    fn test_start_command_is_prepended() {
        let scene = Scene {
            config: WorkspaceConfig {
                start: Point3::new(1.0, 2.0, 3.0),
                ..WorkspaceConfig::default()
            },
            commands: vec![Command::new(4.0, Point3::new(5.0, 5.0, 5.0))],
        };
        let commands = scene.into_commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], Command::new(0.0, Point3::new(1.0, 2.0, 3.0)));
        assert_eq!(commands[1].timestamp, 4.0);
    }

    #[test]
    fn test_command_display() {
        let command = Command::new(2.5, Point3::new(1.0, 0.0, 3.0));
        assert_eq!(command.to_string(), "2.5s at [1,0,3]");
    }
}
