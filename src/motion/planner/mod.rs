// src/motion/planner/mod.rs
//
// Schedule resolution: walks the command list move by move, emits every move
// that finishes before the next command is due and defers later commands when
// one does not.

use std::fmt;

use super::kinematics::{self, CableLengths, Kinematics, SpidercamKinematics};
use super::sampler::{self, AxisSeries};
use super::trajectory::{StageVector, TrapezoidalProfile};
use super::{command_at, Move, MotionError, Point3};
use crate::file_manager::OutputError;
use crate::scene::{Command, WorkspaceConfig};

/// Command level the traversal starts from: the move out of the synthetic
/// start command, which reaches the first user command.
pub const DEFAULT_START_INDEX: usize = 0;

const RECONSTRUCTION_TOLERANCE: f64 = 1e-6;

/// Receiver for the results of every successfully resolved move.
pub trait TrajectorySink {
    /// Called once per move with the four cable-length series.
    fn emit_cable_lengths(&mut self, lengths: &CableLengths) -> Result<(), OutputError>;

    /// Called once per move with the workspace extents, time grid and camera path.
    fn emit_positions(
        &mut self,
        dim: &Point3,
        time_grid: &[f64],
        positions: &AxisSeries,
    ) -> Result<(), OutputError>;
}

impl<S: TrajectorySink + ?Sized> TrajectorySink for &mut S {
    fn emit_cable_lengths(&mut self, lengths: &CableLengths) -> Result<(), OutputError> {
        (**self).emit_cable_lengths(lengths)
    }

    fn emit_positions(
        &mut self,
        dim: &Point3,
        time_grid: &[f64],
        positions: &AxisSeries,
    ) -> Result<(), OutputError> {
        (**self).emit_positions(dim, time_grid, positions)
    }
}

/// Fully sampled move, ready for emission.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRecord {
    pub index: usize,
    pub stages: StageVector,
    pub time_grid: Vec<f64>,
    pub positions: AxisSeries,
    pub cable_lengths: CableLengths,
}

/// A move that could not finish before the next command was due.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conflict {
    pub index: usize,
    /// Time the move needs
    pub required: f64,
    /// Time until the next command is due
    pub available: f64,
    pub camera_stop_time: f64,
}

/// A command whose timestamp was pushed back during resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reschedule {
    pub index: usize,
    pub from: f64,
    pub to: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Termination {
    /// Every reachable command was processed
    #[default]
    Exhausted,
    /// A conflict at `index` could not be deferred; the rest of the schedule is dropped
    Truncated { index: usize },
    /// The traversal reached outside the command list
    IndexError { index: usize },
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveReport {
    /// Command levels whose moves were emitted, in order
    pub emitted: Vec<usize>,
    /// Command levels whose moves were skipped (zero length or bad numerics)
    pub skipped: Vec<usize>,
    pub conflicts: Vec<Conflict>,
    pub rescheduled: Vec<Reschedule>,
    /// Emission calls the sink rejected
    pub sink_failures: usize,
    pub termination: Termination,
}

impl fmt::Display for ResolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} move(s) emitted, {} skipped, {} conflict(s), {} command(s) rescheduled",
            self.emitted.len(),
            self.skipped.len(),
            self.conflicts.len(),
            self.rescheduled.len()
        )?;
        if self.sink_failures > 0 {
            write!(f, ", {} output failure(s)", self.sink_failures)?;
        }
        match self.termination {
            Termination::Exhausted => write!(f, "; schedule completed"),
            Termination::Truncated { index } => {
                write!(f, "; schedule truncated after command {}", index)
            }
            Termination::IndexError { index } => {
                write!(f, "; aborted at out-of-range command {}", index)
            }
        }
    }
}

/// Drives profile, sampling and kinematics across the whole command list.
pub struct ScheduleResolver<S> {
    config: WorkspaceConfig,
    kinematics: SpidercamKinematics,
    vmax: f64,
    amax: f64,
    freq: f64,
    sink: S,
}

impl<S: TrajectorySink> ScheduleResolver<S> {
    /// Validates the motion limits up front; an unusable configuration aborts the run.
    pub fn new(config: WorkspaceConfig, sink: S) -> Result<Self, MotionError> {
        let vmax = config.vmax()?;
        let amax = config.amax()?;
        let freq = config.freq()?;
        Ok(Self {
            kinematics: SpidercamKinematics::new(config.dim),
            config,
            vmax,
            amax,
            freq,
            sink,
        })
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn resolve(&mut self, commands: &mut [Command]) -> Result<ResolveReport, MotionError> {
        self.resolve_from(commands, DEFAULT_START_INDEX)
    }

    /// Resolve the schedule starting at command level `start`.
    ///
    /// Timestamps of later commands may be overwritten in place. Only
    /// configuration errors are returned; everything else is recorded in the
    /// report.
    pub fn resolve_from(
        &mut self,
        commands: &mut [Command],
        start: usize,
    ) -> Result<ResolveReport, MotionError> {
        let mut report = ResolveReport::default();
        self.check_workspace(commands, start);

        if start >= commands.len() {
            tracing::error!(
                "Start index {} out of range ({} commands)",
                start,
                commands.len()
            );
            report.termination = Termination::IndexError { index: start };
        }

        let mut i = start;
        while i < commands.len().saturating_sub(1) {
            match self.step(commands, i, &mut report) {
                Ok(Some(next)) => i = next,
                Ok(None) => break,
                Err(MotionError::ScheduleIndex { index, len }) => {
                    tracing::error!("Command index {} out of range ({} commands)", index, len);
                    report.termination = Termination::IndexError { index };
                    break;
                }
                Err(e @ MotionError::Configuration(_)) => {
                    tracing::error!("Aborting schedule at command {}: {}", i, e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("Skipping move at command {}: {}", i, e);
                    report.skipped.push(i);
                    i += 1;
                }
            }
        }

        tracing::info!("{}", report);
        Ok(report)
    }

    /// Sample a move and compute its cable lengths.
    pub fn plan_move(
        &self,
        mv: &Move,
        profile: &TrapezoidalProfile,
    ) -> Result<MoveRecord, MotionError> {
        let time_grid = sampler::time_grid(profile.duration(), self.freq)?;
        let positions = sampler::positions_along(mv, profile, &time_grid)?;
        let cable_lengths = kinematics::lengths_over_time(&positions, self.kinematics.anchors())?;
        Ok(MoveRecord {
            index: mv.index,
            stages: profile.stage_vector(),
            time_grid,
            positions,
            cable_lengths,
        })
    }

    /// One traversal step at command level `i`; returns the next level, or
    /// `None` when the traversal stops.
    fn step(
        &mut self,
        commands: &mut [Command],
        i: usize,
        report: &mut ResolveReport,
    ) -> Result<Option<usize>, MotionError> {
        let mv = Move::between(commands, i)?;
        let profile = TrapezoidalProfile::new(mv.delta, self.vmax, self.amax)?;
        let exec_time = profile.duration();
        let from = *command_at(commands, i)?;
        let to = *command_at(commands, i + 1)?;
        let current_start = from.timestamp;
        let next_start = to.timestamp;

        if !profile.is_well_formed() {
            tracing::debug!(
                "Command {}: move of {} is too short to reach cruise speed",
                i,
                mv.delta
            );
        }

        if next_start == 0.0 || current_start + exec_time < next_start {
            tracing::info!(
                "command {} succeeds: from {} to {}, execution time: {} seconds",
                i,
                from,
                to,
                exec_time
            );
            tracing::debug!("StageVector: {}", profile.stage_vector());

            let record = self.plan_move(&mv, &profile)?;
            tracing::debug!("Command {}: {} samples", i, record.time_grid.len());
            if let Err(e) = self.check_cable_lengths(&record) {
                tracing::warn!("Command {}: {}", i, e);
            }
            self.emit(&record, report);
            report.emitted.push(i);
            return Ok(Some(i + 1));
        }

        let elapsed = next_start - current_start;
        let camera_stop_time =
            current_start + elapsed + profile.velocity_at(elapsed) / self.amax;
        tracing::info!(
            "command {} failed: from {} to {}, command needs {} seconds for the execution, camera stopped at {}s",
            i,
            from,
            to,
            exec_time,
            camera_stop_time
        );
        tracing::debug!("StageVector: {}", profile.stage_vector());
        report.conflicts.push(Conflict {
            index: i,
            required: exec_time,
            available: elapsed,
            camera_stop_time,
        });

        let last = commands.len() - 1;
        if i + 2 < last {
            let len = commands.len();
            let deferred = commands
                .get_mut(i + 2)
                .ok_or(MotionError::ScheduleIndex { index: i + 2, len })?;
            if camera_stop_time > deferred.timestamp {
                tracing::warn!(
                    "Deferring command {} from {}s to {}s",
                    i + 2,
                    deferred.timestamp,
                    camera_stop_time
                );
                report.rescheduled.push(Reschedule {
                    index: i + 2,
                    from: deferred.timestamp,
                    to: camera_stop_time,
                });
                deferred.timestamp = camera_stop_time;
                return Ok(Some(i + 2));
            }
        }

        tracing::warn!("Schedule truncated: no command after {} can be deferred", i);
        report.termination = Termination::Truncated { index: i };
        Ok(None)
    }

    /// Rebuild the final sampled position from its four cable lengths.
    ///
    /// Fails when the lengths do not lead back to the sampled camera position,
    /// e.g. for a target above the anchor plane.
    pub fn check_cable_lengths(&self, record: &MoveRecord) -> Result<(), MotionError> {
        let Some(last) = record.time_grid.len().checked_sub(1) else {
            return Ok(());
        };
        let motors: [f64; 4] = std::array::from_fn(|cable| record.cable_lengths[cable][last]);
        let rebuilt = Point3::from_array(self.kinematics.motors_to_cartesian(&motors)?);
        let sampled = Point3::new(
            record.positions[0][last],
            record.positions[1][last],
            record.positions[2][last],
        );
        let scale = self.config.dim.to_array().iter().fold(1.0_f64, |m, d| m.max(d.abs()));
        if rebuilt.distance_to(&sampled) > RECONSTRUCTION_TOLERANCE * scale {
            return Err(MotionError::InvalidArgument(format!(
                "cable lengths of command {} lead to {} instead of {}",
                record.index, rebuilt, sampled
            )));
        }
        Ok(())
    }

    fn emit(&mut self, record: &MoveRecord, report: &mut ResolveReport) {
        if let Err(e) = self.sink.emit_cable_lengths(&record.cable_lengths) {
            tracing::warn!("Failed to emit cable lengths for command {}: {}", record.index, e);
            report.sink_failures += 1;
        }
        if let Err(e) = self
            .sink
            .emit_positions(&self.config.dim, &record.time_grid, &record.positions)
        {
            tracing::warn!("Failed to emit positions for command {}: {}", record.index, e);
            report.sink_failures += 1;
        }
    }

    fn check_workspace(&self, commands: &[Command], start: usize) {
        for (index, command) in commands.iter().enumerate().skip(start) {
            if !self.kinematics.is_valid_position(&command.target.to_array()) {
                tracing::warn!(
                    "Command {} target {} lies outside the workspace {}",
                    index,
                    command.target,
                    self.config.dim
                );
            }
        }
    }
}
