// src/motion/trajectory.rs - Trapezoidal velocity profile for a single move
use super::MotionError;
use std::fmt;

/// Phase boundary times of a move: end of acceleration, end of cruise, end of move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageVector {
    pub t_a: f64,
    pub t_b: f64,
    pub t_c: f64,
}

impl fmt::Display for StageVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{}]", self.t_a, self.t_b, self.t_c)
    }
}

/// Trapezoidal speed-over-distance profile
///
/// The move accelerates at `amax` up to `vmax`, cruises, then decelerates
/// symmetrically. Moves shorter than the combined acceleration and
/// deceleration distance are not reshaped into a triangular profile; their
/// cruise phase simply has negative duration (`t_b < t_a`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapezoidalProfile {
    /// Length of the move
    delta: f64,
    /// Cruise speed
    vmax: f64,
    /// Acceleration and deceleration magnitude
    amax: f64,
    /// Distance covered while accelerating
    st_a: f64,
    stages: StageVector,
}

impl TrapezoidalProfile {
    pub fn new(delta: f64, vmax: f64, amax: f64) -> Result<Self, MotionError> {
        if !(vmax.is_finite() && vmax > 0.0) {
            return Err(MotionError::Configuration(format!(
                "vmax must be a positive number, got {}",
                vmax
            )));
        }
        if !(amax.is_finite() && amax > 0.0) {
            return Err(MotionError::Configuration(format!(
                "amax must be a positive number, got {}",
                amax
            )));
        }
        if !(delta.is_finite() && delta >= 0.0) {
            return Err(MotionError::InvalidArgument(format!(
                "move length must be a non-negative number, got {}",
                delta
            )));
        }

        let t_a = vmax / amax;
        let st_a = (amax / 2.0) * t_a * t_a;
        let t_b = t_a + (delta - 2.0 * st_a) / vmax;
        let t_c = t_a + t_b;

        Ok(Self {
            delta,
            vmax,
            amax,
            st_a,
            stages: StageVector { t_a, t_b, t_c },
        })
    }

    pub fn stage_vector(&self) -> StageVector {
        self.stages
    }

    /// Total execution time of the move.
    pub fn duration(&self) -> f64 {
        self.stages.t_c
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn accel_distance(&self) -> f64 {
        self.st_a
    }

    /// True when the move is long enough to reach cruise speed.
    pub fn is_well_formed(&self) -> bool {
        self.stages.t_b >= self.stages.t_a
    }

    /// Distance travelled along the move at time `t`.
    ///
    /// Past the end of the move the full length is returned.
    pub fn position_at(&self, t: f64) -> Result<f64, MotionError> {
        let StageVector { t_a, t_b, t_c } = self.stages;
        if !t.is_finite() || t < 0.0 {
            return Err(MotionError::OutOfRange { t, duration: t_c });
        }

        let distance = if t <= t_a {
            (self.amax / 2.0) * t * t
        } else if t_a <= t && t <= t_b {
            self.st_a + self.vmax * (t - t_a)
        } else if t_b <= t && t <= t_c {
            self.delta - (self.amax / 2.0) * (t - t_c) * (t - t_c)
        } else {
            self.delta
        };
        Ok(distance)
    }

    /// Instantaneous speed at time `t`.
    ///
    /// The tail branch evaluates `(vmax - amax) * (t - t_a)`; conflict
    /// resolution depends on this exact value.
    pub fn velocity_at(&self, t: f64) -> f64 {
        let StageVector { t_a, t_b, .. } = self.stages;
        if 0.0 <= t && t <= t_a {
            self.amax * t
        } else if t_a < t && t < t_b {
            self.vmax
        } else {
            (self.vmax - self.amax) * (t - t_a)
        }
    }

    /// Normalized progress along the move at time `t`.
    pub fn fraction(&self, index: usize, t: f64) -> Result<f64, MotionError> {
        if self.delta == 0.0 {
            return Err(MotionError::DivisionByZero { index });
        }
        Ok(self.position_at(t)? / self.delta)
    }
}
