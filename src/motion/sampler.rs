// src/motion/sampler.rs - Discrete time grid and camera path for one move
use super::{Move, MotionError, Point3, TrapezoidalProfile};

/// Camera positions laid out one sequence per axis (x, y, z), each ordered by time.
pub type AxisSeries = [Vec<f64>; 3];

/// Upper bound on the samples a single move may produce.
pub const MAX_SAMPLES_PER_MOVE: usize = 10_000_000;

/// Evenly spaced sample times `j / freq` for `j = 0 ..= floor(t_c * freq)`.
///
/// The last sample may fall short of `t_c`; it is never rounded up.
pub fn time_grid(t_c: f64, freq: f64) -> Result<Vec<f64>, MotionError> {
    if !(freq.is_finite() && freq > 0.0) {
        return Err(MotionError::Configuration(format!(
            "freq must be a positive number, got {}",
            freq
        )));
    }
    if !(t_c.is_finite() && t_c >= 0.0) {
        return Err(MotionError::InvalidArgument(format!(
            "move duration must be a non-negative number, got {}",
            t_c
        )));
    }

    let span = (t_c * freq).floor();
    if !(span < MAX_SAMPLES_PER_MOVE as f64) {
        return Err(MotionError::InvalidArgument(format!(
            "move of {} s at {} Hz exceeds {} samples",
            t_c, freq, MAX_SAMPLES_PER_MOVE
        )));
    }
    let last = span as usize;
    let mut grid = Vec::with_capacity(last + 1);
    for j in 0..=last {
        grid.push(j as f64 / freq);
    }
    Ok(grid)
}

/// Interpolate the camera along the straight line of `mv` at every grid time.
pub fn positions_along(
    mv: &Move,
    profile: &TrapezoidalProfile,
    grid: &[f64],
) -> Result<AxisSeries, MotionError> {
    let lambdas = grid
        .iter()
        .map(|&t| profile.fraction(mv.index, t))
        .collect::<Result<Vec<f64>, _>>()?;

    let start = mv.start.to_array();
    let end = mv.end.to_array();
    let mut series: AxisSeries = Default::default();
    for (k, axis) in series.iter_mut().enumerate() {
        *axis = lambdas
            .iter()
            .map(|lambda| start[k] + lambda * (end[k] - start[k]))
            .collect();
    }
    Ok(series)
}

/// Camera position at a single instant of the move.
pub fn position_at_time(
    mv: &Move,
    profile: &TrapezoidalProfile,
    t: f64,
) -> Result<Point3, MotionError> {
    let lambda = profile.fraction(mv.index, t)?;
    let start = mv.start.to_array();
    let end = mv.end.to_array();
    let mut coords = [0.0; 3];
    for k in 0..3 {
        coords[k] = start[k] + lambda * (end[k] - start[k]);
    }
    Ok(Point3::from_array(coords))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_grid_sample_count() {
        let grid = time_grid(5.0, 10.0).unwrap();
        assert_eq!(grid.len(), 51);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[50], 5.0);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_time_grid_truncates() {
        let grid = time_grid(1.25, 2.0).unwrap();
        assert_eq!(grid, vec![0.0, 0.5, 1.0]);
        assert_eq!(time_grid(0.0, 100.0).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_time_grid_rejects_bad_input() {
        assert!(matches!(time_grid(1.0, 0.0), Err(MotionError::Configuration(_))));
        assert!(matches!(time_grid(-1.0, 10.0), Err(MotionError::InvalidArgument(_))));
    }

    #[test]
    fn test_time_grid_rejects_oversized_moves() {
        assert!(matches!(time_grid(5e17, 10.0), Err(MotionError::InvalidArgument(_))));
        assert!(matches!(time_grid(5.0, 1e9), Err(MotionError::InvalidArgument(_))));
        let limit = MAX_SAMPLES_PER_MOVE as f64;
        assert!(matches!(time_grid(limit, 1.0), Err(MotionError::InvalidArgument(_))));
    }

    #[test]
    fn test_positions_along_straight_line() {
        let mv = Move::new(0, Point3::new(1.0, 1.0, 0.0), Point3::new(1.0, 1.0, 6.0));
        let profile = TrapezoidalProfile::new(mv.delta, 2.0, 1.0).unwrap();
        let grid = time_grid(profile.duration(), 10.0).unwrap();
        let series = positions_along(&mv, &profile, &grid).unwrap();

        for axis in &series {
            assert_eq!(axis.len(), grid.len());
        }
        assert!(series[0].iter().all(|&x| x == 1.0));
        assert!(series[1].iter().all(|&y| y == 1.0));
        assert_eq!(series[2][0], 0.0);
        assert!((series[2][50] - 6.0).abs() < 1e-9);
        assert!(series[2].windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_degenerate_move_is_rejected() {
        let p = Point3::new(2.0, 2.0, 2.0);
        let mv = Move::new(4, p, p);
        let profile = TrapezoidalProfile::new(mv.delta, 2.0, 1.0).unwrap();
        let grid = time_grid(profile.duration(), 10.0).unwrap();
        assert_eq!(
            positions_along(&mv, &profile, &grid),
            Err(MotionError::DivisionByZero { index: 4 })
        );
    }

    #[test]
    fn test_position_at_time() {
        let mv = Move::new(0, Point3::new(0.0, 0.0, 0.0), Point3::new(6.0, 0.0, 0.0));
        let profile = TrapezoidalProfile::new(mv.delta, 2.0, 1.0).unwrap();
        let midway = position_at_time(&mv, &profile, 2.5).unwrap();
        assert!((midway.x - 3.0).abs() < 1e-9);
        assert_eq!(midway.y, 0.0);
    }
}
