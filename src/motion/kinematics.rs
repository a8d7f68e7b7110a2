// src/motion/kinematics.rs
use super::{AnchorPoints, AxisSeries, MotionError, Point3};

/// Cable lengths over time, one sequence per anchor in R1..R4 order.
pub type CableLengths = [Vec<f64>; 4];

/// Kinematics handler mapping camera positions to winch (cable) coordinates
pub trait Kinematics {
    /// Convert a Cartesian camera position to the four cable lengths
    fn cartesian_to_motors(&self, cartesian: &[f64; 3]) -> Result<[f64; 4], MotionError>;

    /// Convert four cable lengths back to a Cartesian camera position
    fn motors_to_cartesian(&self, motors: &[f64; 4]) -> Result<[f64; 3], MotionError>;

    /// Check if position is inside the reachable workspace
    fn is_valid_position(&self, cartesian: &[f64; 3]) -> bool;
}

/// Length of the cable running from `anchor` to the camera at `position`.
pub fn cable_length(position: &Point3, anchor: &Point3) -> f64 {
    position.distance_to(anchor)
}

/// Per-sample cable lengths for a camera path.
pub fn lengths_over_time(
    series: &AxisSeries,
    anchors: &AnchorPoints,
) -> Result<CableLengths, MotionError> {
    let samples = series[0].len();
    if series[1].len() != samples || series[2].len() != samples {
        return Err(MotionError::InvalidArgument(format!(
            "axis series lengths differ: x={}, y={}, z={}",
            series[0].len(),
            series[1].len(),
            series[2].len()
        )));
    }

    let mut lengths: CableLengths = Default::default();
    for (cable, anchor) in lengths.iter_mut().zip(anchors.iter()) {
        *cable = (0..samples)
            .map(|j| {
                let position = Point3::new(series[0][j], series[1][j], series[2][j]);
                cable_length(&position, anchor)
            })
            .collect();
    }
    Ok(lengths)
}

/// Four-cable suspension kinematics for a rectangular workspace
#[derive(Debug, Clone, PartialEq)]
pub struct SpidercamKinematics {
    anchors: AnchorPoints,
    dim: Point3,
}

impl SpidercamKinematics {
    /// Relative tolerance used when cross-checking the fourth cable.
    const CONSISTENCY_TOLERANCE: f64 = 1e-6;

    pub fn new(dim: Point3) -> Self {
        Self {
            anchors: AnchorPoints::from_dimensions(dim),
            dim,
        }
    }

    pub fn anchors(&self) -> &AnchorPoints {
        &self.anchors
    }
}

impl Kinematics for SpidercamKinematics {
    fn cartesian_to_motors(&self, cartesian: &[f64; 3]) -> Result<[f64; 4], MotionError> {
        if cartesian.iter().any(|c| !c.is_finite()) {
            return Err(MotionError::InvalidArgument(format!(
                "non-finite camera position {:?}",
                cartesian
            )));
        }
        let position = Point3::from_array(*cartesian);
        let mut motors = [0.0; 4];
        for (motor, anchor) in motors.iter_mut().zip(self.anchors.iter()) {
            *motor = cable_length(&position, anchor);
        }
        Ok(motors)
    }

    fn motors_to_cartesian(&self, motors: &[f64; 4]) -> Result<[f64; 3], MotionError> {
        let (dim_x, dim_y) = (self.dim.x, self.dim.y);
        if dim_x <= 0.0 || dim_y <= 0.0 {
            return Err(MotionError::Configuration(
                "forward kinematics needs a workspace with positive width and depth".to_string(),
            ));
        }
        if motors.iter().any(|l| !l.is_finite() || *l < 0.0) {
            return Err(MotionError::InvalidArgument(format!(
                "cable lengths must be non-negative numbers, got {:?}",
                motors
            )));
        }

        // Trilaterate from R1, R2 and R3; the camera hangs below the anchor plane.
        let [l1, l2, l3, l4] = motors.map(|l| l * l);
        let x = (l1 - l2 + dim_x * dim_x) / (2.0 * dim_x);
        let y = (l1 - l3 + dim_y * dim_y) / (2.0 * dim_y);
        let scale = l1.max(l2).max(l3).max(1.0);
        let drop_sq = l1 - x * x - y * y;
        if drop_sq < -Self::CONSISTENCY_TOLERANCE * scale {
            return Err(MotionError::InvalidArgument(format!(
                "cable lengths {:?} do not meet at a single point",
                motors
            )));
        }
        let z = self.anchors.height() - drop_sq.max(0.0).sqrt();

        let expected_l4 = (x - dim_x).powi(2) + (y - dim_y).powi(2) + drop_sq.max(0.0);
        if (expected_l4 - l4).abs() > Self::CONSISTENCY_TOLERANCE * scale {
            return Err(MotionError::InvalidArgument(format!(
                "fourth cable length {} is inconsistent with the other three",
                motors[3]
            )));
        }
        Ok([x, y, z])
    }

    fn is_valid_position(&self, cartesian: &[f64; 3]) -> bool {
        let limits = self.dim.to_array();
        cartesian
            .iter()
            .zip(limits.iter())
            .all(|(c, max)| *c >= 0.0 && c <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> SpidercamKinematics {
        SpidercamKinematics::new(Point3::new(10.0, 8.0, 6.0))
    }

    #[test]
    fn test_length_zero_at_anchor() {
        let kin = workspace();
        let anchors = *kin.anchors();
        let series: AxisSeries = [vec![10.0], vec![0.0], vec![6.0]];
        let lengths = lengths_over_time(&series, &anchors).unwrap();
        assert_eq!(lengths[1], vec![0.0]);
        assert!(lengths[0][0] > 0.0);
    }

    #[test]
    fn test_symmetric_positions_have_equal_length() {
        let anchors = *workspace().anchors();
        // Mirror images about R1's projection (0, 0)
        let series: AxisSeries = [vec![2.0, -2.0, 3.0], vec![1.0, -1.0, -1.5], vec![1.0, 1.0, 2.0]];
        let lengths = lengths_over_time(&series, &anchors).unwrap();
        assert_eq!(lengths[0][0], lengths[0][1]);
        for cable in &lengths {
            assert_eq!(cable.len(), 3);
        }
    }

    #[test]
    fn test_mismatched_series_is_rejected() {
        let anchors = *workspace().anchors();
        let series: AxisSeries = [vec![1.0, 2.0], vec![1.0], vec![1.0, 2.0]];
        assert!(matches!(
            lengths_over_time(&series, &anchors),
            Err(MotionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_forward_kinematics_recovers_position() {
        let kin = workspace();
        let position = [3.0, 5.0, 1.5];
        let motors = kin.cartesian_to_motors(&position).unwrap();
        let recovered = kin.motors_to_cartesian(&motors).unwrap();
        for (a, b) in position.iter().zip(recovered.iter()) {
            assert!((a - b).abs() < 1e-9, "{:?} != {:?}", position, recovered);
        }
    }

    #[test]
    fn test_forward_kinematics_rejects_inconsistent_lengths() {
        let kin = workspace();
        let mut motors = kin.cartesian_to_motors(&[3.0, 5.0, 1.5]).unwrap();
        motors[3] += 1.0;
        assert!(kin.motors_to_cartesian(&motors).is_err());
    }

    #[test]
    fn test_valid_position() {
        let kin = workspace();
        assert!(kin.is_valid_position(&[5.0, 4.0, 3.0]));
        assert!(kin.is_valid_position(&[0.0, 8.0, 6.0]));
        assert!(!kin.is_valid_position(&[11.0, 4.0, 3.0]));
        assert!(!kin.is_valid_position(&[5.0, -0.1, 3.0]));
    }
}
