// src/motion/geometry.rs - Anchor points of the four suspension cables

use super::Point3;
use crate::scene::WorkspaceConfig;

/// Cable attachment points at the top corners of the workspace.
///
/// Order is fixed and shared by every per-anchor series in the crate:
/// R1 `(0,0,h)`, R2 `(dimX,0,h)`, R3 `(0,dimY,h)`, R4 `(dimX,dimY,h)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPoints {
    anchors: [Point3; 4],
}

impl AnchorPoints {
    pub fn from_dimensions(dim: Point3) -> Self {
        let h = dim.z;
        Self {
            anchors: [
                Point3::new(0.0, 0.0, h),
                Point3::new(dim.x, 0.0, h),
                Point3::new(0.0, dim.y, h),
                Point3::new(dim.x, dim.y, h),
            ],
        }
    }

    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self::from_dimensions(config.dim)
    }

    pub fn as_array(&self) -> &[Point3; 4] {
        &self.anchors
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point3> {
        self.anchors.iter()
    }

    /// Height of the anchor plane.
    pub fn height(&self) -> f64 {
        self.anchors[0].z
    }
}

impl std::ops::Index<usize> for AnchorPoints {
    type Output = Point3;

    fn index(&self, index: usize) -> &Point3 {
        &self.anchors[index]
    }
}
