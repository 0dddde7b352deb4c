use nalgebra::Matrix3;
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

/// Pinhole intrinsics of the depth-aligned color stream, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

impl Intrinsics {
    /// Extract fx/fy/cx/cy from a 3x3 camera matrix K.
    pub fn from_matrix(k: &Matrix3<f64>) -> Self {
        Intrinsics {
            fx: k[(0, 0)],
            fy: k[(1, 1)],
            cx: k[(0, 2)],
            cy: k[(1, 2)],
        }
    }

    pub fn k_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, 0., self.cx, //
            0., self.fy, self.cy, //
            0., 0., 1.,
        )
    }
}

/// One synchronized RGB + depth observation at native sensor resolution.
///
/// Both images share the same pixel grid; depth is in raw sensor units
/// (a zero reading means no sensor return).
#[derive(Clone, Debug)]
pub struct RgbdFrame {
    pub rgb: Array3<u8>,
    pub depth: Array2<u16>,
}

impl RgbdFrame {
    pub fn width(&self) -> usize {
        self.depth.dim().1
    }

    pub fn height(&self) -> usize {
        self.depth.dim().0
    }
}

/// Per-pixel model output at inference resolution: grasp quality, grasp
/// angle in radians, and gripper width in pixels.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictionMaps {
    pub quality: Array2<f32>,
    pub angle: Array2<f32>,
    pub width: Array2<f32>,
}

impl PredictionMaps {
    /// (rows, cols) of the map grid.
    pub fn shape(&self) -> (usize, usize) {
        self.quality.dim()
    }
}

/// One proposed pick point in inference-resolution pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraspCandidate {
    /// (row, col) of the grasp center.
    pub center: (usize, usize),
    /// Grasp orientation in radians, in [-pi/2, pi/2).
    pub angle: f64,
    /// Gripper opening in pixels.
    pub width: f64,
    /// Model confidence; candidates with quality <= 0 are invalid.
    pub quality: f64,
}

/// End-effector pose in robot base coordinates: position in the robot's
/// linear units and three axis angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub tx: f64,
    pub ty: f64,
    pub tz: f64,
}

/// Output of one transform cycle; same shape as [`RobotPose`], consumed
/// immediately by the command sink.
pub type TargetPose = RobotPose;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GripperCommand {
    Open,
    Close,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intrinsics_round_trip_through_k_matrix() {
        let intrinsics = Intrinsics {
            fx: 1078.4,
            fy: 1077.9,
            cx: 637.6,
            cy: 478.3,
        };

        assert_eq!(Intrinsics::from_matrix(&intrinsics.k_matrix()), intrinsics);
    }
}
