//! The perception-to-actuation core: one grasp candidate, one depth frame,
//! and the robot's current pose in; one target end-effector pose out.
//!
//! Everything here is pure arithmetic over its inputs. Blocking I/O and
//! retry policy belong to the pipeline and worker that call it.

use ndarray::Array2;
use thiserror::Error;

use crate::calibration::SessionCalibration;
use crate::types::{GraspCandidate, RobotPose, TargetPose};

/// Recoverable per-cycle failures. All of these mean "no actionable grasp
/// this cycle, re-sample the scene" rather than a fault.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GraspError {
    #[error("extractor returned no usable grasp candidates")]
    NoCandidates,
    #[error("candidate center ({row}, {col}) outside {width}x{height} depth frame")]
    CandidateOutOfBounds {
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },
    #[error("invalid depth {depth:.4} m at candidate center")]
    InvalidDepth { depth: f64 },
}

/// Maps grasp candidates into robot-frame target poses using the session
/// calibration.
pub struct CoordinateTransformer {
    calibration: SessionCalibration,
}

impl CoordinateTransformer {
    pub fn new(calibration: SessionCalibration) -> Self {
        CoordinateTransformer { calibration }
    }

    pub fn calibration(&self) -> &SessionCalibration {
        &self.calibration
    }

    /// Back-project a candidate's center into the camera frame, in meters.
    ///
    /// The candidate is in inference-resolution pixels; its center is first
    /// rescaled onto the native sensor grid, where the depth frame lives.
    /// Skipping that rescale is the classic way to sample depth at the
    /// wrong pixel, so it happens here and nowhere else.
    pub fn camera_point(
        &self,
        candidate: &GraspCandidate,
        depth: &Array2<u16>,
    ) -> Result<(f64, f64, f64), GraspError> {
        let cal = &self.calibration;
        let scale = cal.resize_scale();

        let row_px = candidate.center.0 as f64 * scale;
        let col_px = candidate.center.1 as f64 * scale;

        let (rows, cols) = depth.dim();
        let row = row_px.round() as usize;
        let col = col_px.round() as usize;
        if row >= rows || col >= cols {
            return Err(GraspError::CandidateOutOfBounds {
                row,
                col,
                width: cols,
                height: rows,
            });
        }

        // A zero reading means no sensor return at this pixel.
        let raw = depth[[row, col]];
        if raw == 0 {
            return Err(GraspError::InvalidDepth { depth: 0. });
        }

        let z = cal.depth_scale * f64::from(raw) - cal.depth_correction;
        if z <= cal.min_depth || z > cal.max_depth {
            return Err(GraspError::InvalidDepth { depth: z });
        }

        // Inverse pinhole projection against the native-resolution K.
        let k = &cal.intrinsics;
        let x = (col_px - k.cx) * z / k.fx;
        let y = (row_px - k.cy) * z / k.fy;

        Ok((x, y, z))
    }

    /// Compose a candidate with the current end-effector pose and the
    /// hand-eye offsets into a robot-frame target pose.
    ///
    /// The axis signs are fixed by the camera-to-gripper mounting: camera
    /// +x moves the effector +x, camera +y and +z move it -y and -z. Pitch
    /// and roll are passed through; only tz picks up the grasp angle.
    pub fn transform(
        &self,
        candidate: &GraspCandidate,
        depth: &Array2<u16>,
        current: &RobotPose,
    ) -> Result<TargetPose, GraspError> {
        let (x, y, z) = self.camera_point(candidate, depth)?;

        let cal = &self.calibration;
        let offset = cal.offset;

        Ok(TargetPose {
            x: current.x + x * cal.linear_scale + offset.x,
            y: current.y - y * cal.linear_scale + offset.y,
            z: current.z - z * cal.linear_scale + offset.z,
            tx: current.tx,
            ty: current.ty,
            tz: current.tz + candidate.angle.to_degrees(),
        })
    }

    /// Transform the best usable candidate from a ranked list.
    ///
    /// Candidates with non-positive quality never pass the confidence
    /// policy; an empty or fully filtered list is `NoCandidates`.
    pub fn transform_best(
        &self,
        candidates: &[GraspCandidate],
        depth: &Array2<u16>,
        current: &RobotPose,
    ) -> Result<TargetPose, GraspError> {
        let best = candidates
            .iter()
            .find(|candidate| candidate.quality > 0.)
            .ok_or(GraspError::NoCandidates)?;

        self.transform(best, depth, current)
    }
}
