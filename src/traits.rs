//! Contracts for the pipeline's external collaborators.
//!
//! The camera driver, grasp model, and robot controller are heavyweight,
//! hardware-bound, and blocking; everything the crate needs from them is
//! captured here so the geometry can be tested against mocks.

use anyhow::Result;

use crate::types::{
    GraspCandidate, GripperCommand, PredictionMaps, RgbdFrame, RobotPose, TargetPose,
};

/// Supplies one synchronized RGB + depth frame per request, at native
/// sensor resolution.
pub trait CameraFrameSource {
    fn grab_frame(&mut self) -> Result<RgbdFrame>;
}

/// Runs the grasp model on a frame and returns per-pixel prediction maps,
/// possibly at a smaller resolution than the input frame.
pub trait GraspInferenceEngine {
    fn predict(&mut self, frame: &RgbdFrame) -> Result<PredictionMaps>;
}

/// Turns prediction maps into a ranked list of grasp candidates, best
/// quality first. May return an empty list.
pub trait GraspCandidateExtractor {
    fn extract(&self, maps: &PredictionMaps) -> Vec<GraspCandidate>;
}

/// Reads the robot's current end-effector pose on demand.
pub trait RobotPoseProvider {
    fn current_pose(&mut self) -> Result<RobotPose>;
}

/// Accepts motion and gripper commands for execution on the controller.
pub trait RobotCommandSink {
    fn move_linear(&mut self, target: &TargetPose, speed: u32, coordinate_system: u32)
        -> Result<()>;

    fn gripper(&mut self, command: GripperCommand) -> Result<()>;
}
