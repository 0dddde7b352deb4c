//! RGB-D grasp pipeline: one camera observation in, one robot
//! end-effector target pose out.
//!
//! The hardware collaborators (camera driver, grasp model, robot
//! controller) live behind the traits in [`traits`]; the geometry that
//! turns a pixel candidate into a robot-frame pose is pure and lives in
//! [`transform`].

pub mod calibration;
pub mod extraction;
pub mod pipeline;
pub mod replay;
pub mod traits;
pub mod transform;
pub mod types;
pub mod udp;
pub mod worker;

pub use calibration::{CalibrationError, CalibrationOffset, Resolution, SessionCalibration};
pub use pipeline::{GraspCycle, GraspPipeline};
pub use transform::{CoordinateTransformer, GraspError};
pub use types::{
    GraspCandidate, GripperCommand, Intrinsics, PredictionMaps, RgbdFrame, RobotPose, TargetPose,
};
