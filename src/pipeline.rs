use anyhow::{Context, Result};

use crate::calibration::SessionCalibration;
use crate::traits::{CameraFrameSource, GraspCandidateExtractor, GraspInferenceEngine};
use crate::transform::{CoordinateTransformer, GraspError};
use crate::types::{RobotPose, TargetPose};

/// Outcome of one perception cycle. A skipped cycle is a normal result:
/// the caller re-samples the scene on the next request instead of failing.
#[derive(Clone, Debug, PartialEq)]
pub enum GraspCycle {
    Target(TargetPose),
    Skipped(GraspError),
}

pub struct GraspPipeline<Camera, Inference, Extractor> {
    camera: Camera,
    inference: Inference,
    extractor: Extractor,
    transformer: CoordinateTransformer,
}

impl<Camera, Inference, Extractor> GraspPipeline<Camera, Inference, Extractor>
where
    Camera: CameraFrameSource,
    Inference: GraspInferenceEngine,
    Extractor: GraspCandidateExtractor,
{
    pub fn new(
        camera: Camera,
        inference: Inference,
        extractor: Extractor,
        calibration: SessionCalibration,
    ) -> Self {
        GraspPipeline {
            camera,
            inference,
            extractor,
            transformer: CoordinateTransformer::new(calibration),
        }
    }

    /// Run one acquire -> infer -> extract -> transform cycle against the
    /// supplied end-effector pose.
    ///
    /// Collaborator failures (camera, model) propagate as errors;
    /// recoverable transform rejections come back as [`GraspCycle::Skipped`].
    pub fn run(&mut self, current_pose: &RobotPose) -> Result<GraspCycle> {
        let frame = self
            .camera
            .grab_frame()
            .context("Failed to read frame from camera")?;

        let maps = self
            .inference
            .predict(&frame)
            .context("Grasp inference failed")?;

        let (rows, cols) = maps.shape();
        let expected = self.transformer.calibration().inference;
        if cols != expected.width || rows != expected.height {
            log::warn!(
                "prediction maps are {}x{} but calibration expects {}x{}",
                cols,
                rows,
                expected.width,
                expected.height
            );
        }

        let candidates = self.extractor.extract(&maps);
        log::debug!("extracted {} grasp candidates", candidates.len());

        match self
            .transformer
            .transform_best(&candidates, &frame.depth, current_pose)
        {
            Ok(target) => Ok(GraspCycle::Target(target)),
            Err(err) => {
                log::info!("no actionable grasp this cycle: {}", err);
                Ok(GraspCycle::Skipped(err))
            }
        }
    }
}
