//! Single-owner robot worker.
//!
//! One thread owns both halves of the robot link, so reading the current
//! pose and issuing the move it informed are never interleaved with
//! another actor's commands. Callers talk to the worker over a typed
//! request channel and get a pose-or-failure reply back; pending requests
//! are drained so only the newest one is ever served.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::pipeline::{GraspCycle, GraspPipeline};
use crate::traits::{
    CameraFrameSource, GraspCandidateExtractor, GraspInferenceEngine, RobotCommandSink,
    RobotPoseProvider,
};
use crate::transform::GraspError;
use crate::types::{GripperCommand, TargetPose};
use crate::udp::{DEFAULT_COORDINATE_SYSTEM, DEFAULT_SPEED};

/// One grasp attempt request; the reply lands on the embedded sender.
pub struct GraspRequest {
    pub reply: Sender<GraspReply>,
}

impl GraspRequest {
    pub fn new() -> (GraspRequest, Receiver<GraspReply>) {
        let (reply, replies) = channel();
        (GraspRequest { reply }, replies)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GraspReply {
    /// A target pose was produced and the move was commanded.
    Commanded(TargetPose),
    /// No actionable grasp this cycle; re-request on the next frame.
    Skipped(GraspError),
    /// A newer request arrived before this one was served.
    Superseded,
    /// A collaborator failed; the requester owns the retry policy.
    Failed(String),
}

#[derive(Clone, Copy, Debug)]
pub struct MotionSettings {
    pub speed: u32,
    pub coordinate_system: u32,
    /// Fixed wait for the move to finish before closing the gripper.
    pub settle: Duration,
}

impl Default for MotionSettings {
    fn default() -> Self {
        MotionSettings {
            speed: DEFAULT_SPEED,
            coordinate_system: DEFAULT_COORDINATE_SYSTEM,
            settle: Duration::from_secs(5),
        }
    }
}

pub struct RobotWorker<Camera, Inference, Extractor, Robot> {
    pipeline: GraspPipeline<Camera, Inference, Extractor>,
    robot: Robot,
    requests: Receiver<GraspRequest>,
    motion: MotionSettings,
}

impl<Camera, Inference, Extractor, Robot> RobotWorker<Camera, Inference, Extractor, Robot>
where
    Camera: CameraFrameSource,
    Inference: GraspInferenceEngine,
    Extractor: GraspCandidateExtractor,
    Robot: RobotPoseProvider + RobotCommandSink,
{
    pub fn new(
        pipeline: GraspPipeline<Camera, Inference, Extractor>,
        robot: Robot,
        requests: Receiver<GraspRequest>,
        motion: MotionSettings,
    ) -> Self {
        RobotWorker {
            pipeline,
            robot,
            requests,
            motion,
        }
    }

    /// Serve requests until every request sender is dropped.
    pub fn run(mut self) {
        while let Ok(request) = self.requests.recv() {
            let request = self.newest_request(request);

            let reply = match self.serve() {
                Ok(reply) => reply,
                Err(err) => {
                    log::error!("grasp cycle failed: {:#}", err);
                    GraspReply::Failed(format!("{:#}", err))
                }
            };

            // The requester may have given up; that is not our problem.
            let _ = request.reply.send(reply);
        }
    }

    /// Last-candidate-wins: answer only the newest pending request.
    fn newest_request(&self, mut request: GraspRequest) -> GraspRequest {
        while let Ok(newer) = self.requests.try_recv() {
            let _ = request.reply.send(GraspReply::Superseded);
            request = newer;
        }
        request
    }

    fn serve(&mut self) -> Result<GraspReply> {
        let current = self
            .robot
            .current_pose()
            .context("Failed to read current end-effector pose")?;

        match self.pipeline.run(&current)? {
            GraspCycle::Skipped(err) => Ok(GraspReply::Skipped(err)),
            GraspCycle::Target(target) => {
                self.robot
                    .gripper(GripperCommand::Open)
                    .context("Failed to open gripper")?;

                self.robot
                    .move_linear(&target, self.motion.speed, self.motion.coordinate_system)
                    .context("Linear move command failed")?;

                // TODO: Poll the controller for motion completion instead of
                // waiting a fixed time.
                thread::sleep(self.motion.settle);

                self.robot
                    .gripper(GripperCommand::Close)
                    .context("Failed to close gripper")?;

                Ok(GraspReply::Commanded(target))
            }
        }
    }
}
