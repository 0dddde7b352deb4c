//! MessagePack-over-UDP link to the robot controller bridge.

use serde::{Deserialize, Serialize};
use std::{
    net::{SocketAddr, UdpSocket},
    thread,
    time::Duration,
};

use anyhow::{bail, Context, Result};

use crate::traits::{RobotCommandSink, RobotPoseProvider};
use crate::types::{GripperCommand, RobotPose, TargetPose};

/// Controller defaults observed on the rig.
pub const DEFAULT_SPEED: u32 = 30;
pub const DEFAULT_COORDINATE_SYSTEM: u32 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RobotMessage {
    MoveLinear {
        pose: TargetPose,
        speed: u32,
        coordinate_system: u32,
    },
    Gripper(GripperCommand),
    ReadPosition,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RobotReply {
    Ack,
    Position(RobotPose),
}

/// Request/reply socket to the controller. The worker thread is the only
/// owner, which is what makes read-pose-then-move a critical section.
pub struct UdpRobotLink {
    socket: UdpSocket,
}

impl UdpRobotLink {
    pub fn connect(src_port: u16, dst_address: &str, timeout: Duration) -> Result<Self> {
        let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], src_port)))
            .context("Failed to bind robot link socket")?;

        // Block until hostname lookup succeeds
        while socket.connect(dst_address).is_err() {
            thread::sleep(Duration::from_secs(3));
        }

        socket
            .set_read_timeout(Some(timeout))
            .context("Failed to set robot link read timeout")?;

        Ok(UdpRobotLink { socket })
    }

    fn request(&mut self, message: &RobotMessage) -> Result<RobotReply> {
        let buf = rmp_serde::to_vec(message).context("Failed to encode robot message")?;
        self.socket
            .send(&buf)
            .context("Failed to send robot message")?;

        let mut reply = [0u8; 512];
        let len = self
            .socket
            .recv(&mut reply)
            .context("No reply from robot controller")?;

        rmp_serde::from_slice(&reply[..len]).context("Failed to decode controller reply")
    }
}

impl RobotPoseProvider for UdpRobotLink {
    fn current_pose(&mut self) -> Result<RobotPose> {
        match self.request(&RobotMessage::ReadPosition)? {
            RobotReply::Position(pose) => Ok(pose),
            reply => bail!("unexpected reply to position read: {:?}", reply),
        }
    }
}

impl RobotCommandSink for UdpRobotLink {
    fn move_linear(
        &mut self,
        target: &TargetPose,
        speed: u32,
        coordinate_system: u32,
    ) -> Result<()> {
        let message = RobotMessage::MoveLinear {
            pose: *target,
            speed,
            coordinate_system,
        };
        match self.request(&message)? {
            RobotReply::Ack => Ok(()),
            reply => bail!("unexpected reply to linear move: {:?}", reply),
        }
    }

    fn gripper(&mut self, command: GripperCommand) -> Result<()> {
        match self.request(&RobotMessage::Gripper(command))? {
            RobotReply::Ack => Ok(()),
            reply => bail!("unexpected reply to gripper command: {:?}", reply),
        }
    }
}
