use std::{env, thread::sleep, time::Duration};

use grasp_vision::{
    traits::{RobotCommandSink, RobotPoseProvider},
    types::RobotPose,
    udp::{UdpRobotLink, DEFAULT_COORDINATE_SYSTEM, DEFAULT_SPEED},
};

fn main() {
    let mut args = env::args().skip(1);

    let dst_address = args.next().unwrap();
    let delay = args.next();

    let mut link = UdpRobotLink::connect(0, &dst_address, Duration::from_secs(2)).unwrap();

    let pose = link.current_pose().unwrap();
    println!("current pose: {:?}", pose);

    if delay.is_some() {
        let delay: u64 = delay.unwrap().parse().unwrap();
        println!(
            "Sending test moves every {} milliseconds. Press CTRL+C to quit.",
            delay
        );
        loop {
            send(&mut link, &pose);
            sleep(Duration::from_millis(delay));
        }
    }
}

fn send(link: &mut UdpRobotLink, pose: &RobotPose) {
    // Re-command the pose we read: a no-op move the controller must ack.
    link.move_linear(pose, DEFAULT_SPEED, DEFAULT_COORDINATE_SYSTEM)
        .unwrap();
}
