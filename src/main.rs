use std::{env, path::Path, sync::mpsc, thread, time::Duration};

use anyhow::{Context, Result};

use grasp_vision::{
    calibration::SessionCalibration,
    extraction::QualityMapExtractor,
    pipeline::GraspPipeline,
    replay::{ReplayCamera, ReplayInference},
    udp::UdpRobotLink,
    worker::{GraspRequest, MotionSettings, RobotWorker},
};

/// Pause between grasp requests.
const REQUEST_PERIOD: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    env_logger::init();

    let calibration =
        SessionCalibration::from_file("config.json").context("Failed to load calibration")?;

    // Captured inputs; swap for live sources once the camera driver and
    // the model run in-process.
    let camera = ReplayCamera::from_files(
        Path::new("saved_data/frame_rgb.png"),
        Path::new("saved_data/frame_depth.png"),
    )?;
    let inference = ReplayInference::from_file(Path::new("saved_data/maps.json"))?;
    let extractor = QualityMapExtractor::default();

    let pipeline = GraspPipeline::new(camera, inference, extractor, calibration);

    let robot_address =
        env::var("ROBOT_ADDRESS").unwrap_or_else(|_| "192.168.255.1:4826".to_string());
    // This call blocks until the controller appears on the network.
    let robot = UdpRobotLink::connect(0, &robot_address, Duration::from_secs(2))?;

    let (requests, request_queue) = mpsc::channel();
    let worker = RobotWorker::new(pipeline, robot, request_queue, MotionSettings::default());
    let worker_handle = thread::spawn(move || worker.run());

    loop {
        let (request, replies) = GraspRequest::new();
        if requests.send(request).is_err() {
            break;
        }

        match replies.recv() {
            Ok(reply) => log::info!("grasp cycle: {:?}", reply),
            Err(_) => break,
        }

        thread::sleep(REQUEST_PERIOD);
    }

    drop(requests);
    worker_handle
        .join()
        .map_err(|_| anyhow::anyhow!("robot worker panicked"))?;

    Ok(())
}
