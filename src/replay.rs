//! File-backed frame and prediction sources.
//!
//! Lets the whole pipeline run against captured data when the camera and
//! the model are not available in-process: RGB as 8-bit PNG, depth as
//! 16-bit grayscale PNG in raw sensor units, prediction maps as JSON.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{ensure, Context, Result};
use ndarray::{Array2, Array3};

use crate::traits::{CameraFrameSource, GraspInferenceEngine};
use crate::types::{PredictionMaps, RgbdFrame};

/// Replays one captured RGB-D frame on every grab.
pub struct ReplayCamera {
    frame: RgbdFrame,
}

impl ReplayCamera {
    pub fn from_files(rgb_path: &Path, depth_path: &Path) -> Result<Self> {
        let rgb_image = image::open(rgb_path)
            .with_context(|| format!("Failed to load RGB image {}", rgb_path.display()))?
            .to_rgb8();
        let depth_image = image::open(depth_path)
            .with_context(|| format!("Failed to load depth image {}", depth_path.display()))?
            .to_luma16();

        ensure!(
            rgb_image.dimensions() == depth_image.dimensions(),
            "RGB {:?} and depth {:?} resolutions differ",
            rgb_image.dimensions(),
            depth_image.dimensions()
        );

        let (width, height) = rgb_image.dimensions();
        let rgb = Array3::from_shape_fn(
            (height as usize, width as usize, 3),
            |(row, col, channel)| rgb_image.get_pixel(col as u32, row as u32).0[channel],
        );
        let depth = Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
            depth_image.get_pixel(col as u32, row as u32).0[0]
        });

        Ok(ReplayCamera {
            frame: RgbdFrame { rgb, depth },
        })
    }
}

impl CameraFrameSource for ReplayCamera {
    fn grab_frame(&mut self) -> Result<RgbdFrame> {
        Ok(self.frame.clone())
    }
}

/// Replays precomputed model output instead of running inference.
pub struct ReplayInference {
    maps: PredictionMaps,
}

impl ReplayInference {
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open prediction maps {}", path.display()))?;
        let maps = serde_json::from_reader(BufReader::new(file))
            .context("Failed to parse prediction maps")?;
        Ok(ReplayInference { maps })
    }
}

impl GraspInferenceEngine for ReplayInference {
    fn predict(&mut self, _frame: &RgbdFrame) -> Result<PredictionMaps> {
        Ok(self.maps.clone())
    }
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Luma, Rgb};
    use ndarray::Array2;

    use super::*;

    #[test]
    fn loads_frame_from_png_pair() {
        let dir = tempfile::tempdir().unwrap();
        let rgb_path = dir.path().join("rgb.png");
        let depth_path = dir.path().join("depth.png");

        let rgb = ImageBuffer::from_fn(8, 6, |x, _| Rgb([x as u8, 0, 0]));
        rgb.save(&rgb_path).unwrap();
        let depth = ImageBuffer::from_fn(8, 6, |x, y| Luma([(x + y * 100) as u16]));
        depth.save(&depth_path).unwrap();

        let mut camera = ReplayCamera::from_files(&rgb_path, &depth_path).unwrap();
        let frame = camera.grab_frame().unwrap();

        assert_eq!(frame.width(), 8);
        assert_eq!(frame.height(), 6);
        assert_eq!(frame.rgb[[0, 5, 0]], 5);
        assert_eq!(frame.depth[[2, 3]], 203);
    }

    #[test]
    fn rejects_mismatched_resolutions() {
        let dir = tempfile::tempdir().unwrap();
        let rgb_path = dir.path().join("rgb.png");
        let depth_path = dir.path().join("depth.png");

        ImageBuffer::from_pixel(8, 6, Rgb([0u8, 0, 0]))
            .save(&rgb_path)
            .unwrap();
        ImageBuffer::from_pixel(4, 6, Luma([0u16]))
            .save(&depth_path)
            .unwrap();

        assert!(ReplayCamera::from_files(&rgb_path, &depth_path).is_err());
    }

    #[test]
    fn replays_maps_from_json() {
        let maps = PredictionMaps {
            quality: Array2::zeros((4, 6)),
            angle: Array2::zeros((4, 6)),
            width: Array2::zeros((4, 6)),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maps.json");
        serde_json::to_writer(File::create(&path).unwrap(), &maps).unwrap();

        let mut inference = ReplayInference::from_file(&path).unwrap();
        let frame = RgbdFrame {
            rgb: ndarray::Array3::zeros((6, 8, 3)),
            depth: Array2::zeros((6, 8)),
        };
        assert_eq!(inference.predict(&frame).unwrap().shape(), (4, 6));
    }
}
