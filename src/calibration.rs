//! Session calibration: every rig-specific constant the transform needs,
//! loaded once per camera session and never mutated while it is in use.
//!
//! The linear scale, depth correction, and hand-eye offsets are empirically
//! tuned per physical rig. They live in the calibration file, not in code,
//! and must be re-measured whenever the camera mounting or robot unit
//! convention changes.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Intrinsics;

/// Fixed translation between the camera optical frame and the gripper
/// frame, in robot linear units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationOffset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("failed to read calibration file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse calibration file")]
    Parse(#[from] serde_json::Error),
    #[error("invalid calibration: {0}")]
    Invalid(&'static str),
}

/// Immutable calibration bundle for one camera session.
///
/// Constructed once per camera connection; a resolution or rig change
/// requires rebuilding the whole bundle so a transform in flight never
/// observes a torn update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionCalibration {
    pub intrinsics: Intrinsics,
    /// Raw depth-sensor unit to meters.
    pub depth_scale: f64,
    /// Empirical depth offset in meters, subtracted after scaling.
    pub depth_correction: f64,
    /// Camera-meters to robot linear units.
    pub linear_scale: f64,
    pub offset: CalibrationOffset,
    /// Metric depths at or below this are rejected as invalid.
    #[serde(default)]
    pub min_depth: f64,
    /// Metric depths beyond this are rejected as invalid.
    #[serde(default = "default_max_depth")]
    pub max_depth: f64,
    /// Native sensor resolution; the depth frame is sampled at this grid.
    pub native: Resolution,
    /// Resolution of the model's prediction maps.
    pub inference: Resolution,
}

fn default_max_depth() -> f64 {
    2.0
}

impl SessionCalibration {
    /// Load and validate a bundle from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CalibrationError> {
        let file = File::open(path)?;
        let calibration: SessionCalibration = serde_json::from_reader(BufReader::new(file))?;
        calibration.validate()?;
        Ok(calibration)
    }

    /// Reject bundles the transform cannot safely use. Failing here is
    /// fatal at startup; nothing downstream re-checks these.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.intrinsics.fx <= 0. || self.intrinsics.fy <= 0. {
            return Err(CalibrationError::Invalid("focal lengths must be positive"));
        }
        if self.depth_scale <= 0. {
            return Err(CalibrationError::Invalid("depth scale must be positive"));
        }
        if self.linear_scale <= 0. {
            return Err(CalibrationError::Invalid("linear scale must be positive"));
        }
        if self.min_depth >= self.max_depth {
            return Err(CalibrationError::Invalid(
                "valid depth range must satisfy min < max",
            ));
        }
        if self.native.width == 0 || self.native.height == 0 {
            return Err(CalibrationError::Invalid(
                "native resolution must be non-zero",
            ));
        }
        if self.inference.width == 0 || self.inference.height == 0 {
            return Err(CalibrationError::Invalid(
                "inference resolution must be non-zero",
            ));
        }
        Ok(())
    }

    /// Ratio taking inference-resolution pixel coordinates to the native
    /// sensor grid. Must be applied to a candidate's center before any
    /// depth lookup or back-projection whenever the model ran on a
    /// resized frame.
    pub fn resize_scale(&self) -> f64 {
        self.native.width as f64 / self.inference.width as f64
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn rig() -> SessionCalibration {
        SessionCalibration {
            intrinsics: Intrinsics {
                fx: 1000.,
                fy: 1000.,
                cx: 640.,
                cy: 480.,
            },
            depth_scale: 0.001,
            depth_correction: 0.04,
            linear_scale: 10.,
            offset: CalibrationOffset {
                x: -55.87,
                y: 50.77,
                z: 110.7,
            },
            min_depth: 0.,
            max_depth: 2.,
            native: Resolution {
                width: 1280,
                height: 960,
            },
            inference: Resolution {
                width: 640,
                height: 480,
            },
        }
    }

    #[test]
    fn resize_scale_is_native_over_inference_width() {
        assert_eq!(rig().resize_scale(), 2.);
    }

    #[test]
    fn valid_bundle_passes_validation() {
        assert!(rig().validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_bundles() {
        let mut bad = rig();
        bad.intrinsics.fx = 0.;
        assert!(bad.validate().is_err());

        let mut bad = rig();
        bad.depth_scale = -0.001;
        assert!(bad.validate().is_err());

        let mut bad = rig();
        bad.min_depth = 3.;
        assert!(bad.validate().is_err());

        let mut bad = rig();
        bad.inference.width = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn loads_from_json_file_with_defaulted_depth_range() {
        let json = r#"{
            "intrinsics": { "fx": 1000.0, "fy": 1000.0, "cx": 640.0, "cy": 480.0 },
            "depth_scale": 0.001,
            "depth_correction": 0.04,
            "linear_scale": 10.0,
            "offset": { "x": -55.87, "y": 50.77, "z": 110.7 },
            "native": { "width": 1280, "height": 960 },
            "inference": { "width": 640, "height": 480 }
        }"#;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let calibration = SessionCalibration::from_file(file.path()).unwrap();
        assert_eq!(calibration, rig());
        assert_eq!(calibration.min_depth, 0.);
        assert_eq!(calibration.max_depth, 2.);
    }
}
