//! Tunable parameters of the detector.
//!
//! The configuration is loaded once at startup, usually from a JSON file.
//! Every field has a default, so a file only needs to list what it changes:
//!
//! ```
//! use huemark_detect::DetectorConfig;
//!
//! let config: DetectorConfig = serde_json::from_str(r#"{ "min_region_pixels": 40 }"#).unwrap();
//! assert_eq!(config.min_region_pixels, 40);
//! assert_eq!(config.downscale_factor, 0.37);
//! config.validate().unwrap();
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use huemark_imgproc::morphology::{Kernel, KernelShape, MorphologyError};
use huemark_imgproc::parallel::ExecutionStrategy;

use crate::components::{Connectivity, RegionOrder};
use crate::profile::{ChannelOrder, ProfileTable};

/// An error type for loading and checking a [`DetectorConfig`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("Failed to access the configuration file")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for this structure.
    #[error("Failed to parse the configuration")]
    Json(#[from] serde_json::Error),

    /// A value is out of its allowed range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// What the pipeline does when a frame arrives with a new size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeChangePolicy {
    /// Fail the frame with [`crate::DetectError::FrameSizeMismatch`].
    #[default]
    Reject,
    /// Reallocate the working buffers for the new size.
    Reinitialize,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "KernelShape", rename_all = "lowercase")]
enum KernelShapeDef {
    Rect,
    Cross,
    Ellipse,
}

/// Structuring element and iteration counts of the opening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologyConfig {
    /// Shape of the structuring element.
    #[serde(with = "KernelShapeDef")]
    pub shape: KernelShape,
    /// Side length of the structuring element. Must be odd.
    pub size: usize,
    /// Number of erosion passes.
    pub erode_iterations: usize,
    /// Number of dilation passes.
    pub dilate_iterations: usize,
}

impl Default for MorphologyConfig {
    fn default() -> Self {
        Self {
            shape: KernelShape::Rect,
            size: 3,
            erode_iterations: 1,
            dilate_iterations: 1,
        }
    }
}

impl MorphologyConfig {
    /// Builds the structuring element.
    pub fn kernel(&self) -> Result<Kernel, MorphologyError> {
        Kernel::new(self.shape, self.size)
    }
}

/// Complete detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// HSV bounds per color class.
    pub profiles: ProfileTable,

    /// Components with fewer pixels are dropped. Counted at processing resolution.
    pub min_region_pixels: usize,

    /// Scale applied to frames before processing, in `(0, 1]`.
    pub downscale_factor: f64,

    /// Opening applied to each threshold mask.
    pub morphology: MorphologyConfig,

    /// Neighborhood used by the labeler.
    pub connectivity: Connectivity,

    /// Order of the regions reported per class.
    pub region_order: RegionOrder,

    /// Channel layout of incoming frames.
    pub channel_order: ChannelOrder,

    /// Reaction to frames whose size differs from the first one.
    pub size_change: SizeChangePolicy,

    /// Pause between loop iterations, in milliseconds.
    pub loop_delay_ms: u64,

    /// Split per-pixel work across the rayon thread pool.
    pub parallel_rows: bool,

    /// Snap the boxes found on the downscaled frame to the full-resolution
    /// frame. Has no effect with a downscale factor of 1.
    pub refine_regions: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            profiles: ProfileTable::default(),
            min_region_pixels: 250,
            downscale_factor: 0.37,
            morphology: MorphologyConfig::default(),
            connectivity: Connectivity::default(),
            region_order: RegionOrder::default(),
            channel_order: ChannelOrder::default(),
            size_change: SizeChangePolicy::default(),
            loop_delay_ms: 30,
            parallel_rows: false,
            refine_regions: true,
        }
    }
}

impl DetectorConfig {
    /// Reads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Checks that every value is usable by the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.downscale_factor > 0.0 && self.downscale_factor <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "downscale_factor must be in (0, 1], got {}",
                self.downscale_factor
            )));
        }

        if self.min_region_pixels == 0 {
            return Err(ConfigError::Invalid(
                "min_region_pixels must be at least 1".to_string(),
            ));
        }

        if let Err(e) = self.morphology.kernel() {
            return Err(ConfigError::Invalid(format!("morphology kernel: {e}")));
        }

        for (class, p) in self.profiles.iter() {
            if p.hue_wraps && p.hue_upper >= p.hue_lower {
                return Err(ConfigError::Invalid(format!(
                    "{class}: a wrapping hue range needs hue_upper < hue_lower"
                )));
            }
            if !p.hue_wraps && p.hue_lower > p.hue_upper {
                return Err(ConfigError::Invalid(format!(
                    "{class}: hue_lower is above hue_upper"
                )));
            }
            if p.saturation_lower > p.saturation_upper || p.value_lower > p.value_upper {
                return Err(ConfigError::Invalid(format!(
                    "{class}: saturation or value bounds are reversed"
                )));
            }
        }

        Ok(())
    }

    /// Pause between loop iterations.
    pub fn loop_delay(&self) -> Duration {
        Duration::from_millis(self.loop_delay_ms)
    }

    /// How per-pixel operations are scheduled.
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        if self.parallel_rows {
            ExecutionStrategy::ParallelRows
        } else {
            ExecutionStrategy::Serial
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ColorProfile;

    #[test]
    fn test_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.min_region_pixels, 250);
        assert_eq!(config.loop_delay(), Duration::from_millis(30));
        assert_eq!(config.connectivity, Connectivity::Eight);
        assert_eq!(config.execution_strategy(), ExecutionStrategy::Serial);
        assert!(config.refine_regions);
        assert_eq!(config.profiles.red, ColorProfile::RED);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() -> Result<(), ConfigError> {
        let config: DetectorConfig = serde_json::from_str(
            r#"{
                "downscale_factor": 0.5,
                "connectivity": "four",
                "region_order": "size_descending",
                "channel_order": "bgr",
                "morphology": { "shape": "cross", "size": 5 },
                "profiles": { "blue": {
                    "hue_lower": 90, "hue_upper": 130,
                    "saturation_lower": 100, "saturation_upper": 255,
                    "value_lower": 20, "value_upper": 255
                } }
            }"#,
        )?;

        assert_eq!(config.downscale_factor, 0.5);
        assert_eq!(config.connectivity, Connectivity::Four);
        assert_eq!(config.region_order, RegionOrder::SizeDescending);
        assert_eq!(config.channel_order, ChannelOrder::Bgr);
        assert_eq!(config.morphology.shape, KernelShape::Cross);
        assert_eq!(config.morphology.size, 5);
        assert_eq!(config.morphology.erode_iterations, 1);
        assert_eq!(config.profiles.blue.hue_lower, 90);
        assert_eq!(config.profiles.red, ColorProfile::RED);
        config.validate()
    }

    #[test]
    fn test_file_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("detector.json");

        let mut config = DetectorConfig::default();
        config.size_change = SizeChangePolicy::Reinitialize;
        config.to_json_file(&path)?;

        assert_eq!(DetectorConfig::from_json_file(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let result = DetectorConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_validate_rejects() {
        let invalid = [
            DetectorConfig {
                downscale_factor: 0.0,
                ..Default::default()
            },
            DetectorConfig {
                downscale_factor: 1.5,
                ..Default::default()
            },
            DetectorConfig {
                min_region_pixels: 0,
                ..Default::default()
            },
            DetectorConfig {
                morphology: MorphologyConfig {
                    size: 4,
                    ..Default::default()
                },
                ..Default::default()
            },
        ];
        for config in invalid {
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }

        let mut config = DetectorConfig::default();
        config.profiles.red.hue_upper = 175;
        assert!(config.validate().is_err());

        let mut config = DetectorConfig::default();
        config.profiles.blue.hue_lower = 121;
        assert!(config.validate().is_err());

        let mut config = DetectorConfig::default();
        config.profiles.yellow.value_lower = 255;
        config.profiles.yellow.value_upper = 0;
        assert!(config.validate().is_err());
    }
}
