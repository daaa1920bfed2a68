#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// drawing of detected regions onto frames.
pub mod annotate;

/// connected-component labeling and region extraction.
pub mod components;

/// detector configuration and its JSON representation.
pub mod config;

/// one-off probes used while tuning color profiles.
pub mod diagnostics;

/// error types for the detect module.
pub mod error;

/// the per-frame detection pipeline and its buffer pool.
pub mod pipeline;

/// color classes, profiles and the threshold classifier.
pub mod profile;

/// full-resolution refinement of regions found on a downscaled frame.
pub mod refine;

/// frame source and display sink traits and the frame loop.
pub mod stream;

/// conversion of image coordinates into the robot frame.
pub mod view;

pub use crate::components::{Connectivity, Point2, Region, RegionOrder};
pub use crate::config::{ConfigError, DetectorConfig, SizeChangePolicy};
pub use crate::error::DetectError;
pub use crate::pipeline::{FrameDetections, MarkerPipeline};
pub use crate::profile::{ChannelOrder, ColorClass, ColorProfile, ProfileTable};
