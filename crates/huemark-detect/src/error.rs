use huemark_image::{ImageError, ImageSize};
use huemark_imgproc::morphology::MorphologyError;

use crate::config::ConfigError;

/// An error type for the detection pipeline and the frame loop.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    /// Error from an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from the morphological filter.
    #[error(transparent)]
    Morphology(#[from] MorphologyError),

    /// The detector configuration is invalid or could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A frame does not match the size the buffers were allocated for.
    #[error("Frame size {actual} does not match the configured size {expected}")]
    FrameSizeMismatch {
        /// The size the pipeline was initialized with.
        expected: ImageSize,
        /// The size of the offending frame.
        actual: ImageSize,
    },

    /// The frame source failed to deliver a frame.
    #[error("Frame source failed: {0}")]
    Source(Box<dyn std::error::Error + Send + Sync>),

    /// The display sink failed to present a frame.
    #[error("Display sink failed: {0}")]
    Sink(Box<dyn std::error::Error + Send + Sync>),
}
