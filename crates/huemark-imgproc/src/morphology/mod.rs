//! Binary morphology: erosion, dilation and opening of masks.

/// Error types used for morphological operations.
pub mod error;
pub use error::MorphologyError;

/// Kernel (structuring element) utilities.
pub mod kernel;
pub use kernel::{Kernel, KernelShape};

/// Erosion, dilation and opening.
pub mod ops;
pub use ops::{dilate, erode, open, BorderMode};
