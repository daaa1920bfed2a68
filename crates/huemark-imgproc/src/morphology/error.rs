use huemark_image::ImageError;

/// Errors related to morphological operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MorphologyError {
    /// The provided kernel has no elements.
    #[error("Kernel must have at least one element")]
    EmptyKernel,

    /// The kernel must have odd dimensions so it has a center.
    #[error("Kernel size must be odd, got {0}x{1}")]
    EvenSizedKernel(usize, usize),

    /// The kernel element count does not match its dimensions.
    #[error("Kernel data length ({0}) does not match its size ({1})")]
    InvalidKernelShape(usize, usize),

    /// All elements in the kernel are inactive.
    #[error("Kernel has no active elements")]
    AllKernelElementsInactive,

    /// Error related to the input or output image.
    #[error(transparent)]
    ImageError(#[from] ImageError),
}
