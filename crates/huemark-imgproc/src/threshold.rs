use huemark_image::{Image, ImageError};

use crate::parallel::{self, ExecutionStrategy};

/// Value written to a mask pixel that passes the test.
pub const MASK_FOREGROUND: u8 = 255;

/// Value written to a mask pixel that fails the test.
pub const MASK_BACKGROUND: u8 = 0;

/// Build a binary mask from a per-pixel predicate.
///
/// Every pixel of `src` is handed to `predicate` as a channel slice; the
/// matching pixel of `dst` becomes [`MASK_FOREGROUND`] when it returns true
/// and [`MASK_BACKGROUND`] otherwise.
///
/// # Examples
///
/// ```
/// use huemark_image::{Image, ImageSize};
/// use huemark_imgproc::parallel::ExecutionStrategy;
/// use huemark_imgproc::threshold::threshold_mask;
///
/// let image = Image::<u8, 1>::new(ImageSize { width: 3, height: 1 }, vec![5, 50, 200]).unwrap();
/// let mut mask = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_mask(&image, &mut mask, ExecutionStrategy::Serial, |px| px[0] < 10 || px[0] > 100)
///     .unwrap();
/// assert_eq!(mask.as_slice(), &[255, 0, 255]);
/// ```
pub fn threshold_mask<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<u8, 1>,
    strategy: ExecutionStrategy,
    predicate: impl Fn(&[T]) -> bool + Send + Sync,
) -> Result<(), ImageError>
where
    T: Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::iter_rows(src, dst, strategy, |src_pixel, dst_pixel| {
        dst_pixel[0] = if predicate(src_pixel) {
            MASK_FOREGROUND
        } else {
            MASK_BACKGROUND
        };
    });

    Ok(())
}

/// Apply a range threshold to an image.
///
/// A pixel is foreground when every channel lies inside its closed interval
/// `[lower_bound[c], upper_bound[c]]`.
///
/// # Examples
///
/// ```
/// use huemark_image::{Image, ImageSize};
/// use huemark_imgproc::parallel::ExecutionStrategy;
/// use huemark_imgproc::threshold::in_range;
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
///
/// let image = Image::<u8, 3>::new(
///    ImageSize {
///       width: 2,
///       height: 1,
///    },
///    data,
/// )
/// .unwrap();
///
/// let mut thresholded = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// in_range(&image, &mut thresholded, &[100, 150, 0], &[200, 200, 200], ExecutionStrategy::Serial)
///     .unwrap();
///
/// assert_eq!(thresholded.get_pixel(0, 0, 0).unwrap(), &255);
/// assert_eq!(thresholded.get_pixel(1, 0, 0).unwrap(), &0);
/// ```
pub fn in_range<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<u8, 1>,
    lower_bound: &[T; C],
    upper_bound: &[T; C],
    strategy: ExecutionStrategy,
) -> Result<(), ImageError>
where
    T: Send + Sync + PartialOrd,
{
    threshold_mask(src, dst, strategy, |src_pixel| {
        src_pixel
            .iter()
            .zip(lower_bound.iter().zip(upper_bound.iter()))
            .all(|(val, (lower, upper))| val >= lower && val <= upper)
    })
}
