use super::{Kernel, MorphologyError};
use crate::parallel::{self, ExecutionStrategy};
use huemark_image::{Image, ImageError};

/// How pixels outside the image are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// Out-of-bounds pixels read as the given value.
    Constant(u8),
    /// Out-of-bounds pixels read as the nearest border pixel.
    Replicate,
}

impl Default for BorderMode {
    /// Out-of-bounds pixels are background.
    fn default() -> Self {
        BorderMode::Constant(0)
    }
}

#[derive(Clone, Copy)]
enum Reduce {
    Min,
    Max,
}

fn morph_once(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    offsets: &[(isize, isize)],
    border: BorderMode,
    reduce: Reduce,
    strategy: ExecutionStrategy,
) {
    let width = src.cols();
    let height = src.rows();
    if width == 0 || height == 0 {
        return;
    }

    let src_data = src.as_slice();
    let sample = |x: isize, y: isize| -> u8 {
        let inside = x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height;
        match border {
            _ if inside => src_data[y as usize * width + x as usize],
            BorderMode::Constant(value) => value,
            BorderMode::Replicate => {
                let cx = x.clamp(0, width as isize - 1) as usize;
                let cy = y.clamp(0, height as isize - 1) as usize;
                src_data[cy * width + cx]
            }
        }
    };

    parallel::for_each_row(dst.as_slice_mut(), width, strategy, |y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            let values = offsets
                .iter()
                .map(|&(dx, dy)| sample(x as isize + dx, y as isize + dy));
            *out = match reduce {
                Reduce::Min => values.min().unwrap_or(0),
                Reduce::Max => values.max().unwrap_or(0),
            };
        }
    });
}

fn morph(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    kernel: &Kernel,
    iterations: usize,
    border: BorderMode,
    reduce: Reduce,
    strategy: ExecutionStrategy,
) -> Result<(), MorphologyError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        )
        .into());
    }

    if iterations == 0 {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    let offsets = kernel.offsets();
    morph_once(src, dst, &offsets, border, reduce, strategy);
    if iterations > 1 {
        let mut previous = dst.clone();
        for _ in 1..iterations {
            morph_once(&previous, dst, &offsets, border, reduce, strategy);
            previous.as_slice_mut().copy_from_slice(dst.as_slice());
        }
    }

    Ok(())
}

/// Erode a binary (or grayscale) mask.
///
/// Each output pixel is the minimum over the kernel neighbourhood of the input.
/// With the default border, foreground touching the image edge is eroded as
/// if the outside were background.
///
/// # Arguments
///
/// * `src` - The input mask.
/// * `dst` - The output mask, same size as `src`.
/// * `kernel` - The structuring element.
/// * `iterations` - How many times to apply the erosion. Zero copies `src`.
/// * `border` - How out-of-bounds pixels are read.
/// * `strategy` - How the rows are scheduled.
pub fn erode(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    kernel: &Kernel,
    iterations: usize,
    border: BorderMode,
    strategy: ExecutionStrategy,
) -> Result<(), MorphologyError> {
    morph(src, dst, kernel, iterations, border, Reduce::Min, strategy)
}

/// Dilate a binary (or grayscale) mask.
///
/// Each output pixel is the maximum over the kernel neighbourhood of the input.
/// Arguments mirror [`erode`].
pub fn dilate(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    kernel: &Kernel,
    iterations: usize,
    border: BorderMode,
    strategy: ExecutionStrategy,
) -> Result<(), MorphologyError> {
    morph(src, dst, kernel, iterations, border, Reduce::Max, strategy)
}

/// Morphological opening: erosion followed by dilation.
///
/// Removes foreground specks smaller than the kernel while keeping the extent
/// of larger blobs. `scratch` holds the intermediate eroded mask and must have
/// the same size as `src`.
///
/// # Example
///
/// ```
/// use huemark_image::{Image, ImageSize};
/// use huemark_imgproc::morphology::{open, BorderMode, Kernel};
/// use huemark_imgproc::parallel::ExecutionStrategy;
///
/// let size = ImageSize { width: 5, height: 5 };
/// let mut mask = Image::<u8, 1>::from_size_val(size, 0).unwrap();
/// mask.set_pixel(2, 2, 0, 255).unwrap();
///
/// let mut scratch = Image::<u8, 1>::from_size_val(size, 0).unwrap();
/// let mut opened = Image::<u8, 1>::from_size_val(size, 0).unwrap();
/// open(
///     &mask,
///     &mut opened,
///     &mut scratch,
///     &Kernel::default(),
///     1,
///     1,
///     BorderMode::default(),
///     ExecutionStrategy::Serial,
/// )
/// .unwrap();
///
/// assert!(opened.as_slice().iter().all(|&v| v == 0));
/// ```
pub fn open(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    scratch: &mut Image<u8, 1>,
    kernel: &Kernel,
    erode_iterations: usize,
    dilate_iterations: usize,
    border: BorderMode,
    strategy: ExecutionStrategy,
) -> Result<(), MorphologyError> {
    erode(src, scratch, kernel, erode_iterations, border, strategy)?;
    dilate(scratch, dst, kernel, dilate_iterations, border, strategy)
}
