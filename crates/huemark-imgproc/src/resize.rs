use huemark_image::{Image, ImageError};

use crate::parallel::{self, ExecutionStrategy};

/// Interpolation used when sampling between source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    /// Take the closest source pixel.
    Nearest,
    /// Weight the four surrounding source pixels.
    #[default]
    Bilinear,
}

// maps a destination pixel center onto the source grid
#[inline]
fn source_coord(dst_idx: usize, scale: f32, src_len: usize) -> f32 {
    ((dst_idx as f32 + 0.5) * scale - 0.5).clamp(0.0, (src_len - 1) as f32)
}

/// Resize an 8-bit image to the size of `dst`.
///
/// Pixel centers are aligned, so a 2x downscale with bilinear interpolation
/// averages each 2x2 block of the source. When both images have the same size
/// the pixels are copied.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image. Its size selects the target resolution.
/// * `interpolation` - How source pixels are sampled.
/// * `strategy` - How the destination rows are scheduled.
///
/// # Example
///
/// ```
/// use huemark_image::{Image, ImageSize};
/// use huemark_imgproc::parallel::ExecutionStrategy;
/// use huemark_imgproc::resize::{resize_native, InterpolationMode};
///
/// let image = Image::<u8, 1>::new(ImageSize { width: 4, height: 1 }, vec![0, 100, 200, 200]).unwrap();
/// let mut small = Image::<u8, 1>::from_size_val(ImageSize { width: 2, height: 1 }, 0).unwrap();
///
/// resize_native(&image, &mut small, InterpolationMode::Bilinear, ExecutionStrategy::Serial).unwrap();
/// assert_eq!(small.as_slice(), &[50, 200]);
/// ```
pub fn resize_native<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    interpolation: InterpolationMode,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if dst.size().is_empty() {
        return Ok(());
    }

    if src.size().is_empty() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if src.size() == dst.size() {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    let (src_w, src_h) = (src.cols(), src.rows());
    let dst_w = dst.cols();
    let scale_x = src_w as f32 / dst_w as f32;
    let scale_y = src_h as f32 / dst.rows() as f32;
    let src_data = src.as_slice();

    let at = |x: usize, y: usize, c: usize| src_data[(y * src_w + x) * C + c] as f32;

    parallel::for_each_row(dst.as_slice_mut(), dst_w * C, strategy, |dy, row| {
        let sy = source_coord(dy, scale_y, src_h);
        for (dx, pixel) in row.chunks_exact_mut(C).enumerate() {
            let sx = source_coord(dx, scale_x, src_w);
            match interpolation {
                InterpolationMode::Nearest => {
                    let x = (sx.round() as usize).min(src_w - 1);
                    let y = (sy.round() as usize).min(src_h - 1);
                    let offset = (y * src_w + x) * C;
                    pixel.copy_from_slice(&src_data[offset..offset + C]);
                }
                InterpolationMode::Bilinear => {
                    let x0 = sx.floor() as usize;
                    let y0 = sy.floor() as usize;
                    let x1 = (x0 + 1).min(src_w - 1);
                    let y1 = (y0 + 1).min(src_h - 1);
                    let fx = sx - x0 as f32;
                    let fy = sy - y0 as f32;
                    for (c, out) in pixel.iter_mut().enumerate() {
                        let top = at(x0, y0, c) * (1.0 - fx) + at(x1, y0, c) * fx;
                        let bottom = at(x0, y1, c) * (1.0 - fx) + at(x1, y1, c) * fx;
                        let value = top * (1.0 - fy) + bottom * fy;
                        *out = value.round().clamp(0.0, 255.0) as u8;
                    }
                }
            }
        }
    });

    Ok(())
}
