use crate::parallel::{self, ExecutionStrategy};
use huemark_image::{Image, ImageError};

/// Number of distinct hue values in the 8-bit HSV representation.
///
/// Hue is stored as degrees divided by two, so the channel spans `[0, 180)`.
pub const HUE_RANGE_U8: u8 = 180;

/// Convert one 8-bit RGB pixel to 8-bit HSV.
///
/// * H: degrees / 2 in `[0, 180)`, zero for achromatic pixels.
/// * S: `255 * (max - min) / max`, zero for black.
/// * V: `max(r, g, b)`.
#[inline]
pub fn hsv_pixel_from_rgb_u8(r: u8, g: u8, b: u8) -> [u8; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = (max - min) as f32;

    let s = if max == 0 {
        0
    } else {
        (255.0 * delta / max as f32).round() as u8
    };

    if delta == 0.0 {
        return [0, s, max];
    }

    let (r, g, b) = (r as f32, g as f32, b as f32);
    let mut h = if max as f32 == r {
        60.0 * (g - b) / delta
    } else if max as f32 == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };

    if h < 0.0 {
        h += 360.0;
    }

    // 359.x degrees rounds up to the full turn
    let mut h = (h / 2.0).round() as u16;
    if h >= HUE_RANGE_U8 as u16 {
        h -= HUE_RANGE_U8 as u16;
    }

    [h as u8, s, max]
}

/// Convert an 8-bit RGB image to an 8-bit HSV image.
///
/// # Arguments
///
/// * `src` - The input RGB image.
/// * `dst` - The output HSV image, see [`hsv_pixel_from_rgb_u8`] for the channel ranges.
/// * `strategy` - How to schedule the per-pixel work.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use huemark_image::{Image, ImageSize};
/// use huemark_imgproc::color::hsv_from_rgb_u8;
/// use huemark_imgproc::parallel::ExecutionStrategy;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize { width: 1, height: 1 },
///     vec![0, 0, 255],
/// )
/// .unwrap();
///
/// let mut hsv = Image::<u8, 3>::from_size_val(image.size(), 0).unwrap();
/// hsv_from_rgb_u8(&image, &mut hsv, ExecutionStrategy::Serial).unwrap();
///
/// assert_eq!(hsv.as_slice(), &[120, 255, 255]);
/// ```
pub fn hsv_from_rgb_u8(
    src: &Image<u8, 3>,
    dst: &mut Image<u8, 3>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::iter_rows(src, dst, strategy, |src_pixel, dst_pixel| {
        dst_pixel.copy_from_slice(&hsv_pixel_from_rgb_u8(
            src_pixel[0],
            src_pixel[1],
            src_pixel[2],
        ));
    });

    Ok(())
}

/// Convert an 8-bit BGR image to an 8-bit HSV image.
///
/// Same as [`hsv_from_rgb_u8`] with the first and last input channels swapped,
/// for sources that deliver frames in blue-green-red order.
pub fn hsv_from_bgr_u8(
    src: &Image<u8, 3>,
    dst: &mut Image<u8, 3>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::iter_rows(src, dst, strategy, |src_pixel, dst_pixel| {
        dst_pixel.copy_from_slice(&hsv_pixel_from_rgb_u8(
            src_pixel[2],
            src_pixel[1],
            src_pixel[0],
        ));
    });

    Ok(())
}
