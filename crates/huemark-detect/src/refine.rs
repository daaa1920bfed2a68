//! Snapping regions found on a downscaled frame back onto the full frame.
//!
//! Labeling a downscaled mask only locates a box to within one processing
//! pixel, which is several frame pixels at small downscale factors. The
//! refiner repeats classification, opening and labeling on the full-resolution
//! pixels of a window around each box and keeps the component that overlaps it
//! most. Only the windows are processed, so the cost grows with the number of
//! markers rather than with the frame size.

use huemark_image::{Image, ImageSize};
use huemark_imgproc::{
    color::hsv_pixel_from_rgb_u8,
    morphology::{open, BorderMode},
    threshold::{MASK_BACKGROUND, MASK_FOREGROUND},
};

use crate::{
    components::{ComponentLabeler, Connectivity, Point2, Region},
    error::DetectError,
    pipeline::DetectionSettings,
    profile::{ChannelOrder, ColorProfile},
};

/// Frame pixels added on each side of a coarse box before refining it.
///
/// Covers the uncertainty of one processing pixel on both sides of the edge
/// plus the reach of the opening, so the window ends on background.
pub fn refine_margin(
    processing_size: ImageSize,
    frame_size: ImageSize,
    settings: &DetectionSettings,
) -> usize {
    if processing_size.is_empty() {
        return 0;
    }
    let step_x = frame_size.width as f64 / processing_size.width as f64;
    let step_y = frame_size.height as f64 / processing_size.height as f64;
    let step = step_x.max(step_y).ceil() as usize;

    let radius = settings.kernel.width().max(settings.kernel.height()) / 2;
    let reach = radius * (settings.erode_iterations + settings.dilate_iterations);

    2 * step + reach + 1
}

fn overlap(a: &Region, min: Point2, max: Point2) -> usize {
    let x0 = a.min.x.max(min.x);
    let y0 = a.min.y.max(min.y);
    let x1 = a.max.x.min(max.x);
    let y1 = a.max.y.min(max.y);
    if x0 > x1 || y0 > y1 {
        return 0;
    }
    (x1 - x0 + 1) * (y1 - y0 + 1)
}

/// Reusable buffers for refining boxes on full-resolution windows.
pub struct RegionRefiner {
    mask: Vec<u8>,
    scratch: Vec<u8>,
    filtered: Vec<u8>,
    labeler: ComponentLabeler,
}

impl RegionRefiner {
    /// Creates a refiner. Buffers grow to the largest window seen.
    pub fn new(connectivity: Connectivity) -> Self {
        Self {
            mask: Vec::new(),
            scratch: Vec::new(),
            filtered: Vec::new(),
            labeler: ComponentLabeler::new(ImageSize::default(), connectivity),
        }
    }

    /// Refines `coarse`, a box already mapped to frame coordinates.
    ///
    /// Returns `None` when no full-resolution component of the window
    /// overlaps `coarse`, for instance when a thin shape only survives the
    /// opening at the processing resolution. The returned region keeps the id
    /// of `coarse` and carries the pixel count and centroid measured on the
    /// frame.
    pub fn refine(
        &mut self,
        frame: &Image<u8, 3>,
        order: ChannelOrder,
        profile: &ColorProfile,
        settings: &DetectionSettings,
        coarse: &Region,
        margin: usize,
    ) -> Result<Option<Region>, DetectError> {
        let (width, height) = (frame.cols(), frame.rows());
        if width == 0 || height == 0 {
            return Ok(None);
        }

        let origin = Point2::new(
            coarse.min.x.saturating_sub(margin),
            coarse.min.y.saturating_sub(margin),
        );
        let end = Point2::new(
            (coarse.max.x + margin).min(width - 1),
            (coarse.max.y + margin).min(height - 1),
        );
        let window = ImageSize {
            width: end.x + 1 - origin.x,
            height: end.y + 1 - origin.y,
        };

        let pixels = frame.as_slice();
        let mut mask_data = std::mem::take(&mut self.mask);
        mask_data.clear();
        for y in origin.y..=end.y {
            let row = (y * width + origin.x) * 3..(y * width + end.x + 1) * 3;
            mask_data.extend(pixels[row].chunks_exact(3).map(|px| {
                // the channel swap is its own inverse
                let [r, g, b] = order.arrange([px[0], px[1], px[2]]);
                let [h, s, v] = hsv_pixel_from_rgb_u8(r, g, b);
                if profile.contains(h, s, v) {
                    MASK_FOREGROUND
                } else {
                    MASK_BACKGROUND
                }
            }));
        }

        let mask = Image::<u8, 1>::new(window, mask_data)?;
        let mut scratch = Self::blank(std::mem::take(&mut self.scratch), window)?;
        let mut filtered = Self::blank(std::mem::take(&mut self.filtered), window)?;

        open(
            &mask,
            &mut filtered,
            &mut scratch,
            &settings.kernel,
            settings.erode_iterations,
            settings.dilate_iterations,
            BorderMode::Constant(0),
            settings.strategy,
        )?;

        self.labeler.resize(window);
        let components = self.labeler.label(&filtered, 1)?;

        self.mask = mask.into_vec();
        self.scratch = scratch.into_vec();
        self.filtered = filtered.into_vec();

        let local_min = Point2::new(coarse.min.x - origin.x, coarse.min.y - origin.y);
        let local_max = Point2::new(coarse.max.x - origin.x, coarse.max.y - origin.y);

        let best = components
            .iter()
            .map(|c| (overlap(c, local_min, local_max), c))
            .filter(|(shared, _)| *shared > 0)
            .max_by(|(sa, a), (sb, b)| {
                sa.cmp(sb).then(a.pixel_count.cmp(&b.pixel_count))
            });

        Ok(best.map(|(_, c)| Region {
            id: coarse.id,
            min: Point2::new(c.min.x + origin.x, c.min.y + origin.y),
            max: Point2::new(c.max.x + origin.x, c.max.y + origin.y),
            pixel_count: c.pixel_count,
            centroid: (
                c.centroid.0 + origin.x as f64,
                c.centroid.1 + origin.y as f64,
            ),
        }))
    }

    fn blank(mut data: Vec<u8>, size: ImageSize) -> Result<Image<u8, 1>, DetectError> {
        data.clear();
        data.resize(size.area(), 0);
        Ok(Image::new(size, data)?)
    }
}
