use huemark_image::Image;
use huemark_imgproc::draw::{draw_rect, draw_text};

use crate::components::Region;

/// Distance in pixels from a region's top-left corner to its label, right and down.
pub const LABEL_OFFSET: i64 = 10;

/// Text drawn next to a region: its extent as `(width, height)`, padded to four digits.
///
/// ```
/// use huemark_detect::{annotate::region_label, Point2, Region};
///
/// let region = Region {
///     id: 1,
///     min: Point2::new(2, 2),
///     max: Point2::new(6, 30),
///     pixel_count: 25,
///     centroid: (4.0, 16.0),
/// };
/// assert_eq!(region_label(&region), "(   4,   28)");
/// ```
pub fn region_label(region: &Region) -> String {
    let (w, h) = region.extent();
    format!("({w:4}, {h:4})")
}

/// Outlines every region on `frame` and writes its extent next to it.
///
/// Rectangles span `min` to `max` inclusive. Anything falling outside the
/// frame is clipped.
pub fn annotate_regions(frame: &mut Image<u8, 3>, regions: &[Region], color: [u8; 3]) {
    for region in regions {
        let top_left = (region.min.x as i64, region.min.y as i64);
        let bottom_right = (region.max.x as i64, region.max.y as i64);
        draw_rect(frame, top_left, bottom_right, color);
        draw_text(
            frame,
            (top_left.0 + LABEL_OFFSET, top_left.1 + LABEL_OFFSET),
            &region_label(region),
            color,
            1,
        );
    }
}
