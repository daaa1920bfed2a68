//! Helpers for tuning color profiles on live frames.
//!
//! Point the camera so a marker covers the image center, read its HSV value
//! with [`probe_center`] and mark the probed spot with [`draw_crosshair`].

use huemark_image::{Image, ImageError};
use huemark_imgproc::{color::hsv_pixel_from_rgb_u8, draw::draw_line};

use crate::{components::Point2, profile::ChannelOrder};

/// Inner radius of the crosshair arms, in pixels.
pub const CROSSHAIR_GAP: i64 = 15;

/// Outer radius of the crosshair arms, in pixels.
pub const CROSSHAIR_REACH: i64 = 30;

/// The HSV value found at the center of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterProbe {
    /// The probed pixel, `(width / 2, height / 2)`.
    pub position: Point2,
    /// Its value in 8-bit HSV.
    pub hsv: [u8; 3],
}

impl std::fmt::Display for CenterProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:4}, {:4}, {:4}", self.hsv[0], self.hsv[1], self.hsv[2])
    }
}

/// Reads the HSV value of the center pixel of `frame`.
pub fn probe_center(frame: &Image<u8, 3>, order: ChannelOrder) -> Result<CenterProbe, ImageError> {
    let position = Point2::new(frame.cols() / 2, frame.rows() / 2);
    let pixel = [
        *frame.get_pixel(position.x, position.y, 0)?,
        *frame.get_pixel(position.x, position.y, 1)?,
        *frame.get_pixel(position.x, position.y, 2)?,
    ];
    let [r, g, b] = match order {
        ChannelOrder::Rgb => pixel,
        ChannelOrder::Bgr => [pixel[2], pixel[1], pixel[0]],
    };
    Ok(CenterProbe {
        position,
        hsv: hsv_pixel_from_rgb_u8(r, g, b),
    })
}

/// Draws four arms around `center`, leaving the center itself visible.
pub fn draw_crosshair(frame: &mut Image<u8, 3>, center: Point2, color: [u8; 3]) {
    let (cx, cy) = (center.x as i64, center.y as i64);
    for (dx, dy) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
        draw_line(
            frame,
            (cx + dx * CROSSHAIR_REACH, cy + dy * CROSSHAIR_REACH),
            (cx + dx * CROSSHAIR_GAP, cy + dy * CROSSHAIR_GAP),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huemark_image::ImageSize;

    #[test]
    fn test_probe_center() -> Result<(), ImageError> {
        let mut frame = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 5,
                height: 4,
            },
            0,
        )?;
        frame.set_pixel(2, 2, 2, 255)?;

        let probe = probe_center(&frame, ChannelOrder::Rgb)?;
        assert_eq!(probe.position, Point2::new(2, 2));
        assert_eq!(probe.hsv, [120, 255, 255]);
        assert_eq!(probe.to_string(), " 120,  255,  255");

        let probe = probe_center(&frame, ChannelOrder::Bgr)?;
        assert_eq!(probe.hsv, [0, 255, 255]);
        Ok(())
    }

    #[test]
    fn test_probe_empty_frame() -> Result<(), ImageError> {
        let frame = Image::<u8, 3>::new(ImageSize::default(), vec![])?;
        assert!(probe_center(&frame, ChannelOrder::Rgb).is_err());
        Ok(())
    }

    #[test]
    fn test_crosshair() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 80,
            height: 80,
        };
        let mut frame = Image::<u8, 3>::from_size_val(size, 0)?;
        let center = Point2::new(40, 40);
        draw_crosshair(&mut frame, center, [255, 0, 0]);

        assert_eq!(frame.get_pixel(40, 40, 0)?, &0);
        assert_eq!(frame.get_pixel(40, 26, 0)?, &0);
        for (x, y) in [(40, 25), (40, 10), (40, 55), (40, 70), (25, 40), (10, 40), (55, 40), (70, 40)] {
            assert_eq!(frame.get_pixel(x, y, 0)?, &255, "arm at ({x}, {y})");
        }
        assert_eq!(frame.get_pixel(40, 9, 0)?, &0);
        Ok(())
    }
}
