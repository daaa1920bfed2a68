use huemark_image::ImageSize;

use crate::components::Point2;

/// A point in the robot frame: origin at the image center, y pointing up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RobotPoint {
    /// Offset to the right of the center, in pixels.
    pub x: i64,
    /// Offset above the center, in pixels.
    pub y: i64,
}

/// Maps image coordinates of the camera view into the robot frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotView {
    center_x: i64,
    center_y: i64,
    view_angle: u32,
}

impl RobotView {
    /// Creates a view over an image of `size` with the camera's field of view in degrees.
    pub fn new(size: ImageSize, view_angle: u32) -> Self {
        let mut view = Self {
            center_x: 0,
            center_y: 0,
            view_angle,
        };
        view.set_area(size);
        view
    }

    /// Sets the field of view in degrees.
    pub fn set_view_angle(&mut self, view_angle: u32) {
        self.view_angle = view_angle;
    }

    /// Field of view in degrees.
    pub fn view_angle(&self) -> u32 {
        self.view_angle
    }

    /// Recenters the view on an image of `size`.
    pub fn set_area(&mut self, size: ImageSize) {
        self.center_x = (size.width / 2) as i64;
        self.center_y = (size.height / 2) as i64;
    }

    /// The image pixel that maps to the origin.
    pub fn center(&self) -> Point2 {
        Point2::new(self.center_x as usize, self.center_y as usize)
    }

    /// Converts an image pixel into the robot frame.
    ///
    /// ```
    /// use huemark_detect::{view::{RobotPoint, RobotView}, Point2};
    /// use huemark_image::ImageSize;
    ///
    /// let view = RobotView::new(ImageSize { width: 640, height: 480 }, 60);
    /// assert_eq!(view.to_robot_point(Point2::new(0, 0)), RobotPoint { x: -320, y: 240 });
    /// ```
    pub fn to_robot_point(&self, p: Point2) -> RobotPoint {
        RobotPoint {
            x: p.x as i64 - self.center_x,
            y: -(p.y as i64 - self.center_y),
        }
    }
}
