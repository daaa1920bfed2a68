use serde::{Deserialize, Serialize};

use huemark_image::{Image, ImageError};
use huemark_imgproc::{parallel::ExecutionStrategy, threshold::threshold_mask};

/// The marker colors the detector looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorClass {
    /// Red markers. Their hue range crosses zero.
    Red,
    /// Blue markers.
    Blue,
    /// Yellow markers.
    Yellow,
}

impl ColorClass {
    /// Every class, in processing order.
    pub const ALL: [ColorClass; 3] = [ColorClass::Red, ColorClass::Blue, ColorClass::Yellow];

    /// Position of the class in [`ColorClass::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name, as used in configuration files and output file names.
    pub fn name(self) -> &'static str {
        match self {
            ColorClass::Red => "red",
            ColorClass::Blue => "blue",
            ColorClass::Yellow => "yellow",
        }
    }

    /// Color used to outline regions of this class on a frame with the given
    /// channel order.
    pub fn display_color(self, order: ChannelOrder) -> [u8; 3] {
        let rgb = match self {
            ColorClass::Red => [255, 0, 0],
            ColorClass::Blue => [0, 0, 255],
            ColorClass::Yellow => [255, 255, 0],
        };
        order.arrange(rgb)
    }
}

impl std::fmt::Display for ColorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Channel layout of incoming frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    /// Red, green, blue. What the `image` crate decoders produce.
    #[default]
    Rgb,
    /// Blue, green, red. What OpenCV style capture devices produce.
    Bgr,
}

impl ChannelOrder {
    /// Reorders an RGB triple into this channel order.
    #[inline]
    pub fn arrange(self, [r, g, b]: [u8; 3]) -> [u8; 3] {
        match self {
            ChannelOrder::Rgb => [r, g, b],
            ChannelOrder::Bgr => [b, g, r],
        }
    }
}

/// Inclusive HSV bounds describing one color class.
///
/// Hue follows the 8-bit convention (degrees / 2). When `hue_wraps` is set the
/// accepted hues are `[0, hue_upper]` and `[hue_lower, 255]`, which lets a
/// range such as red cross the zero point of the hue circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorProfile {
    /// Lowest accepted hue. For wrapping profiles, start of the upper interval.
    pub hue_lower: u8,
    /// Highest accepted hue. For wrapping profiles, end of the lower interval.
    pub hue_upper: u8,
    /// Whether the hue range crosses zero.
    #[serde(default)]
    pub hue_wraps: bool,
    /// Lowest accepted saturation.
    pub saturation_lower: u8,
    /// Highest accepted saturation.
    pub saturation_upper: u8,
    /// Lowest accepted value.
    pub value_lower: u8,
    /// Highest accepted value.
    pub value_upper: u8,
}

impl ColorProfile {
    /// Default profile for red markers.
    pub const RED: ColorProfile = ColorProfile {
        hue_lower: 171,
        hue_upper: 6,
        hue_wraps: true,
        saturation_lower: 61,
        saturation_upper: 255,
        value_lower: 81,
        value_upper: 255,
    };

    /// Default profile for blue markers.
    pub const BLUE: ColorProfile = ColorProfile {
        hue_lower: 101,
        hue_upper: 120,
        hue_wraps: false,
        saturation_lower: 246,
        saturation_upper: 255,
        value_lower: 1,
        value_upper: 255,
    };

    /// Default profile for yellow markers.
    pub const YELLOW: ColorProfile = ColorProfile {
        hue_lower: 21,
        hue_upper: 35,
        hue_wraps: false,
        saturation_lower: 41,
        saturation_upper: 190,
        value_lower: 111,
        value_upper: 255,
    };

    /// Whether an HSV triple belongs to this profile.
    ///
    /// # Example
    ///
    /// ```
    /// use huemark_detect::ColorProfile;
    ///
    /// assert!(ColorProfile::RED.contains(0, 200, 200));
    /// assert!(ColorProfile::RED.contains(175, 200, 200));
    /// assert!(!ColorProfile::RED.contains(90, 200, 200));
    /// ```
    #[inline]
    pub fn contains(&self, h: u8, s: u8, v: u8) -> bool {
        let hue_ok = if self.hue_wraps {
            h <= self.hue_upper || h >= self.hue_lower
        } else {
            self.hue_lower <= h && h <= self.hue_upper
        };

        hue_ok
            && (self.saturation_lower..=self.saturation_upper).contains(&s)
            && (self.value_lower..=self.value_upper).contains(&v)
    }
}

/// One [`ColorProfile`] per [`ColorClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileTable {
    /// Profile for [`ColorClass::Red`].
    pub red: ColorProfile,
    /// Profile for [`ColorClass::Blue`].
    pub blue: ColorProfile,
    /// Profile for [`ColorClass::Yellow`].
    pub yellow: ColorProfile,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self {
            red: ColorProfile::RED,
            blue: ColorProfile::BLUE,
            yellow: ColorProfile::YELLOW,
        }
    }
}

impl ProfileTable {
    /// The profile of `class`.
    pub fn get(&self, class: ColorClass) -> &ColorProfile {
        match class {
            ColorClass::Red => &self.red,
            ColorClass::Blue => &self.blue,
            ColorClass::Yellow => &self.yellow,
        }
    }

    /// Mutable access to the profile of `class`.
    pub fn get_mut(&mut self, class: ColorClass) -> &mut ColorProfile {
        match class {
            ColorClass::Red => &mut self.red,
            ColorClass::Blue => &mut self.blue,
            ColorClass::Yellow => &mut self.yellow,
        }
    }

    /// Iterates over `(class, profile)` pairs in [`ColorClass::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ColorClass, &ColorProfile)> {
        ColorClass::ALL.into_iter().map(move |class| (class, self.get(class)))
    }
}

/// Marks the pixels of an HSV image that fall inside `profile`.
///
/// # Arguments
///
/// * `hsv` - The input image in 8-bit HSV.
/// * `profile` - The bounds of the color class.
/// * `mask` - The output mask, 255 where the pixel matches and 0 elsewhere.
/// * `strategy` - How to schedule the per-pixel work.
///
/// Precondition: `hsv` and `mask` must have the same size.
pub fn classify(
    hsv: &Image<u8, 3>,
    profile: &ColorProfile,
    mask: &mut Image<u8, 1>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    threshold_mask(hsv, mask, strategy, |px| {
        profile.contains(px[0], px[1], px[2])
    })
}
