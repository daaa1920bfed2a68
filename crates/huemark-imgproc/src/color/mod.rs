mod hsv;

pub use hsv::{hsv_from_bgr_u8, hsv_from_rgb_u8, hsv_pixel_from_rgb_u8, HUE_RANGE_U8};
