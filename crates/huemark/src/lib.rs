#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use huemark_image as image;

#[doc(inline)]
pub use huemark_imgproc as imgproc;

#[doc(inline)]
pub use huemark_detect as detect;

#[doc(inline)]
pub use huemark_io as io;
