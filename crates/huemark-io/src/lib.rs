#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the io module.
pub mod error;

/// High-level functions to read and write image files.
pub mod functional;

/// Frame source reading a directory of image files.
pub mod sequence;

/// Display sinks writing or logging processed frames.
pub mod sink;

pub use crate::error::IoError;
pub use crate::sequence::ImageSequenceSource;
pub use crate::sink::{LogSink, PngDirectorySink};
