use std::convert::Infallible;
use std::path::{Path, PathBuf};

use huemark_detect::{
    stream::{DisplayFrame, DisplaySink},
    ColorClass, Region,
};

use crate::{
    error::IoError,
    functional::{write_image_png_gray8, write_image_png_rgb8},
};

/// Writes every processed frame as PNG files into a directory.
///
/// Frame `n` goes to `frame_{n:06}.png`. With masks enabled, the raw threshold
/// mask of each class goes to `frame_{n:06}_{class}.png`.
pub struct PngDirectorySink {
    dir: PathBuf,
    save_masks: bool,
}

impl PngDirectorySink {
    /// Creates the output directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, IoError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            save_masks: false,
        })
    }

    /// Also write the per-class threshold masks.
    pub fn with_masks(mut self, save_masks: bool) -> Self {
        self.save_masks = save_masks;
        self
    }

    /// Path of the annotated frame `index`.
    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:06}.png"))
    }

    /// Path of the mask of `class` for frame `index`.
    pub fn mask_path(&self, index: u64, class: ColorClass) -> PathBuf {
        self.dir.join(format!("frame_{index:06}_{class}.png"))
    }
}

impl DisplaySink for PngDirectorySink {
    type Error = IoError;

    fn present(&mut self, view: &DisplayFrame<'_>) -> Result<(), Self::Error> {
        write_image_png_rgb8(self.frame_path(view.index), view.annotated)?;

        if self.save_masks {
            for class in ColorClass::ALL {
                write_image_png_gray8(self.mask_path(view.index, class), view.mask(class))?;
            }
        }

        Ok(())
    }
}

fn describe(regions: &[Region]) -> String {
    let boxes: Vec<String> = regions
        .iter()
        .map(|r| {
            format!(
                "[({}, {})-({}, {}) {}px]",
                r.min.x, r.min.y, r.max.x, r.max.y, r.pixel_count
            )
        })
        .collect();
    boxes.join(" ")
}

/// Logs the regions of every frame at `info` level instead of displaying it.
#[derive(Debug, Default)]
pub struct LogSink;

impl DisplaySink for LogSink {
    type Error = Infallible;

    fn present(&mut self, view: &DisplayFrame<'_>) -> Result<(), Self::Error> {
        for (class, regions) in view.detections.iter() {
            if !regions.is_empty() {
                log::info!(
                    "frame {} {}: {} region(s) {}",
                    view.index,
                    class,
                    regions.len(),
                    describe(regions)
                );
            }
        }
        Ok(())
    }
}
