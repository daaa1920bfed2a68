use std::path::{Path, PathBuf};

use huemark_detect::stream::FrameSource;
use huemark_image::{Image, ImageSize};

use crate::{
    error::IoError,
    functional::{is_supported_image, read_image_rgb8},
};

/// Plays back a directory of image files as a stream of frames.
///
/// Files with a supported image extension are read in lexicographic order of
/// their names. The frame size is taken from the first file.
///
/// # Example
///
/// ```no_run
/// use huemark_detect::stream::FrameSource;
/// use huemark_io::ImageSequenceSource;
///
/// let mut source = ImageSequenceSource::open("recordings/run_01")?.with_looping(true);
/// println!("frames of {}", source.frame_size());
/// while let Some(frame) = source.grab()? {
///     // ...
/// #   break;
/// }
/// # Ok::<(), huemark_io::IoError>(())
/// ```
pub struct ImageSequenceSource {
    files: Vec<PathBuf>,
    next: usize,
    size: ImageSize,
    looping: bool,
}

impl ImageSequenceSource {
    /// Lists the image files of `dir` and reads the first one to fix the frame size.
    ///
    /// # Errors
    ///
    /// Fails when `dir` is missing, is not a directory, holds no image file
    /// or its first image cannot be decoded.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, IoError> {
        let dir = dir.as_ref();

        if !dir.exists() {
            return Err(IoError::FileDoesNotExist(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(IoError::NotADirectory(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_supported_image(&path) {
                files.push(path);
            }
        }
        files.sort();

        let Some(first) = files.first() else {
            return Err(IoError::EmptySequence(dir.to_path_buf()));
        };
        let size = read_image_rgb8(first)?.size();

        log::info!(
            "opened image sequence {} with {} frames of {}",
            dir.display(),
            files.len(),
            size
        );

        Ok(Self {
            files,
            next: 0,
            size,
            looping: false,
        })
    }

    /// Restart from the first file after the last one instead of ending.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// The files played back, in order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of files in the sequence.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the sequence has no files. Never true for an opened sequence.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    type Error = IoError;

    fn frame_size(&self) -> ImageSize {
        self.size
    }

    fn grab(&mut self) -> Result<Option<Image<u8, 3>>, Self::Error> {
        if self.next >= self.files.len() {
            if !self.looping {
                return Ok(None);
            }
            self.next = 0;
        }

        let path = &self.files[self.next];
        log::debug!("reading frame {}", path.display());
        let frame = read_image_rgb8(path)?;
        self.next += 1;

        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functional::write_image_png_rgb8;

    fn write_frames(dir: &Path, names: &[&str]) -> Result<(), IoError> {
        for (i, name) in names.iter().enumerate() {
            let frame = Image::<u8, 3>::from_size_val(
                ImageSize {
                    width: 4,
                    height: 3,
                },
                i as u8 * 10,
            )?;
            write_image_png_rgb8(dir.join(name), &frame)?;
        }
        Ok(())
    }

    #[test]
    fn test_reads_in_name_order() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        // written out of order, value encodes the write position
        write_frames(tmp_dir.path(), &["b.png", "a.png", "c.png"])?;
        std::fs::write(tmp_dir.path().join("readme.txt"), "not a frame")?;

        let mut source = ImageSequenceSource::open(tmp_dir.path())?;
        assert_eq!(source.len(), 3);
        assert_eq!(
            source.frame_size(),
            ImageSize {
                width: 4,
                height: 3
            }
        );

        let mut firsts = Vec::new();
        while let Some(frame) = source.grab()? {
            firsts.push(frame.as_slice()[0]);
        }
        assert_eq!(firsts, vec![10, 0, 20]);
        assert!(source.grab()?.is_none());
        Ok(())
    }

    #[test]
    fn test_looping() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        write_frames(tmp_dir.path(), &["0.png", "1.png"])?;

        let mut source = ImageSequenceSource::open(tmp_dir.path())?.with_looping(true);
        let mut firsts = Vec::new();
        for _ in 0..5 {
            match source.grab()? {
                Some(frame) => firsts.push(frame.as_slice()[0]),
                None => break,
            }
        }
        assert_eq!(firsts, vec![0, 10, 0, 10, 0]);
        Ok(())
    }

    #[test]
    fn test_empty_directory() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let result = ImageSequenceSource::open(tmp_dir.path());
        assert!(matches!(result, Err(IoError::EmptySequence(_))));
        Ok(())
    }

    #[test]
    fn test_missing_directory() {
        let result = ImageSequenceSource::open("/no/such/recording");
        assert!(matches!(result, Err(IoError::FileDoesNotExist(_))));
    }

    #[test]
    fn test_file_is_not_a_directory() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file = tmp_dir.path().join("frame.png");
        write_frames(tmp_dir.path(), &["frame.png"])?;
        let result = ImageSequenceSource::open(&file);
        assert!(matches!(result, Err(IoError::NotADirectory(_))));
        Ok(())
    }
}
