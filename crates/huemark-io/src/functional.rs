use std::path::Path;

use huemark_image::{Image, ImageSize};

use crate::error::IoError;

/// File extensions, lowercase, that [`read_image_rgb8`] is expected to decode.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Whether `path` has one of the [`SUPPORTED_EXTENSIONS`], ignoring case.
pub fn is_supported_image(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        })
}

/// Reads an image file into an 8-bit RGB image.
///
/// Any format the `image` crate can decode is accepted; grayscale and alpha
/// images are converted to RGB.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
pub fn read_image_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();

    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::open(file_path)?.into_rgb8();
    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_raw())?)
}

/// Writes an 8-bit RGB image as a PNG file.
pub fn write_image_png_rgb8(file_path: impl AsRef<Path>, image: &Image<u8, 3>) -> Result<(), IoError> {
    image::save_buffer_with_format(
        file_path,
        image.as_slice(),
        image.width() as u32,
        image.height() as u32,
        image::ExtendedColorType::Rgb8,
        image::ImageFormat::Png,
    )?;
    Ok(())
}

/// Writes an 8-bit single channel image, such as a mask, as a PNG file.
pub fn write_image_png_gray8(file_path: impl AsRef<Path>, image: &Image<u8, 1>) -> Result<(), IoError> {
    image::save_buffer_with_format(
        file_path,
        image.as_slice(),
        image.width() as u32,
        image.height() as u32,
        image::ExtendedColorType::L8,
        image::ImageFormat::Png,
    )?;
    Ok(())
}
