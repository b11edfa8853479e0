use iced::widget::image::Handle;
use image::{GenericImageView, ImageError};

use super::error::DecodeError;
use super::{DecodedImage, ImageDecoder};

/// Default longest edge of decoded previews
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 512;

/// Decodes any image format the `image` crate can read and scales it down
/// to a preview that fits the list rows
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailDecoder {
    max_dimension: u32,
}

impl ThumbnailDecoder {
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }
}

impl Default for ThumbnailDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_THUMBNAIL_SIZE)
    }
}

impl ImageDecoder for ThumbnailDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        // Sniff the content type from the magic bytes, not the file extension
        let format = image::guess_format(bytes).map_err(|_| DecodeError::UnsupportedContentType)?;

        let img = image::load_from_memory_with_format(bytes, format).map_err(|e| match e {
            ImageError::Unsupported(_) => DecodeError::UnsupportedContentType,
            other => DecodeError::Corrupt(other.to_string()),
        })?;

        let (width, height) = img.dimensions();
        let img = if width > self.max_dimension || height > self.max_dimension {
            img.thumbnail(self.max_dimension, self.max_dimension)
        } else {
            img
        };

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(DecodedImage {
            width,
            height,
            handle: Handle::from_rgba(width, height, rgba.into_raw()),
        })
    }
}

/// Encode a solid-colour PNG in memory
#[cfg(test)]
pub(crate) fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    use std::io::Cursor;

    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
    buffer.into_inner()
}
