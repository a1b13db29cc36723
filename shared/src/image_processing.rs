use image::{imageops::FilterType, DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::error::ThumbnailError;

/// Fixed thumbnail height, width follows the source aspect ratio
pub const THUMBNAIL_HEIGHT: u32 = 100;
/// Widest thumbnail we will resample to (a 20:1 panorama)
pub const MAX_THUMBNAIL_WIDTH: u32 = 2_000;

#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Target dimensions for a source of `width` x `height`.
/// Height is always `THUMBNAIL_HEIGHT`, width is round(100 * W / H), at least 1px.
pub fn thumbnail_dimensions(width: u32, height: u32) -> (u32, u32) {
    let scaled = (THUMBNAIL_HEIGHT as f64 * width as f64 / height.max(1) as f64).round();
    ((scaled as u32).max(1), THUMBNAIL_HEIGHT)
}

/// Generate a thumbnail of the image in `image_bytes`
pub fn generate_thumbnail(image_bytes: &[u8]) -> Result<Thumbnail, ThumbnailError> {
    if image_bytes.is_empty() {
        return Err(ThumbnailError::Empty);
    }

    let source_format = image::guess_format(image_bytes).map_err(ThumbnailError::Decode)?;
    let img = image::load_from_memory_with_format(image_bytes, source_format)
        .map_err(ThumbnailError::Decode)?;

    let (width, height) = thumbnail_dimensions(img.width(), img.height());
    if width > MAX_THUMBNAIL_WIDTH {
        return Err(ThumbnailError::TooWide {
            width: img.width(),
            height: img.height(),
        });
    }

    // Resize with high-quality Lanczos3 filter
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);

    // PNG keeps its format (and alpha), everything else becomes JPEG
    let (output, format, content_type) = match source_format {
        ImageFormat::Png => (resized, ImageFormat::Png, "image/png"),
        _ => (
            DynamicImage::ImageRgb8(resized.to_rgb8()),
            ImageFormat::Jpeg,
            "image/jpeg",
        ),
    };

    let mut buf = Cursor::new(Vec::new());
    output
        .write_to(&mut buf, format)
        .map_err(ThumbnailError::Encode)?;

    Ok(Thumbnail {
        width,
        height,
        content_type,
        bytes: buf.into_inner(),
    })
}

#[cfg(test)]
pub(crate) fn encode_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([200, 120, 40]),
    ));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}
