//! Control image normalization: decode, RGB, 1024×1024 stretch, PNG.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, Limits};

use crate::error::TransformError;

/// Side length, in pixels, of every control image sent upstream.
pub const TARGET_SIDE: u32 = 1024;

/// Largest accepted upload width or height, in pixels.
///
/// Compressed formats can declare huge rasters in a few kilobytes.
pub const MAX_SOURCE_SIDE: u32 = 12_000;

/// A control image ready for upload.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// PNG-encoded RGB raster, exactly [`TARGET_SIDE`] square.
    pub png: Vec<u8>,
    /// Width of the upload before normalization.
    pub original_width: u32,
    /// Height of the upload before normalization.
    pub original_height: u32,
}

impl NormalizedImage {
    /// Whether the upload had to be resized.
    #[must_use]
    pub fn was_resized(&self) -> bool {
        self.original_width != TARGET_SIDE || self.original_height != TARGET_SIDE
    }
}

/// Decode `bytes`, convert to RGB and stretch to [`TARGET_SIDE`]², then
/// re-encode as PNG.
///
/// Aspect ratio is deliberately not preserved.
///
/// # Errors
///
/// Returns [`TransformError::InvalidImage`] if the bytes cannot be decoded or
/// exceed [`MAX_SOURCE_SIDE`], and [`TransformError::Unexpected`] if PNG
/// encoding fails.
pub fn normalize_image(bytes: &[u8]) -> Result<NormalizedImage, TransformError> {
    let decoded = decode_bounded(bytes)
        .map_err(|e| TransformError::InvalidImage { reason: e.to_string() })?;

    let original_width = decoded.width();
    let original_height = decoded.height();

    let mut rgb = decoded.to_rgb8();
    if original_width != TARGET_SIDE || original_height != TARGET_SIDE {
        rgb = image::imageops::resize(&rgb, TARGET_SIDE, TARGET_SIDE, FilterType::CatmullRom);
    }

    let mut png = Vec::new();
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| TransformError::unexpected(format!("Failed to encode PNG: {e}")))?;

    Ok(NormalizedImage { png, original_width, original_height })
}

fn decode_bounded(bytes: &[u8]) -> image::ImageResult<DynamicImage> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_SOURCE_SIDE);
    limits.max_image_height = Some(MAX_SOURCE_SIDE);

    let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    reader.limits(limits);
    reader.decode()
}

#[cfg(test)]
mod tests {
    use image::{ColorType, GenericImageView, GrayImage, RgbaImage};

    use super::*;

    fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    fn decode_png(bytes: &[u8]) -> DynamicImage {
        image::load_from_memory_with_format(bytes, ImageFormat::Png).unwrap()
    }

    #[test]
    fn any_size_becomes_square() {
        for (w, h) in [(1, 1), (640, 480), (300, 1200), (2048, 1024), (1023, 1025)] {
            let src = DynamicImage::new_rgb8(w, h);
            let normalized = normalize_image(&encode(&src, ImageFormat::Png)).unwrap();
            let out = decode_png(&normalized.png);
            assert_eq!(out.dimensions(), (TARGET_SIDE, TARGET_SIDE), "from {w}x{h}");
            assert_eq!((normalized.original_width, normalized.original_height), (w, h));
            assert!(normalized.was_resized());
        }
    }

    #[test]
    fn exact_size_not_resized() {
        let src = DynamicImage::new_rgb8(TARGET_SIDE, TARGET_SIDE);
        let normalized = normalize_image(&encode(&src, ImageFormat::Png)).unwrap();
        assert!(!normalized.was_resized());
        assert_eq!(decode_png(&normalized.png).dimensions(), (TARGET_SIDE, TARGET_SIDE));
    }

    #[test]
    fn alpha_and_grayscale_become_rgb() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(10, 20));
        let gray = DynamicImage::ImageLuma8(GrayImage::new(30, 5));
        for src in [rgba, gray] {
            let normalized = normalize_image(&encode(&src, ImageFormat::Png)).unwrap();
            assert_eq!(decode_png(&normalized.png).color(), ColorType::Rgb8);
        }
    }

    #[test]
    fn palette_gif_becomes_rgb() {
        // 1×1 GIF89a with a two-entry global colour table.
        const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00\
            !\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\
            \x02\x02D\x01\x00;";

        let normalized = normalize_image(GIF).unwrap();
        let out = decode_png(&normalized.png);
        assert_eq!(out.color(), ColorType::Rgb8);
        assert_eq!(out.dimensions(), (TARGET_SIDE, TARGET_SIDE));
        assert_eq!((normalized.original_width, normalized.original_height), (1, 1));
    }

    #[test]
    fn oversized_dimensions_rejected() {
        let src = DynamicImage::new_luma8(MAX_SOURCE_SIDE + 1, 1);
        let err = normalize_image(&encode(&src, ImageFormat::Png)).unwrap_err();
        assert!(matches!(err, TransformError::InvalidImage { .. }));

        let src = DynamicImage::new_luma8(1, MAX_SOURCE_SIDE + 1);
        let err = normalize_image(&encode(&src, ImageFormat::Png)).unwrap_err();
        assert!(matches!(err, TransformError::InvalidImage { .. }));
    }

    #[test]
    fn jpeg_input_accepted() {
        let src = DynamicImage::new_rgb8(64, 48);
        let normalized = normalize_image(&encode(&src, ImageFormat::Jpeg)).unwrap();
        assert_eq!(&normalized.png[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn stretch_keeps_colour() {
        let src = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            200,
            50,
            image::Rgb([200, 40, 10]),
        ));
        let normalized = normalize_image(&encode(&src, ImageFormat::Png)).unwrap();
        let out = decode_png(&normalized.png).to_rgb8();
        assert_eq!(out.get_pixel(512, 512).0, [200, 40, 10]);
    }

    #[test]
    fn garbage_is_invalid_image() {
        let err = normalize_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, TransformError::InvalidImage { .. }));
    }

    #[test]
    fn empty_upload_is_invalid_image() {
        assert!(matches!(normalize_image(&[]).unwrap_err(), TransformError::InvalidImage { .. }));
    }
}
