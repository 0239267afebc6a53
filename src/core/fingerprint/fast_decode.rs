//! Fast image decoding with format-specific optimizations.
//!
//! Uses zune-jpeg for JPEG files (1.5-2x faster than image crate),
//! falls back to image crate for other formats.

use crate::error::FingerprintError;
use image::{DynamicImage, ImageBuffer, ImageError, Luma, Rgb, Rgba};
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Fast image decoder that picks a decoder per format
pub struct FastDecoder;

impl FastDecoder {
    /// Decode an image from a file path using the fastest available decoder.
    ///
    /// JPEG files go through zune-jpeg first; anything it rejects, and every
    /// other format, is handed to the image crate.
    pub fn decode(path: &Path) -> Result<DynamicImage, FingerprintError> {
        let image = if is_jpeg(path) {
            Self::decode_jpeg(path).or_else(|_| Self::decode_fallback(path))?
        } else {
            Self::decode_fallback(path)?
        };

        if image.width() == 0 || image.height() == 0 {
            return Err(FingerprintError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        Ok(image)
    }

    fn decode_jpeg(path: &Path) -> Result<DynamicImage, FingerprintError> {
        let file_bytes = fs::read(path).map_err(|e| FingerprintError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(&file_bytes, options);

        let pixels = decoder.decode().map_err(|e| FingerprintError::Decode {
            path: path.to_path_buf(),
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| FingerprintError::Decode {
            path: path.to_path_buf(),
            reason: "Failed to get image info".to_string(),
        })?;

        let width = info.width as u32;
        let height = info.height as u32;
        let buffer_error = |kind: &str| FingerprintError::Decode {
            path: path.to_path_buf(),
            reason: format!("Failed to create {} buffer", kind),
        };

        let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGB"))?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, pixels)
                    .ok_or_else(|| buffer_error("RGBA"))?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, pixels)
                    .ok_or_else(|| buffer_error("Luma"))?;
                DynamicImage::ImageLuma8(buffer)
            }
            _ => return Self::decode_fallback(path),
        };

        Ok(image)
    }

    fn decode_fallback(path: &Path) -> Result<DynamicImage, FingerprintError> {
        image::open(path).map_err(|e| match e {
            ImageError::IoError(source) => FingerprintError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => FingerprintError::Decode {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })
    }
}

fn is_jpeg(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref(),
        Some("jpg" | "jpeg")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn jpeg_detection_ignores_case() {
        assert!(is_jpeg(Path::new("cover_thumb.jpg")));
        assert!(is_jpeg(Path::new("cover_thumb.JPEG")));
        assert!(!is_jpeg(Path::new("cover_thumb.png")));
        assert!(!is_jpeg(Path::new("no_extension")));
    }

    #[test]
    fn decodes_png_through_fallback() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.png");
        let img = ImageBuffer::from_fn(4, 3, |x, _| Luma([(x * 60) as u8]));
        img.save(&path).unwrap();

        let decoded = FastDecoder::decode(&path).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 3);
    }

    #[test]
    fn decodes_jpeg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.jpg");
        let img = ImageBuffer::from_fn(16, 8, |x, y| Rgb([(x * 10) as u8, (y * 20) as u8, 90]));
        img.save(&path).unwrap();

        let decoded = FastDecoder::decode(&path).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 8);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FastDecoder::decode(Path::new("/nonexistent/thumb.png")).unwrap_err();
        assert!(matches!(err, FingerprintError::Io { .. }));
    }

    #[test]
    fn garbage_file_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.png");
        fs::write(&path, b"this is not an image").unwrap();

        let err = FastDecoder::decode(&path).unwrap_err();
        assert!(matches!(err, FingerprintError::Decode { .. }));
    }
}
