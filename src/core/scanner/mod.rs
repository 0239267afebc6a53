//! # Scanner Module
//!
//! Enumerates image files under one or more directories.
//!
//! Matching is order-sensitive (the first fingerprint seen for a band
//! becomes its anchor), so enumeration order is stable: roots in the order
//! given, and entries sorted by file name within each directory.
//!
//! ## Example
//! ```rust,ignore
//! use similar_images::core::scanner::{ImageEnumerator, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default())?;
//! let result = scanner.enumerate(&["./cm-assets".into()])?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A discovered image file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Path to the image; also its identity throughout the scan
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Detected image format
    pub format: ImageFormat,
}

/// Recognised image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
    Bmp,
    Tiff,
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "webp" => ImageFormat::WebP,
            "gif" => ImageFormat::Gif,
            "bmp" => ImageFormat::Bmp,
            "tiff" | "tif" => ImageFormat::Tiff,
            _ => ImageFormat::Unknown,
        }
    }
}

/// Result of an enumeration
#[derive(Debug)]
pub struct ScanResult {
    /// Images in enumeration order
    pub images: Vec<ImageFile>,
    /// Errors that occurred during enumeration (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Produces the ordered, finite image sequence a scan consumes.
///
/// Implement this trait to feed images from somewhere other than the
/// filesystem (e.g. for testing).
pub trait ImageEnumerator: Send + Sync {
    /// Enumerate images under `paths`
    fn enumerate(&self, paths: &[PathBuf]) -> Result<ScanResult, ScanError>;

    /// Enumerate with progress reporting via events
    fn enumerate_with_events(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<ScanResult, ScanError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("jpg"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("JPEG"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("Png"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_extension("tif"), ImageFormat::Tiff);
    }

    #[test]
    fn unknown_extension_returns_unknown() {
        assert_eq!(ImageFormat::from_extension("txt"), ImageFormat::Unknown);
        assert_eq!(ImageFormat::from_extension("heic"), ImageFormat::Unknown);
    }
}
