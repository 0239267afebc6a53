//! Row/column difference hash (dHash).
//!
//! dHash works by:
//! 1. Resizing the image to (size+1) x (size+1) grayscale
//! 2. Row bits: is each pixel darker than its right-hand neighbour?
//! 3. Column bits: is each pixel darker than the one below it?
//!
//! The two `size²`-bit halves are combined as `row << size² | col`.

use super::fast_decode::FastDecoder;
use super::fast_resize::FastResizer;
use super::traits::{Fingerprint, FingerprintSource};
use crate::error::FingerprintError;
use image::DynamicImage;
use std::path::Path;

/// Difference-hash fingerprint source
#[derive(Debug, Clone)]
pub struct DhashSource {
    /// Row/column dimension of the comparison grid
    size: u32,
}

impl DhashSource {
    /// Create a dHash source producing `2 × size²`-bit fingerprints
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    /// Compute the row and column gradient bits of an already-loaded image
    pub fn row_col(&self, image: &DynamicImage) -> Result<(Vec<bool>, Vec<bool>), FingerprintError> {
        Fingerprint::validate_size(self.size)
            .map_err(|_| FingerprintError::InvalidSize { size: self.size })?;
        let grid = self.size + 1;
        let gray = FastResizer::new().resize_to_grayscale(image, grid, grid)?;

        let cells = (self.size * self.size) as usize;
        let mut row = Vec::with_capacity(cells);
        let mut col = Vec::with_capacity(cells);

        for y in 0..self.size {
            for x in 0..self.size {
                let pixel = gray.get_pixel(x, y)[0];
                row.push(pixel < gray.get_pixel(x + 1, y)[0]);
                col.push(pixel < gray.get_pixel(x, y + 1)[0]);
            }
        }

        Ok((row, col))
    }

    /// Fingerprint an already-loaded image
    pub fn fingerprint_image(&self, image: &DynamicImage) -> Result<Fingerprint, FingerprintError> {
        let (row, col) = self.row_col(image)?;
        Fingerprint::from_row_col(self.size, &row, &col)
            .map_err(|_| FingerprintError::InvalidSize { size: self.size })
    }
}

impl Default for DhashSource {
    fn default() -> Self {
        Self::new(8)
    }
}

impl FingerprintSource for DhashSource {
    fn compute(&self, path: &Path) -> Result<Fingerprint, FingerprintError> {
        let image = FastDecoder::decode(path)?;
        self.fingerprint_image(&image)
    }

    fn size(&self) -> u32 {
        self.size
    }
}
