//! # Compose Module
//!
//! Writes a side-by-side JPEG for each `(representative, other)` pair so a
//! person can eyeball what the matcher decided.
//!
//! ## Naming
//! Output files are named `{stem1}-{stem2}.jpg` with the lexicographically
//! smaller path first, so re-running a scan overwrites the same files
//! instead of creating mirrored copies.

use crate::core::comparator::ComposePair;
use crate::core::fingerprint::fast_decode::FastDecoder;
use crate::error::ComposeError;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

/// JPEG quality for composed images
const JPEG_QUALITY: u8 = 90;

/// Consumes duplicate pairs and persists something for each
pub trait CompositionSink: Send + Sync {
    /// Compose one pair, returning where the artifact was written
    fn compose(&self, pair: &ComposePair) -> Result<PathBuf, ComposeError>;
}

/// Canonical artifact name for a pair: `{stem1}-{stem2}.jpg`
pub fn artifact_name(pair: &ComposePair) -> String {
    format!("{}-{}.jpg", file_stem(&pair.first), file_stem(&pair.second))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Pastes both images onto one canvas, left to right, top-aligned
pub struct SideBySideComposer {
    output_dir: PathBuf,
}

impl SideBySideComposer {
    /// Create a composer writing into `output_dir`, creating it if needed
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, ComposeError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| ComposeError::OutputDirectory {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn open(path: &Path) -> Result<RgbImage, ComposeError> {
        FastDecoder::decode(path)
            .map(|image| image.to_rgb8())
            .map_err(|e| ComposeError::Open {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Build the combined canvas; unused area stays black
    pub fn combine(left: &RgbImage, right: &RgbImage) -> RgbImage {
        let width = left.width() + right.width();
        let height = left.height().max(right.height());

        let mut canvas = RgbImage::new(width, height);
        imageops::replace(&mut canvas, left, 0, 0);
        imageops::replace(&mut canvas, right, left.width() as i64, 0);
        canvas
    }
}

impl CompositionSink for SideBySideComposer {
    fn compose(&self, pair: &ComposePair) -> Result<PathBuf, ComposeError> {
        let left = Self::open(&pair.first)?;
        let right = Self::open(&pair.second)?;
        let canvas = Self::combine(&left, &right);

        let output = self.output_dir.join(artifact_name(pair));
        let write_error = |reason: String| ComposeError::Write {
            path: output.clone(),
            reason,
        };

        let mut file = fs::File::create(&output).map_err(|e| write_error(e.to_string()))?;
        let encoder = JpegEncoder::new_with_quality(&mut file, JPEG_QUALITY);
        canvas
            .write_with_encoder(encoder)
            .map_err(|e| write_error(e.to_string()))?;

        tracing::debug!(output = %output.display(), "Wrote side-by-side image");
        Ok(output)
    }
}
