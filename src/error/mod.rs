//! # Error Module
//!
//! Error types for the near-duplicate image finder.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Fatal vs. skipped** - only configuration and enumeration problems abort
//!   a run; a bad image is counted and skipped

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum SimilarImagesError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Composition error: {0}")]
    Compose(#[from] ComposeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to write results: {0}")]
    Output(String),
}

/// Errors that occur while enumerating images
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid file name pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Errors from computing a fingerprint for a single image.
///
/// Never fatal to a run: the image is skipped and reported.
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Failed to resize image: {0}")]
    Resize(String),

    #[error("Unsupported fingerprint size {size} (must be a positive multiple of 4)")]
    InvalidSize { size: u32 },

    #[error("Failed to open image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while matching fingerprints
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error("Invalid fingerprint: {reason}")]
    InvalidFingerprint { reason: String },

    #[error("Invalid threshold: {value} (must be 0-{max})")]
    InvalidThreshold { value: u32, max: u32 },
}

/// Errors that occur while writing a side-by-side artifact
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Failed to open {path} for composition: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("Failed to write composed image {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, SimilarImagesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/assets/thumbs"),
        };
        assert!(error.to_string().contains("/assets/thumbs"));
    }

    #[test]
    fn fingerprint_error_includes_path_and_reason() {
        let error = FingerprintError::Decode {
            path: PathBuf::from("/assets/broken_thumb.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/assets/broken_thumb.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn invalid_fingerprint_converts_to_top_level() {
        let error: SimilarImagesError = CompareError::InvalidFingerprint {
            reason: "expected 32 hex digits, got 31".to_string(),
        }
        .into();
        assert!(matches!(error, SimilarImagesError::Compare(_)));
        assert!(error.to_string().contains("32 hex digits"));
    }

    #[test]
    fn invalid_threshold_reports_range() {
        let error = CompareError::InvalidThreshold { value: 200, max: 128 };
        assert!(error.to_string().contains("0-128"));
    }
}
