//! # Similar Images
//!
//! Finds visually near-duplicate images in a directory tree.
//!
//! Each image gets a perceptual fingerprint. Fingerprints are cut into bands
//! and filed in a band-keyed index, so an image is only compared against
//! earlier images that agree with it on at least one whole band. Matches
//! within a Hamming-distance threshold become canonical pair records, which
//! are expanded into groups of images with one representative each.
//!
//! ## Architecture
//! The library is split into a core engine and presentation layers:
//! - `core` - The near-duplicate detection engine
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, SimilarImagesError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
