//! # Core Module
//!
//! The near-duplicate detection engine, independent of any front end.
//!
//! ## Modules
//! - `scanner` - Enumerates images in directories
//! - `fingerprint` - Computes row/column difference hashes
//! - `comparator` - Band index, Hamming matching, pair registry, grouping
//! - `pipeline` - Orchestrates the full workflow
//! - `compose` - Writes side-by-side images for each duplicate pair

pub mod comparator;
pub mod compose;
pub mod fingerprint;
pub mod pipeline;
pub mod scanner;

// Re-export commonly used types
pub use comparator::{DuplicateGroup, MatchType};
pub use fingerprint::{Fingerprint, FingerprintSource};
pub use scanner::ImageFile;
