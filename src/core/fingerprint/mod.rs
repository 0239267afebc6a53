//! # Fingerprint Module
//!
//! Compact perceptual fingerprints for images.
//!
//! ## Layout
//! A fingerprint of size `n` holds two `n²`-bit halves, a row gradient and a
//! column gradient, combined into one `2n²`-bit value. Its hexadecimal
//! rendering is always `n²/2` digits long (32 digits for the default size 8).
//!
//! ## Performance Optimizations
//! - Uses `zune-jpeg` for 1.5-2x faster JPEG decoding
//! - Uses `fast_image_resize` for 5-14x faster SIMD-accelerated resizing
//!
//! ## Example
//! ```rust,ignore
//! use similar_images::core::fingerprint::{DhashSource, FingerprintSource};
//!
//! let source = DhashSource::new(8);
//! let fingerprint = source.compute(&path)?;
//! println!("{}", fingerprint.to_hex());
//! ```

mod dhash;
pub mod fast_decode;
pub mod fast_resize;
mod traits;

pub use dhash::DhashSource;
pub use traits::{Fingerprint, FingerprintSource, MAX_SIZE};
