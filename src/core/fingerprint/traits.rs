//! The fingerprint value type and the source trait that produces it.

use crate::error::{CompareError, FingerprintError};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// Number of bits per storage word
const WORD_BITS: usize = 64;

/// Largest supported row/column dimension (8192-bit fingerprints)
pub const MAX_SIZE: u32 = 64;

/// Produces a fixed-width fingerprint for an image.
///
/// Implement this trait to plug in another hashing routine (or a fake one
/// for testing). Every fingerprint returned by one source must have the
/// same [`size`](FingerprintSource::size).
pub trait FingerprintSource: Send + Sync {
    /// Compute the fingerprint for the image at `path`
    fn compute(&self, path: &Path) -> Result<Fingerprint, FingerprintError>;

    /// Fingerprint size (row/column dimension) this source produces
    fn size(&self) -> u32;
}

/// A perceptual fingerprint: the row component shifted above the column
/// component, `row << size² | col`, `2 × size²` bits wide.
///
/// Stored as big-endian 64-bit words so the derived ordering is numeric for
/// fingerprints of equal size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    size: u32,
    words: Vec<u64>,
}

impl Fingerprint {
    /// Check that `size` yields a rendering made of whole 4-digit bands and
    /// is at most [`MAX_SIZE`]
    pub fn validate_size(size: u32) -> Result<(), CompareError> {
        if size == 0 || size % 4 != 0 {
            return Err(CompareError::InvalidFingerprint {
                reason: format!("size {} is not a positive multiple of 4", size),
            });
        }
        if size > MAX_SIZE {
            return Err(CompareError::InvalidFingerprint {
                reason: format!("size {} exceeds the maximum of {}", size, MAX_SIZE),
            });
        }
        Ok(())
    }

    /// Total bits in a fingerprint of the given size; saturates instead of
    /// overflowing for sizes `validate_size` rejects
    pub fn bit_width(size: u32) -> usize {
        let size = size as usize;
        size.saturating_mul(size).saturating_mul(2)
    }

    /// Length of the hexadecimal rendering for the given size
    pub fn hex_width(size: u32) -> usize {
        Self::bit_width(size) / 4
    }

    /// Build a fingerprint from its row and column bits, most significant first
    pub fn from_row_col(size: u32, row: &[bool], col: &[bool]) -> Result<Self, CompareError> {
        Self::validate_size(size)?;
        let half = (size * size) as usize;
        if row.len() != half || col.len() != half {
            return Err(CompareError::InvalidFingerprint {
                reason: format!(
                    "expected {} row and column bits, got {} and {}",
                    half,
                    row.len(),
                    col.len()
                ),
            });
        }

        let total = 2 * half;
        let word_count = total.div_ceil(WORD_BITS);
        let padding = word_count * WORD_BITS - total;
        let mut words = vec![0u64; word_count];

        for (i, bit) in row.iter().chain(col.iter()).enumerate() {
            if *bit {
                let position = padding + i;
                words[position / WORD_BITS] |= 1u64 << (WORD_BITS - 1 - position % WORD_BITS);
            }
        }

        Ok(Self { size, words })
    }

    /// Parse a fingerprint from its fixed-length hexadecimal rendering
    pub fn from_hex(size: u32, hex: &str) -> Result<Self, CompareError> {
        Self::validate_size(size)?;
        let expected = Self::hex_width(size);
        if hex.len() != expected {
            return Err(CompareError::InvalidFingerprint {
                reason: format!("expected {} hex digits, got {}", expected, hex.len()),
            });
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CompareError::InvalidFingerprint {
                reason: format!("'{}' is not hexadecimal", hex),
            });
        }

        let word_count = (expected * 4).div_ceil(WORD_BITS);
        let padded = format!("{:0>width$}", hex, width = word_count * WORD_BITS / 4);
        let words = padded
            .as_bytes()
            .chunks(WORD_BITS / 4)
            .map(|chunk| {
                std::str::from_utf8(chunk)
                    .ok()
                    .and_then(|digits| u64::from_str_radix(digits, 16).ok())
                    .ok_or_else(|| CompareError::InvalidFingerprint {
                        reason: format!("'{}' is not hexadecimal", hex),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { size, words })
    }

    /// A 128-bit (size 8) fingerprint from its combined integer value
    pub fn from_u128(value: u128) -> Self {
        Self {
            size: 8,
            words: vec![(value >> 64) as u64, value as u64],
        }
    }

    /// Row/column dimension this fingerprint was computed with
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Total number of bits
    pub fn bit_count(&self) -> usize {
        Self::bit_width(self.size)
    }

    /// Fixed-length lowercase hexadecimal rendering, row digits first
    pub fn to_hex(&self) -> String {
        let full: String = self.words.iter().map(|w| format!("{:016x}", w)).collect();
        let skip = full.len() - Self::hex_width(self.size);
        full[skip..].to_string()
    }

    /// Number of differing bits (popcount of `self XOR other`).
    ///
    /// Both fingerprints must have the same size.
    pub fn distance(&self, other: &Self) -> u32 {
        self.words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_rendering_is_fixed_width() {
        let fp = Fingerprint::from_u128(0xbeef);
        assert_eq!(fp.to_hex().len(), 32);
        assert_eq!(fp.to_hex(), "0000000000000000000000000000beef");
    }

    #[test]
    fn hex_round_trip_for_odd_word_sizes() {
        // size 4: 32 bits, padded inside a single word
        let fp = Fingerprint::from_hex(4, "deadbeef").unwrap();
        assert_eq!(fp.to_hex(), "deadbeef");
        assert_eq!(fp.bit_count(), 32);

        // size 12: 288 bits, 72 hex digits over five words
        let hex = "f".repeat(72);
        let fp = Fingerprint::from_hex(12, &hex).unwrap();
        assert_eq!(fp.to_hex(), hex);
    }

    #[test]
    fn from_hex_accepts_uppercase_and_renders_lowercase() {
        let fp = Fingerprint::from_hex(4, "DEADBEEF").unwrap();
        assert_eq!(fp.to_hex(), "deadbeef");
    }

    #[test]
    fn from_hex_rejects_wrong_width() {
        let err = Fingerprint::from_hex(8, "abcd").unwrap_err();
        assert!(matches!(err, CompareError::InvalidFingerprint { .. }));
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        let err = Fingerprint::from_hex(4, "deadbeeg").unwrap_err();
        assert!(matches!(err, CompareError::InvalidFingerprint { .. }));
    }

    #[test]
    fn invalid_sizes_are_rejected() {
        assert!(Fingerprint::validate_size(0).is_err());
        assert!(Fingerprint::validate_size(6).is_err());
        assert!(Fingerprint::validate_size(8).is_ok());
        assert!(Fingerprint::validate_size(16).is_ok());
    }

    #[test]
    fn oversized_sizes_are_rejected() {
        assert!(Fingerprint::validate_size(MAX_SIZE).is_ok());
        assert!(Fingerprint::validate_size(MAX_SIZE + 4).is_err());
        assert!(Fingerprint::validate_size(65_536).is_err());
        assert!(Fingerprint::validate_size(4_000_000_000).is_err());
        assert!(Fingerprint::from_hex(65_536, "00").is_err());
    }

    #[test]
    fn bit_width_does_not_overflow() {
        assert_eq!(Fingerprint::bit_width(8), 128);
        assert_eq!(Fingerprint::bit_width(MAX_SIZE), 8192);
        assert!(Fingerprint::bit_width(u32::MAX) > 0);
    }

    #[test]
    fn row_component_is_shifted_above_column() {
        let mut row = vec![false; 64];
        let mut col = vec![false; 64];
        row[63] = true; // least significant row bit
        col[0] = true; // most significant column bit

        let fp = Fingerprint::from_row_col(8, &row, &col).unwrap();
        assert_eq!(fp, Fingerprint::from_u128((1u128 << 64) | (1u128 << 63)));
    }

    #[test]
    fn from_row_col_rejects_wrong_bit_count() {
        let err = Fingerprint::from_row_col(8, &[true; 10], &[true; 64]).unwrap_err();
        assert!(matches!(err, CompareError::InvalidFingerprint { .. }));
    }

    #[test]
    fn distance_counts_differing_bits() {
        let a = Fingerprint::from_u128(0);
        let b = Fingerprint::from_u128(0b1011 | (1u128 << 127));
        assert_eq!(a.distance(&b), 4);
    }

    #[test]
    fn ordering_is_numeric() {
        let small = Fingerprint::from_u128(u64::MAX as u128);
        let large = Fingerprint::from_u128(1u128 << 64);
        assert!(small < large);
    }

    #[test]
    fn serializes_as_hex_string() {
        let fp = Fingerprint::from_hex(4, "0000abcd").unwrap();
        assert_eq!(serde_json::to_string(&fp).unwrap(), "\"0000abcd\"");
    }
}
