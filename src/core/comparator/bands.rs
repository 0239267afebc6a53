//! Band keys: fixed-width slices of a fingerprint's hex rendering.
//!
//! A fingerprint rendered as 32 hex digits yields 8 bands of 4 digits
//! (16 bits) each. Two fingerprints land in the same bucket when they agree
//! exactly on at least one whole band.

use crate::core::fingerprint::Fingerprint;
use crate::error::CompareError;
use serde::Serialize;
use std::fmt;

/// Width of one band in hex digits
pub const BAND_HEX_DIGITS: usize = 4;

/// A band value tagged with the offset it was cut from.
///
/// The offset is part of the key, so the same digits at two different
/// offsets never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BandKey {
    offset: usize,
    value: u16,
}

impl BandKey {
    pub fn new(offset: usize, value: u16) -> Self {
        Self { offset, value }
    }

    /// Offset of the band within the hex rendering, in digits
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn value(&self) -> u16 {
        self.value
    }
}

impl fmt::Display for BandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}:{:04x}", self.offset, self.value)
    }
}

/// Derives the ordered band keys for fingerprints of one size
#[derive(Debug, Clone)]
pub struct BandKeyGenerator {
    size: u32,
    hex_width: usize,
}

impl BandKeyGenerator {
    /// Create a generator for fingerprints of the given size
    pub fn new(size: u32) -> Result<Self, CompareError> {
        Fingerprint::validate_size(size)?;
        Ok(Self {
            size,
            hex_width: Fingerprint::hex_width(size),
        })
    }

    /// Number of bands per fingerprint
    pub fn band_count(&self) -> usize {
        self.hex_width / BAND_HEX_DIGITS
    }

    /// Band keys for a fingerprint, at offsets `0, 4, 8, ...`
    pub fn bands(&self, fingerprint: &Fingerprint) -> Result<Vec<BandKey>, CompareError> {
        if fingerprint.size() != self.size {
            return Err(CompareError::InvalidFingerprint {
                reason: format!(
                    "fingerprint size {} does not match index size {}",
                    fingerprint.size(),
                    self.size
                ),
            });
        }
        self.bands_from_hex(&fingerprint.to_hex())
    }

    /// Band keys for a raw hex rendering.
    ///
    /// Fails with `InvalidFingerprint` unless `hex` has exactly the expected
    /// width and consists of hex digits.
    pub fn bands_from_hex(&self, hex: &str) -> Result<Vec<BandKey>, CompareError> {
        if hex.len() != self.hex_width {
            return Err(CompareError::InvalidFingerprint {
                reason: format!("expected {} hex digits, got {}", self.hex_width, hex.len()),
            });
        }

        (0..self.hex_width)
            .step_by(BAND_HEX_DIGITS)
            .map(|offset| {
                hex.get(offset..offset + BAND_HEX_DIGITS)
                    .and_then(|slice| u16::from_str_radix(slice, 16).ok())
                    .map(|value| BandKey::new(offset, value))
                    .ok_or_else(|| CompareError::InvalidFingerprint {
                        reason: format!("band at offset {} of '{}' is not hexadecimal", offset, hex),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_size_yields_eight_bands() {
        let generator = BandKeyGenerator::new(8).unwrap();
        let bands = generator.bands(&Fingerprint::from_u128(u128::MAX)).unwrap();

        assert_eq!(generator.band_count(), 8);
        assert_eq!(bands.len(), 8);
        let offsets: Vec<_> = bands.iter().map(|b| b.offset()).collect();
        assert_eq!(offsets, vec![0, 4, 8, 12, 16, 20, 24, 28]);
    }

    #[test]
    fn larger_sizes_scale_band_count() {
        assert_eq!(BandKeyGenerator::new(4).unwrap().band_count(), 2);
        assert_eq!(BandKeyGenerator::new(16).unwrap().band_count(), 32);
    }

    #[test]
    fn same_value_at_different_offsets_gives_distinct_keys() {
        let generator = BandKeyGenerator::new(8).unwrap();
        let bands = generator.bands(&Fingerprint::from_u128(0)).unwrap();

        let unique: std::collections::HashSet<_> = bands.iter().collect();
        assert_eq!(unique.len(), bands.len());
        assert!(bands.iter().all(|b| b.value() == 0));
    }

    #[test]
    fn differing_in_one_band_keeps_other_bands_identical() {
        let generator = BandKeyGenerator::new(8).unwrap();
        let a = Fingerprint::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
        // flip bits only inside the third band (hex digits 8..12)
        let b = Fingerprint::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210 ^ (0xf00f_u128 << 80));

        let bands_a = generator.bands(&a).unwrap();
        let bands_b = generator.bands(&b).unwrap();

        for (i, (x, y)) in bands_a.iter().zip(bands_b.iter()).enumerate() {
            if i == 2 {
                assert_ne!(x, y);
            } else {
                assert_eq!(x, y);
            }
        }
    }

    #[test]
    fn display_matches_offset_and_digits() {
        let generator = BandKeyGenerator::new(4).unwrap();
        let bands = generator.bands_from_hex("00bebeef").unwrap();

        assert_eq!(bands[0].to_string(), "0:00be");
        assert_eq!(bands[1].to_string(), "4:beef");
    }

    #[test]
    fn malformed_width_is_invalid_fingerprint() {
        let generator = BandKeyGenerator::new(8).unwrap();
        let err = generator.bands_from_hex("abc").unwrap_err();
        assert!(matches!(err, CompareError::InvalidFingerprint { .. }));
    }

    #[test]
    fn non_hex_band_is_invalid_fingerprint() {
        let generator = BandKeyGenerator::new(4).unwrap();
        assert!(generator.bands_from_hex("0000zzzz").is_err());
    }

    #[test]
    fn size_mismatch_is_invalid_fingerprint() {
        let generator = BandKeyGenerator::new(16).unwrap();
        let err = generator.bands(&Fingerprint::from_u128(1)).unwrap_err();
        assert!(matches!(err, CompareError::InvalidFingerprint { .. }));
    }

    #[test]
    fn invalid_size_is_rejected() {
        assert!(BandKeyGenerator::new(0).is_err());
        assert!(BandKeyGenerator::new(10).is_err());
    }
}
