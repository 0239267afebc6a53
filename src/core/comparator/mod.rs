//! # Comparator Module
//!
//! Finds near-duplicates without comparing every pair of fingerprints.
//!
//! ## How It Works
//! 1. Cut each fingerprint into band keys (`bands`)
//! 2. Look up earlier fingerprints sharing a band (`index`)
//! 3. Compare candidates by Hamming distance (`SimilarityMatcher`)
//! 4. Record canonical pairs and exact collisions (`registry`)
//! 5. Expand pairs into image groups (`grouper`)
//!
//! ## Comparison Thresholds
//! | Distance | Classification |
//! |----------|---------------|
//! | 0        | Exact match   |
//! | 1-4      | Near-exact    |
//! | 5-10     | Similar       |
//! | 11+      | Different     |

mod bands;
mod grouper;
mod index;
mod registry;
mod traits;

pub use bands::{BandKey, BandKeyGenerator, BAND_HEX_DIGITS};
pub use grouper::{ComposePair, DuplicateGroup, GroupExpander, GroupOrigin};
pub use index::{CandidateIndex, CandidateIndexStats};
pub use registry::{DuplicatePairRecord, DuplicateRegistry, ExactFingerprintGroups, PairKey};
pub use traits::{ComparisonStrategy, ThresholdStrategy, DEFAULT_THRESHOLD};

use crate::core::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};

/// Pure Hamming-distance comparison of two fingerprints
pub struct SimilarityMatcher;

impl SimilarityMatcher {
    /// Number of differing bits between `a` and `b`
    pub fn distance(a: &Fingerprint, b: &Fingerprint) -> u32 {
        a.distance(b)
    }

    /// `true` when `a` and `b` differ in at most `threshold` bits
    pub fn is_duplicate(a: &Fingerprint, b: &Fingerprint, threshold: u32) -> bool {
        Self::distance(a, b) <= threshold
    }
}

/// Classification of match types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    /// Distance = 0, identical fingerprints
    Exact,
    /// Distance 1-4, virtually identical
    NearExact,
    /// Distance 5-10, likely duplicates
    Similar,
    /// Distance 11+, only reachable with a permissive threshold
    MaybeSimilar,
}

impl MatchType {
    /// Classify based on Hamming distance
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0 => MatchType::Exact,
            1..=4 => MatchType::NearExact,
            5..=10 => MatchType::Similar,
            _ => MatchType::MaybeSimilar,
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "Exact Match"),
            MatchType::NearExact => write!(f, "Near-Exact Match"),
            MatchType::Similar => write!(f, "Similar"),
            MatchType::MaybeSimilar => write!(f, "Possibly Similar"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(value: u128) -> Fingerprint {
        Fingerprint::from_u128(value)
    }

    #[test]
    fn distance_to_self_is_zero() {
        let a = fp(0xdead_beef_0000_1111_2222_3333_4444_5555);
        assert_eq!(SimilarityMatcher::distance(&a, &a), 0);
        assert!(SimilarityMatcher::is_duplicate(&a, &a, 0));
    }

    #[test]
    fn distance_is_symmetric() {
        let samples = [0u128, 1, 0xff, u128::MAX, 0x8000_0000_0000_0000_0000_0000_0000_0001];
        for a in samples {
            for b in samples {
                assert_eq!(
                    SimilarityMatcher::distance(&fp(a), &fp(b)),
                    SimilarityMatcher::distance(&fp(b), &fp(a))
                );
            }
        }
    }

    #[test]
    fn distance_spans_both_halves() {
        assert_eq!(SimilarityMatcher::distance(&fp(0), &fp(u128::MAX)), 128);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let a = fp(0);
        let at_threshold = fp(0xff); // 8 bits
        let past_threshold = fp(0x1ff); // 9 bits

        assert!(SimilarityMatcher::is_duplicate(&a, &at_threshold, 8));
        assert!(!SimilarityMatcher::is_duplicate(&a, &past_threshold, 8));
    }

    #[test]
    fn match_type_from_distance() {
        assert_eq!(MatchType::from_distance(0), MatchType::Exact);
        assert_eq!(MatchType::from_distance(3), MatchType::NearExact);
        assert_eq!(MatchType::from_distance(7), MatchType::Similar);
        assert_eq!(MatchType::from_distance(15), MatchType::MaybeSimilar);
    }
}
