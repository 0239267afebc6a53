//! Trait definitions for comparison strategies.

use super::MatchType;
use crate::error::CompareError;

/// Default Hamming-distance cutoff used by the scan
pub const DEFAULT_THRESHOLD: u32 = 8;

/// Strategy trait for deciding whether two fingerprints are duplicates
pub trait ComparisonStrategy: Send + Sync {
    /// Determine if two fingerprints should be considered duplicates based on distance
    fn is_duplicate(&self, distance: u32) -> bool;

    /// Classify the match type based on distance
    fn classify(&self, distance: u32) -> MatchType;

    /// Get the threshold used
    fn threshold(&self) -> u32;

    /// Human-readable description of the strategy
    fn description(&self) -> String;
}

/// Inclusive Hamming-distance cutoff
#[derive(Debug, Clone)]
pub struct ThresholdStrategy {
    threshold: u32,
}

impl ThresholdStrategy {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Create a strategy, rejecting thresholds wider than the fingerprint
    pub fn for_width(threshold: u32, bit_width: usize) -> Result<Self, CompareError> {
        let max = u32::try_from(bit_width).unwrap_or(u32::MAX);
        if threshold > max {
            return Err(CompareError::InvalidThreshold {
                value: threshold,
                max,
            });
        }
        Ok(Self::new(threshold))
    }
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl ComparisonStrategy for ThresholdStrategy {
    fn is_duplicate(&self, distance: u32) -> bool {
        distance <= self.threshold
    }

    fn classify(&self, distance: u32) -> MatchType {
        MatchType::from_distance(distance)
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }

    fn description(&self) -> String {
        format!(
            "Threshold strategy: fingerprints within {} differing bits are duplicates",
            self.threshold
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        let strategy = ThresholdStrategy::new(8);

        assert!(strategy.is_duplicate(7));
        assert!(strategy.is_duplicate(8));
        assert!(!strategy.is_duplicate(9));
    }

    #[test]
    fn zero_threshold_only_accepts_identical() {
        let strategy = ThresholdStrategy::new(0);
        assert!(strategy.is_duplicate(0));
        assert!(!strategy.is_duplicate(1));
    }

    #[test]
    fn default_threshold_is_eight() {
        assert_eq!(ThresholdStrategy::default().threshold(), 8);
    }

    #[test]
    fn for_width_rejects_oversized_threshold() {
        assert!(ThresholdStrategy::for_width(128, 128).is_ok());
        let err = ThresholdStrategy::for_width(129, 128).unwrap_err();
        assert_eq!(err, CompareError::InvalidThreshold { value: 129, max: 128 });
    }

    #[test]
    fn for_width_does_not_truncate_wide_fingerprints() {
        // Wider than any u32 on 64-bit targets
        let width = usize::MAX;
        assert!(ThresholdStrategy::for_width(8, width).is_ok());
        assert!(ThresholdStrategy::for_width(u32::MAX, width).is_ok());
    }

    #[test]
    fn description_includes_threshold() {
        assert!(ThresholdStrategy::new(7).description().contains('7'));
    }
}
