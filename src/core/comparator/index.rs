//! # Candidate Index
//!
//! Band-bucketed lookup of previously seen fingerprints.
//!
//! ## How It Works
//! 1. Cut each fingerprint into fixed bands (8 bands of 16 bits for size 8)
//! 2. File the fingerprint under every one of its band keys
//! 3. A later fingerprint only compares against what shares one of its bands
//!
//! ## Trade-offs
//! Bands do not overlap, so two fingerprints are only ever compared when they
//! agree exactly on at least one whole band. Near-duplicates whose differing
//! bits are spread over every band are not found. This is a recall limit of
//! the bucketing scheme, not a bug.

use super::bands::BandKey;
use crate::core::fingerprint::Fingerprint;
use std::collections::HashMap;

/// Map from band key to the fingerprints inserted under it, in insertion order.
///
/// Built once per scan and discarded; there is no removal.
#[derive(Debug, Default)]
pub struct CandidateIndex {
    buckets: HashMap<BandKey, Vec<Fingerprint>>,
    anchors: usize,
}

impl CandidateIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `fingerprint` to the bucket for `band`, creating it if absent.
    ///
    /// Entries are not deduplicated.
    pub fn insert(&mut self, band: BandKey, fingerprint: Fingerprint) {
        self.buckets.entry(band).or_default().push(fingerprint);
    }

    /// File `fingerprint` under each of its bands as a new anchor
    pub fn insert_anchor(&mut self, bands: &[BandKey], fingerprint: &Fingerprint) {
        for band in bands {
            self.insert(*band, fingerprint.clone());
        }
        self.anchors += 1;
    }

    /// Fingerprints previously inserted under `band`; empty for an unseen band
    pub fn lookup(&self, band: &BandKey) -> &[Fingerprint] {
        self.buckets.get(band).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of non-empty buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of fingerprints inserted as anchors
    pub fn anchor_count(&self) -> usize {
        self.anchors
    }

    /// Get statistics about the index
    pub fn stats(&self) -> CandidateIndexStats {
        let total_buckets = self.buckets.len();
        let total_entries: usize = self.buckets.values().map(Vec::len).sum();
        let max_bucket_size = self.buckets.values().map(Vec::len).max().unwrap_or(0);
        let avg_bucket_size = if total_buckets > 0 {
            total_entries as f64 / total_buckets as f64
        } else {
            0.0
        };

        CandidateIndexStats {
            anchors: self.anchors,
            total_buckets,
            total_entries,
            max_bucket_size,
            avg_bucket_size,
        }
    }
}

/// Statistics about the candidate index
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CandidateIndexStats {
    /// Fingerprints inserted as anchors
    pub anchors: usize,
    /// Number of non-empty buckets
    pub total_buckets: usize,
    /// Fingerprint entries across all buckets
    pub total_entries: usize,
    /// Largest bucket
    pub max_bucket_size: usize,
    /// Average bucket size
    pub avg_bucket_size: f64,
}

impl std::fmt::Display for CandidateIndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Candidate index: {} anchors in {} buckets (largest {}, average {:.1})",
            self.anchors, self.total_buckets, self.max_bucket_size, self.avg_bucket_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(offset: usize, value: u16) -> BandKey {
        BandKey::new(offset, value)
    }

    #[test]
    fn empty_index() {
        let index = CandidateIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert!(index.lookup(&band(0, 0xbeef)).is_empty());
    }

    #[test]
    fn lookup_returns_insertion_order() {
        let mut index = CandidateIndex::new();
        index.insert(band(0, 1), Fingerprint::from_u128(10));
        index.insert(band(0, 1), Fingerprint::from_u128(20));
        index.insert(band(4, 1), Fingerprint::from_u128(30));

        assert_eq!(
            index.lookup(&band(0, 1)),
            &[Fingerprint::from_u128(10), Fingerprint::from_u128(20)]
        );
        assert_eq!(index.lookup(&band(4, 1)), &[Fingerprint::from_u128(30)]);
    }

    #[test]
    fn same_fingerprint_may_be_inserted_twice() {
        let mut index = CandidateIndex::new();
        let fp = Fingerprint::from_u128(7);
        index.insert(band(0, 7), fp.clone());
        index.insert(band(0, 7), fp.clone());

        assert_eq!(index.lookup(&band(0, 7)).len(), 2);
    }

    #[test]
    fn unseen_band_is_empty_not_error() {
        let mut index = CandidateIndex::new();
        index.insert(band(0, 1), Fingerprint::from_u128(1));
        assert!(index.lookup(&band(4, 1)).is_empty());
    }

    #[test]
    fn insert_anchor_files_under_every_band() {
        let mut index = CandidateIndex::new();
        let fp = Fingerprint::from_u128(42);
        let bands = [band(0, 0), band(4, 0), band(8, 42)];
        index.insert_anchor(&bands, &fp);

        assert_eq!(index.anchor_count(), 1);
        for b in &bands {
            assert_eq!(index.lookup(b), &[fp.clone()]);
        }
    }

    #[test]
    fn stats_report_bucket_sizes() {
        let mut index = CandidateIndex::new();
        index.insert_anchor(&[band(0, 0), band(4, 1)], &Fingerprint::from_u128(1));
        index.insert_anchor(&[band(0, 0), band(4, 2)], &Fingerprint::from_u128(2));

        let stats = index.stats();
        assert_eq!(stats.anchors, 2);
        assert_eq!(stats.total_buckets, 3);
        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.max_bucket_size, 2);
        assert!(stats.to_string().contains("2 anchors"));
    }
}
