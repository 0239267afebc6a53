//! Duplicate pair records and exact-fingerprint groups.
//!
//! Both are owned state of a single scan: created empty, grown in scan order,
//! never shrunk.

use super::MatchType;
use crate::core::fingerprint::Fingerprint;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

/// Order-independent identifier for a pair of fingerprints.
///
/// SHA-256 over the two hex renderings, smaller fingerprint first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PairKey(String);

impl PairKey {
    pub fn new(a: &Fingerprint, b: &Fingerprint) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let digest = Sha256::digest(format!("{}:{}", low.to_hex(), high.to_hex()).as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two fingerprints found to be near-duplicates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicatePairRecord {
    /// Canonical key of the pair
    pub key: PairKey,
    /// The fingerprint that was already in the candidate index
    pub anchor: Fingerprint,
    /// The fingerprint of the image that found the anchor
    pub newcomer: Fingerprint,
    /// Hamming distance between the two
    pub distance: u32,
    /// Classification of the match
    pub match_type: MatchType,
}

/// Canonical set of pair records plus fingerprints shared by several images
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateRegistry {
    records: Vec<DuplicatePairRecord>,
    by_key: HashMap<PairKey, usize>,
    collisions: Vec<Fingerprint>,
    collision_set: HashSet<Fingerprint>,
}

impl DuplicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a near-duplicate pair unless its canonical key is already present.
    ///
    /// Returns `true` when a new record was stored.
    pub fn register(
        &mut self,
        anchor: &Fingerprint,
        newcomer: &Fingerprint,
        distance: u32,
        match_type: MatchType,
    ) -> bool {
        let key = PairKey::new(anchor, newcomer);
        if self.by_key.contains_key(&key) {
            return false;
        }

        self.by_key.insert(key.clone(), self.records.len());
        self.records.push(DuplicatePairRecord {
            key,
            anchor: anchor.clone(),
            newcomer: newcomer.clone(),
            distance,
            match_type,
        });
        true
    }

    /// Remember that more than one image produced `fingerprint`.
    ///
    /// Returns `true` the first time a fingerprint is recorded.
    pub fn record_collision(&mut self, fingerprint: &Fingerprint) -> bool {
        if !self.collision_set.insert(fingerprint.clone()) {
            return false;
        }
        self.collisions.push(fingerprint.clone());
        true
    }

    pub fn contains(&self, key: &PairKey) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn get(&self, key: &PairKey) -> Option<&DuplicatePairRecord> {
        self.by_key.get(key).map(|&i| &self.records[i])
    }

    /// Pair records in registration order
    pub fn records(&self) -> &[DuplicatePairRecord] {
        &self.records
    }

    /// Fingerprints shared by two or more images, in the order they collided
    pub fn collisions(&self) -> &[Fingerprint] {
        &self.collisions
    }

    /// Number of pair records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Images grouped by exact fingerprint, each group in scan order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExactFingerprintGroups {
    groups: HashMap<Fingerprint, Vec<PathBuf>>,
}

impl ExactFingerprintGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `image` under `fingerprint`; returns the group's new size
    pub fn record(&mut self, fingerprint: &Fingerprint, image: PathBuf) -> usize {
        let group = self.groups.entry(fingerprint.clone()).or_default();
        group.push(image);
        group.len()
    }

    /// Images that produced exactly `fingerprint`; empty if none
    pub fn get(&self, fingerprint: &Fingerprint) -> &[PathBuf] {
        self.groups
            .get(fingerprint)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct fingerprints
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of images across all groups
    pub fn image_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &[PathBuf])> {
        self.groups.iter().map(|(fp, images)| (fp, images.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(value: u128) -> Fingerprint {
        Fingerprint::from_u128(value)
    }

    #[test]
    fn pair_key_is_order_independent() {
        let a = fp(0x1234);
        let b = fp(0xabcd_0000_0000_0000_0000);
        assert_eq!(PairKey::new(&a, &b), PairKey::new(&b, &a));
    }

    #[test]
    fn pair_key_differs_between_pairs() {
        assert_ne!(PairKey::new(&fp(1), &fp(2)), PairKey::new(&fp(1), &fp(3)));
    }

    #[test]
    fn pair_key_is_sha256_hex() {
        let key = PairKey::new(&fp(1), &fp(2));
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn registering_same_pair_twice_keeps_one_record() {
        let mut registry = DuplicateRegistry::new();
        assert!(registry.register(&fp(1), &fp(3), 1, MatchType::NearExact));
        assert!(!registry.register(&fp(3), &fp(1), 1, MatchType::NearExact));
        assert!(!registry.register(&fp(1), &fp(3), 1, MatchType::NearExact));

        assert_eq!(registry.len(), 1);
        let key = PairKey::new(&fp(1), &fp(3));
        assert!(registry.contains(&key));
        assert_eq!(registry.get(&key).unwrap().anchor, fp(1));
    }

    #[test]
    fn records_keep_registration_order() {
        let mut registry = DuplicateRegistry::new();
        registry.register(&fp(9), &fp(8), 2, MatchType::NearExact);
        registry.register(&fp(1), &fp(0), 1, MatchType::NearExact);

        let anchors: Vec<_> = registry.records().iter().map(|r| r.anchor.clone()).collect();
        assert_eq!(anchors, vec![fp(9), fp(1)]);
    }

    #[test]
    fn collisions_are_recorded_once() {
        let mut registry = DuplicateRegistry::new();
        assert!(registry.record_collision(&fp(5)));
        assert!(!registry.record_collision(&fp(5)));
        assert_eq!(registry.collisions(), &[fp(5)]);
        assert!(registry.is_empty());
    }

    #[test]
    fn exact_groups_grow_in_scan_order() {
        let mut groups = ExactFingerprintGroups::new();
        assert_eq!(groups.record(&fp(1), PathBuf::from("a.jpg")), 1);
        assert_eq!(groups.record(&fp(1), PathBuf::from("b.jpg")), 2);
        groups.record(&fp(2), PathBuf::from("c.jpg"));

        assert_eq!(
            groups.get(&fp(1)),
            &[PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]
        );
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.image_count(), 3);
        assert!(groups.get(&fp(99)).is_empty());
    }
}
