//! Expands pair records into groups of images.
//!
//! A pair record names two fingerprints; every image that hashed to either
//! of them belongs to the group. The last image of the group becomes the
//! representative and every other image is paired with it.

use super::registry::{DuplicatePairRecord, DuplicateRegistry, ExactFingerprintGroups, PairKey};
use super::MatchType;
use crate::core::fingerprint::Fingerprint;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Where a duplicate group came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupOrigin {
    /// Two distinct fingerprints within the threshold
    NearDuplicate {
        key: PairKey,
        anchor: Fingerprint,
        newcomer: Fingerprint,
    },
    /// Several images sharing one fingerprint, with no near-duplicate partner
    ExactCollision { fingerprint: Fingerprint },
}

/// Two images to be shown side by side, lexicographically smaller path first
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComposePair {
    pub first: PathBuf,
    pub second: PathBuf,
}

impl ComposePair {
    pub fn new(a: &Path, b: &Path) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_path_buf(),
            second: second.to_path_buf(),
        }
    }
}

/// A group of images considered duplicates of one another
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub origin: GroupOrigin,
    /// Canonical representative (last image of the group)
    pub representative: PathBuf,
    /// Everything else, in group order; paired with the representative
    pub others: Vec<PathBuf>,
    /// Hamming distance behind the group (0 for exact collisions)
    pub distance: u32,
    pub match_type: MatchType,
}

impl DuplicateGroup {
    /// Number of images besides the representative
    pub fn duplicate_count(&self) -> usize {
        self.others.len()
    }

    /// All images, representative last
    pub fn images(&self) -> impl Iterator<Item = &PathBuf> {
        self.others.iter().chain(std::iter::once(&self.representative))
    }

    /// `(representative, other)` pairs in canonical naming order; an image is
    /// never paired with itself
    pub fn pairs(&self) -> Vec<ComposePair> {
        self.others
            .iter()
            .filter(|other| *other != &self.representative)
            .map(|other| ComposePair::new(&self.representative, other))
            .collect()
    }
}

/// Turns registry contents into image groups
pub struct GroupExpander<'a> {
    groups: &'a ExactFingerprintGroups,
}

impl<'a> GroupExpander<'a> {
    pub fn new(groups: &'a ExactFingerprintGroups) -> Self {
        Self { groups }
    }

    /// Expand one pair record into `(representative, others)`.
    ///
    /// The group is `images[anchor] ++ images[newcomer]`; `None` only if it
    /// holds fewer than two images.
    pub fn expand(&self, record: &DuplicatePairRecord) -> Option<DuplicateGroup> {
        let mut images: Vec<PathBuf> = self
            .groups
            .get(&record.anchor)
            .iter()
            .chain(self.groups.get(&record.newcomer))
            .cloned()
            .collect();

        let (representative, others) = split_representative(&mut images)?;
        Some(DuplicateGroup {
            origin: GroupOrigin::NearDuplicate {
                key: record.key.clone(),
                anchor: record.anchor.clone(),
                newcomer: record.newcomer.clone(),
            },
            representative,
            others,
            distance: record.distance,
            match_type: record.match_type,
        })
    }

    /// Expand a fingerprint shared by several images into a group
    pub fn expand_collision(&self, fingerprint: &Fingerprint) -> Option<DuplicateGroup> {
        let mut images = self.groups.get(fingerprint).to_vec();
        let (representative, others) = split_representative(&mut images)?;
        Some(DuplicateGroup {
            origin: GroupOrigin::ExactCollision {
                fingerprint: fingerprint.clone(),
            },
            representative,
            others,
            distance: 0,
            match_type: MatchType::Exact,
        })
    }

    /// Every group: pair records in registration order, then collisions whose
    /// fingerprint is not already part of a pair record
    pub fn expand_all(&self, registry: &DuplicateRegistry) -> Vec<DuplicateGroup> {
        let covered: HashSet<&Fingerprint> = registry
            .records()
            .iter()
            .flat_map(|r| [&r.anchor, &r.newcomer])
            .collect();

        let pair_groups = registry.records().iter().filter_map(|r| self.expand(r));
        let collision_groups = registry
            .collisions()
            .iter()
            .filter(|fp| !covered.contains(fp))
            .filter_map(|fp| self.expand_collision(fp));

        pair_groups.chain(collision_groups).collect()
    }
}

fn split_representative(images: &mut Vec<PathBuf>) -> Option<(PathBuf, Vec<PathBuf>)> {
    if images.len() < 2 {
        return None;
    }
    let representative = images.pop()?;
    Some((representative, std::mem::take(images)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(value: u128) -> Fingerprint {
        Fingerprint::from_u128(value)
    }

    fn path(name: &str) -> PathBuf {
        PathBuf::from(name)
    }

    #[test]
    fn representative_is_last_of_newcomer_side() {
        let mut groups = ExactFingerprintGroups::new();
        groups.record(&fp(0), path("a.jpg"));
        groups.record(&fp(0), path("b.jpg"));
        groups.record(&fp(7), path("c.jpg"));

        let mut registry = DuplicateRegistry::new();
        registry.register(&fp(0), &fp(7), 3, MatchType::NearExact);

        let group = GroupExpander::new(&groups)
            .expand(&registry.records()[0])
            .unwrap();
        assert_eq!(group.representative, path("c.jpg"));
        assert_eq!(group.others, vec![path("a.jpg"), path("b.jpg")]);
        assert_eq!(group.duplicate_count(), 2);
    }

    #[test]
    fn representative_is_not_paired_with_itself() {
        let group = DuplicateGroup {
            origin: GroupOrigin::ExactCollision { fingerprint: fp(1) },
            representative: path("x.jpg"),
            others: vec![path("x.jpg"), path("y.jpg")],
            distance: 0,
            match_type: MatchType::Exact,
        };

        let pairs = group.pairs();
        assert_eq!(pairs, vec![ComposePair { first: path("x.jpg"), second: path("y.jpg") }]);
    }

    #[test]
    fn pairs_use_canonical_order() {
        let group = DuplicateGroup {
            origin: GroupOrigin::ExactCollision { fingerprint: fp(1) },
            representative: path("m.jpg"),
            others: vec![path("z.jpg"), path("a.jpg")],
            distance: 0,
            match_type: MatchType::Exact,
        };

        let pairs = group.pairs();
        assert_eq!(pairs[0], ComposePair { first: path("m.jpg"), second: path("z.jpg") });
        assert_eq!(pairs[1], ComposePair { first: path("a.jpg"), second: path("m.jpg") });
    }

    #[test]
    fn images_lists_representative_last() {
        let group = DuplicateGroup {
            origin: GroupOrigin::ExactCollision { fingerprint: fp(1) },
            representative: path("b.jpg"),
            others: vec![path("a.jpg")],
            distance: 0,
            match_type: MatchType::Exact,
        };
        let images: Vec<_> = group.images().cloned().collect();
        assert_eq!(images, vec![path("a.jpg"), path("b.jpg")]);
    }

    #[test]
    fn uncovered_collision_becomes_its_own_group() {
        let mut groups = ExactFingerprintGroups::new();
        groups.record(&fp(4), path("x.jpg"));
        groups.record(&fp(4), path("y.jpg"));

        let mut registry = DuplicateRegistry::new();
        registry.record_collision(&fp(4));

        let expanded = GroupExpander::new(&groups).expand_all(&registry);
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].representative, path("y.jpg"));
        assert_eq!(expanded[0].others, vec![path("x.jpg")]);
        assert_eq!(expanded[0].match_type, MatchType::Exact);
    }

    #[test]
    fn collision_covered_by_pair_is_not_repeated() {
        let mut groups = ExactFingerprintGroups::new();
        groups.record(&fp(0), path("a.jpg"));
        groups.record(&fp(0), path("b.jpg"));
        groups.record(&fp(3), path("c.jpg"));

        let mut registry = DuplicateRegistry::new();
        registry.record_collision(&fp(0));
        registry.register(&fp(0), &fp(3), 2, MatchType::NearExact);

        let expanded = GroupExpander::new(&groups).expand_all(&registry);
        assert_eq!(expanded.len(), 1);
        assert!(matches!(expanded[0].origin, GroupOrigin::NearDuplicate { .. }));
    }

    #[test]
    fn empty_registry_expands_to_nothing() {
        let groups = ExactFingerprintGroups::new();
        assert!(GroupExpander::new(&groups)
            .expand_all(&DuplicateRegistry::new())
            .is_empty());
    }
}
