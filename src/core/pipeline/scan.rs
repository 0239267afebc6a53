//! Sequential scan/match pass over fingerprinted images.
//!
//! For each image, in enumeration order:
//! 1. Skip it if its fingerprint could not be computed or is malformed;
//!    bands are derived here, before recording, so a malformed fingerprint
//!    never appears in an exact group
//! 2. Record it under its exact fingerprint
//! 3. Walk its bands in order, and each band's candidates in insertion order,
//!    stopping at the first candidate within the threshold
//! 4. Register `(candidate, current)` unless the candidate is the same
//!    fingerprint
//! 5. Only if nothing matched, file the fingerprint in the index as an anchor
//!
//! Step 5 keeps the index small but means a later image only finds an
//! earlier one if that earlier one was an anchor. A chain `A ~ B ~ C` where
//! `C` is too far from `A` is not linked, since `B` never entered the index.

use crate::core::comparator::{
    BandKey, BandKeyGenerator, CandidateIndex, ComparisonStrategy, DuplicateRegistry,
    ExactFingerprintGroups, PairKey, ThresholdStrategy, DEFAULT_THRESHOLD,
};
use crate::core::fingerprint::{Fingerprint, FingerprintSource};
use crate::error::{FingerprintError, SimilarImagesError};
use crate::events::{null_sender, Event, EventSender, MatchEvent, MatchProgress, ProgressThrottle};
use serde::Serialize;
use std::path::PathBuf;

/// Fingerprint size and threshold for a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchConfig {
    /// Row/column dimension of fingerprints
    pub size: u32,
    /// Maximum Hamming distance still considered a duplicate
    pub threshold: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            size: 8,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl MatchConfig {
    /// Reject sizes that do not split into whole bands and thresholds wider
    /// than the fingerprint
    pub fn validate(&self) -> Result<(), SimilarImagesError> {
        Fingerprint::validate_size(self.size)
            .map_err(|e| SimilarImagesError::Config(e.to_string()))?;
        ThresholdStrategy::for_width(self.threshold, Fingerprint::bit_width(self.size))
            .map_err(|e| SimilarImagesError::Config(e.to_string()))?;
        Ok(())
    }
}

/// An image left out of matching, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

/// What happened to one image during the scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// No candidate matched; the fingerprint became an anchor
    Anchored,
    /// Matched an earlier fingerprint within the threshold
    Matched {
        candidate: Fingerprint,
        distance: u32,
        /// `false` when the pair was already registered
        registered: bool,
    },
    /// An identical fingerprint is already an anchor
    Identical,
    /// Excluded from matching
    Skipped,
}

/// Owned state of one scan; start from `ScanState::new()` and feed images
/// through [`ScanMatcher::process`]
#[derive(Debug, Default)]
pub struct ScanState {
    pub index: CandidateIndex,
    pub registry: DuplicateRegistry,
    pub exact_groups: ExactFingerprintGroups,
    pub skipped: Vec<SkippedImage>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of images that made it into the exact groups
    pub fn scanned(&self) -> usize {
        self.exact_groups.image_count()
    }
}

/// Runs the scan/match algorithm with a fixed size and threshold
#[derive(Debug, Clone)]
pub struct ScanMatcher {
    bands: BandKeyGenerator,
    strategy: ThresholdStrategy,
}

impl ScanMatcher {
    pub fn new(config: MatchConfig) -> Result<Self, SimilarImagesError> {
        config.validate()?;
        Ok(Self {
            bands: BandKeyGenerator::new(config.size)?,
            strategy: ThresholdStrategy::new(config.threshold),
        })
    }

    pub fn threshold(&self) -> u32 {
        self.strategy.threshold()
    }

    /// Scan images whose fingerprints were computed beforehand, in the given order
    pub fn scan<I>(&self, images: I) -> ScanState
    where
        I: IntoIterator<Item = (PathBuf, Result<Fingerprint, FingerprintError>)>,
    {
        self.scan_with_events(images, &null_sender())
    }

    /// Fingerprint and scan images one at a time
    pub fn scan_paths(&self, source: &dyn FingerprintSource, paths: &[PathBuf]) -> ScanState {
        self.scan(paths.iter().map(|p| (p.clone(), source.compute(p))))
    }

    /// Scan with progress reporting via events
    pub fn scan_with_events<I>(&self, images: I, events: &EventSender) -> ScanState
    where
        I: IntoIterator<Item = (PathBuf, Result<Fingerprint, FingerprintError>)>,
    {
        let images: Vec<_> = images.into_iter().collect();
        let total_images = images.len();
        let mut state = ScanState::new();
        let mut throttle = ProgressThrottle::new(total_images);

        events.send(Event::Match(MatchEvent::Started { total_images }));

        for (processed, (path, fingerprint)) in images.into_iter().enumerate() {
            let outcome = match fingerprint {
                Ok(fingerprint) => self.process(&mut state, path.clone(), fingerprint),
                Err(e) => {
                    skip(&mut state, path.clone(), e.to_string());
                    ImageOutcome::Skipped
                }
            };

            match &outcome {
                ImageOutcome::Skipped => {
                    if let Some(skipped) = state.skipped.last() {
                        events.send(Event::Match(MatchEvent::Skipped {
                            path: skipped.path.clone(),
                            message: skipped.reason.clone(),
                        }));
                    }
                }
                ImageOutcome::Matched {
                    distance,
                    registered: true,
                    ..
                } => {
                    if let Some(record) = state.registry.records().last() {
                        events.send(Event::Match(MatchEvent::PairFound {
                            path: path.clone(),
                            pair_key: record.key.to_string(),
                            distance: *distance,
                        }));
                    }
                }
                _ => {}
            }

            if throttle.should_emit(processed + 1) {
                events.send(Event::Match(MatchEvent::Progress(MatchProgress {
                    images_processed: processed + 1,
                    total_images,
                    pairs_found: state.registry.len(),
                })));
            }
        }

        tracing::info!(
            images = total_images,
            pairs = state.registry.len(),
            collisions = state.registry.collisions().len(),
            anchors = state.index.anchor_count(),
            skipped = state.skipped.len(),
            "Scan complete"
        );

        events.send(Event::Match(MatchEvent::Completed {
            pair_records: state.registry.len(),
            exact_collisions: state.registry.collisions().len(),
            anchors: state.index.anchor_count(),
        }));

        state
    }

    /// Run one image through the scan
    pub fn process(
        &self,
        state: &mut ScanState,
        path: PathBuf,
        fingerprint: Fingerprint,
    ) -> ImageOutcome {
        let bands = match self.bands.bands(&fingerprint) {
            Ok(bands) => bands,
            Err(e) => {
                skip(state, path, e.to_string());
                return ImageOutcome::Skipped;
            }
        };

        if state.exact_groups.record(&fingerprint, path.clone()) == 2 {
            state.registry.record_collision(&fingerprint);
        }

        let Some((candidate, distance)) = self.first_match(&state.index, &bands, &fingerprint)
        else {
            state.index.insert_anchor(&bands, &fingerprint);
            return ImageOutcome::Anchored;
        };

        if candidate == fingerprint {
            tracing::debug!(path = %path.display(), fingerprint = %fingerprint, "Identical to an anchor");
            return ImageOutcome::Identical;
        }

        let match_type = self.strategy.classify(distance);
        let registered = state
            .registry
            .register(&candidate, &fingerprint, distance, match_type);

        if registered {
            tracing::debug!(
                path = %path.display(),
                anchor = %candidate,
                distance,
                key = %PairKey::new(&candidate, &fingerprint),
                "Registered near-duplicate pair"
            );
        }

        ImageOutcome::Matched {
            candidate,
            distance,
            registered,
        }
    }

    /// First candidate within the threshold, bands in derivation order and
    /// candidates in insertion order. Stops at the first hit.
    fn first_match(
        &self,
        index: &CandidateIndex,
        bands: &[BandKey],
        fingerprint: &Fingerprint,
    ) -> Option<(Fingerprint, u32)> {
        for band in bands {
            for candidate in index.lookup(band) {
                let distance = candidate.distance(fingerprint);
                if self.strategy.is_duplicate(distance) {
                    return Some((candidate.clone(), distance));
                }
            }
        }
        None
    }
}

fn skip(state: &mut ScanState, path: PathBuf, reason: String) {
    tracing::warn!(path = %path.display(), "Skipping image: {}", reason);
    state.skipped.push(SkippedImage { path, reason });
}
