//! Pipeline execution implementation.

use super::scan::{MatchConfig, ScanMatcher, SkippedImage};
use crate::core::comparator::{CandidateIndexStats, ComposePair, DuplicateGroup, GroupExpander};
use crate::core::compose::CompositionSink;
use crate::core::fingerprint::{DhashSource, Fingerprint, FingerprintSource};
use crate::core::scanner::{ImageEnumerator, ScanConfig, WalkDirScanner};
use crate::error::{FingerprintError, SimilarImagesError};
use crate::events::{
    null_sender, ComposeEvent, Event, EventSender, FingerprintEvent, FingerprintProgress,
    PipelineEvent, PipelinePhase, PipelineSummary, ProgressThrottle,
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Result of pipeline execution
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    /// Duplicate groups: near-duplicate pairs first, then exact collisions
    pub groups: Vec<DuplicateGroup>,
    /// Every `(representative, other)` pair across all groups, deduplicated
    pub pairs: Vec<ComposePair>,
    /// Images found by the enumerator
    pub total_images: usize,
    /// Images that made it through fingerprinting and matching
    pub fingerprinted: usize,
    /// Images left out, with the reason
    pub skipped: Vec<SkippedImage>,
    /// Side-by-side artifacts written
    pub composed: Vec<PathBuf>,
    /// Non-fatal enumeration and composition errors
    pub errors: Vec<String>,
    /// Shape of the candidate index at the end of the scan
    pub index_stats: CandidateIndexStats,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            total_images: self.total_images,
            skipped_images: self.skipped.len(),
            duplicate_groups: self.groups.len(),
            duplicate_pairs: self.pairs.len(),
            duration_ms: self.duration_ms,
        }
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Directories to scan
    pub paths: Vec<PathBuf>,
    /// Fingerprint size and duplicate threshold
    pub matching: MatchConfig,
    /// Scanner configuration
    pub scan_config: ScanConfig,
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    source: Option<Box<dyn FingerprintSource>>,
    composer: Option<Box<dyn CompositionSink>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            source: None,
            composer: None,
        }
    }

    /// Add directories to scan
    pub fn paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.paths = paths;
        self
    }

    /// Set the fingerprint size (row/column dimension)
    pub fn size(mut self, size: u32) -> Self {
        self.config.matching.size = size;
        self
    }

    /// Set the comparison threshold (lower = stricter)
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.config.matching.threshold = threshold;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    /// Only scan files whose name matches `pattern`
    pub fn name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.scan_config.name_pattern = Some(pattern.into());
        self
    }

    /// Use a custom fingerprint source instead of dHash
    pub fn source(mut self, source: Box<dyn FingerprintSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Write each duplicate pair through `composer`
    pub fn composer(mut self, composer: Box<dyn CompositionSink>) -> Self {
        self.composer = Some(composer);
        self
    }

    /// Validate the configuration and build the pipeline
    pub fn build(self) -> Result<Pipeline, SimilarImagesError> {
        let matcher = ScanMatcher::new(self.config.matching)?;
        let scanner = WalkDirScanner::new(self.config.scan_config.clone())?;
        let source = self
            .source
            .unwrap_or_else(|| Box::new(DhashSource::new(self.config.matching.size)));

        if source.size() != self.config.matching.size {
            return Err(SimilarImagesError::Config(format!(
                "fingerprint source produces size {} but the scan expects size {}",
                source.size(),
                self.config.matching.size
            )));
        }

        Ok(Pipeline {
            config: self.config,
            scanner,
            matcher,
            source,
            composer: self.composer,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The near-duplicate detection pipeline
pub struct Pipeline {
    config: PipelineConfig,
    scanner: WalkDirScanner,
    matcher: ScanMatcher,
    source: Box<dyn FingerprintSource>,
    composer: Option<Box<dyn CompositionSink>>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, SimilarImagesError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(
        &self,
        events: &EventSender,
    ) -> Result<PipelineResult, SimilarImagesError> {
        let start_time = Instant::now();
        let mut errors = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scan_result = self
            .scanner
            .enumerate_with_events(&self.config.paths, events)?;
        errors.extend(scan_result.errors.iter().map(ToString::to_string));

        let paths: Vec<PathBuf> = scan_result.images.into_iter().map(|i| i.path).collect();
        let total_images = paths.len();
        tracing::info!(images = total_images, "Enumeration complete");

        // Phase 2: Fingerprinting
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Fingerprinting,
        }));
        let fingerprints = self.fingerprint_all(&paths, events);

        // Phase 3: Matching, strictly in enumeration order
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Matching,
        }));
        let state = self.matcher.scan_with_events(fingerprints, events);

        // Phase 4: Grouping
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Grouping,
        }));
        let groups = GroupExpander::new(&state.exact_groups).expand_all(&state.registry);
        let pairs: Vec<ComposePair> = groups
            .iter()
            .flat_map(DuplicateGroup::pairs)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        tracing::info!(groups = groups.len(), pairs = pairs.len(), "Grouping complete");

        // Phase 5: Composing
        let mut composed = Vec::new();
        if let Some(composer) = &self.composer {
            events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: PipelinePhase::Composing,
            }));
            let (written, failed) = compose_all(composer.as_ref(), &pairs, events);
            composed = written;
            errors.extend(failed);
        }

        let result = PipelineResult {
            groups,
            pairs,
            total_images,
            fingerprinted: state.scanned(),
            skipped: state.skipped,
            composed,
            errors,
            index_stats: state.index.stats(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: result.summary(),
        }));

        Ok(result)
    }

    /// Fingerprint every image in parallel, returning results in input order
    fn fingerprint_all(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Vec<(PathBuf, Result<Fingerprint, FingerprintError>)> {
        let total = paths.len();
        events.send(Event::Fingerprint(FingerprintEvent::Started {
            total_images: total,
        }));

        let completed = AtomicUsize::new(0);
        let throttle = Mutex::new(ProgressThrottle::new(total));

        let results: Vec<_> = paths
            .par_iter()
            .map(|path| {
                let result = self.source.compute(path);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

                if let Err(e) = &result {
                    events.send(Event::Fingerprint(FingerprintEvent::Error {
                        path: path.clone(),
                        message: e.to_string(),
                    }));
                }

                let emit = throttle
                    .lock()
                    .map(|mut t| t.should_emit(done))
                    .unwrap_or(false);
                if emit {
                    events.send(Event::Fingerprint(FingerprintEvent::Progress(
                        FingerprintProgress {
                            completed: done,
                            total,
                            current_path: path.clone(),
                        },
                    )));
                }

                (path.clone(), result)
            })
            .collect();

        // Throttled updates from worker threads can arrive out of order
        if let Some(last) = paths.last() {
            events.send(Event::Fingerprint(FingerprintEvent::Progress(
                FingerprintProgress {
                    completed: total,
                    total,
                    current_path: last.clone(),
                },
            )));
        }

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        events.send(Event::Fingerprint(FingerprintEvent::Completed {
            fingerprinted: total - failed,
            failed,
        }));

        results
    }
}

/// Write every pair through the sink; failures are collected, not fatal
fn compose_all(
    composer: &dyn CompositionSink,
    pairs: &[ComposePair],
    events: &EventSender,
) -> (Vec<PathBuf>, Vec<String>) {
    events.send(Event::Compose(ComposeEvent::Started {
        total_pairs: pairs.len(),
    }));

    let mut written = Vec::new();
    let mut failed = Vec::new();

    for pair in pairs {
        match composer.compose(pair) {
            Ok(output) => {
                events.send(Event::Compose(ComposeEvent::Written {
                    output: output.clone(),
                }));
                written.push(output);
            }
            Err(e) => {
                tracing::warn!("{}", e);
                events.send(Event::Compose(ComposeEvent::Error {
                    message: e.to_string(),
                }));
                failed.push(e.to_string());
            }
        }
    }

    events.send(Event::Compose(ComposeEvent::Completed {
        written: written.len(),
        failed: failed.len(),
    }));

    (written, failed)
}
