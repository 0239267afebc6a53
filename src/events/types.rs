//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the near-duplicate pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Image enumeration events
    Scan(ScanEvent),
    /// Fingerprinting phase events
    Fingerprint(FingerprintEvent),
    /// Scan/match phase events
    Match(MatchEvent),
    /// Side-by-side composition events
    Compose(ComposeEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while enumerating images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Enumeration has started
    Started { paths: Vec<PathBuf> },
    /// Progress update during enumeration
    Progress(ScanProgress),
    /// An image was found
    ImageFound { path: PathBuf },
    /// An error occurred but enumeration continues
    Error { path: PathBuf, message: String },
    /// Enumeration completed
    Completed { total_images: usize },
}

/// Progress information during enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Number of directories visited so far
    pub directories_scanned: usize,
    /// Number of images found so far
    pub images_found: usize,
    /// Current directory
    pub current_path: PathBuf,
}

/// Events during the fingerprinting phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FingerprintEvent {
    /// Fingerprinting has started
    Started { total_images: usize },
    /// Progress update
    Progress(FingerprintProgress),
    /// An image could not be fingerprinted and will be skipped
    Error { path: PathBuf, message: String },
    /// Fingerprinting completed
    Completed { fingerprinted: usize, failed: usize },
}

/// Progress information during fingerprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintProgress {
    /// Number of images processed so far
    pub completed: usize,
    /// Total number of images
    pub total: usize,
    /// Image just processed
    pub current_path: PathBuf,
}

/// Events during the scan/match phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatchEvent {
    /// Matching has started
    Started { total_images: usize },
    /// Progress update
    Progress(MatchProgress),
    /// A new near-duplicate pair was registered
    PairFound {
        path: PathBuf,
        pair_key: String,
        distance: u32,
    },
    /// An image was dropped from matching (malformed fingerprint)
    Skipped { path: PathBuf, message: String },
    /// Matching completed
    Completed {
        pair_records: usize,
        exact_collisions: usize,
        anchors: usize,
    },
}

/// Progress information during matching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchProgress {
    /// Number of images matched so far
    pub images_processed: usize,
    /// Total number of images to match
    pub total_images: usize,
    /// Pair records registered so far
    pub pairs_found: usize,
}

/// Events while writing side-by-side artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComposeEvent {
    /// Composition has started
    Started { total_pairs: usize },
    /// An artifact was written
    Written { output: PathBuf },
    /// A pair could not be composed
    Error { message: String },
    /// Composition completed
    Completed { written: usize, failed: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Fingerprinting,
    Matching,
    Grouping,
    Composing,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total images enumerated
    pub total_images: usize,
    /// Images excluded from matching
    pub skipped_images: usize,
    /// Number of duplicate groups found
    pub duplicate_groups: usize,
    /// Number of `(representative, other)` pairs emitted
    pub duplicate_pairs: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Fingerprinting => write!(f, "Fingerprinting"),
            PipelinePhase::Matching => write!(f, "Matching"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
            PipelinePhase::Composing => write!(f, "Composing"),
        }
    }
}
