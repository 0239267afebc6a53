//! # Pipeline Module
//!
//! Orchestrates the full near-duplicate workflow.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Enumerate images in the specified directories
//! 2. **Fingerprint** - Compute a dHash per image
//! 3. **Match** - Band lookup, first match, conditional insertion (`scan`)
//! 4. **Group** - Expand pair records and exact collisions into groups
//! 5. **Compose** - Optionally write a side-by-side image per pair
//!
//! ## Parallelism
//! Only fingerprinting runs on the rayon pool. Results are put back into
//! enumeration order before matching, which is sequential: which fingerprint
//! becomes a band's anchor depends on that order.

mod executor;
mod scan;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
pub use scan::{ImageOutcome, MatchConfig, ScanMatcher, ScanState, SkippedImage};
