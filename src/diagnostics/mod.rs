//! Diagnostics data model for a plate analysis.
//!
//! [`AnalysisTrace`] records what every stage decided (rotation search, crop
//! bounds, segmenter states and boundaries, QC verdict) together with the
//! stage timings, and can be written as JSON next to the results.
pub mod timing;
pub mod trace;

pub use timing::{StageTiming, TimingBreakdown};
pub use trace::{AnalysisTrace, CropStage, InputDescriptor, SegmentationStage};
