use super::TimingBreakdown;
use crate::image::{PixelFormat, PlateImage};
use crate::qc::GriddingReport;
use crate::region::Region;
use crate::rotation::RotationEstimate;
use crate::segment::{SegmentationResult, SegmenterState};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub source: String,
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
}

impl InputDescriptor {
    pub fn of(source: &str, image: &PlateImage) -> Self {
        Self {
            source: source.to_string(),
            width: image.width(),
            height: image.height(),
            format: image.format(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropStage {
    /// Crop rectangle in rotated-image coordinates.
    pub bounds: Region,
    pub has_roi: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationStage {
    pub states: Vec<SegmenterState>,
    pub column_boundaries: Vec<usize>,
    pub row_boundaries: Vec<usize>,
    pub failure_reasons: Vec<&'static str>,
}

impl From<&SegmentationResult> for SegmentationStage {
    fn from(result: &SegmentationResult) -> Self {
        Self {
            states: result.states.clone(),
            column_boundaries: result.columns.boundaries.clone(),
            row_boundaries: result.rows.boundaries.clone(),
            failure_reasons: result.failures.reasons(),
        }
    }
}

/// Everything one analysis decided, stage by stage.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisTrace {
    pub input: InputDescriptor,
    pub profile: String,
    /// Angle the plate was rotated by, degrees.
    pub rotation_deg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_search: Option<RotationEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segmentation: Option<SegmentationStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qc: Option<GriddingReport>,
    pub timings: TimingBreakdown,
}

impl AnalysisTrace {
    pub fn new(input: InputDescriptor, profile: &str) -> Self {
        Self {
            input,
            profile: profile.to_string(),
            rotation_deg: 0.0,
            rotation_search: None,
            crop: None,
            segmentation: None,
            qc: None,
            timings: TimingBreakdown::default(),
        }
    }
}
