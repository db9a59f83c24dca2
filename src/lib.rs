#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod output;
pub mod pipeline;
pub mod profile;
pub mod types;

// Stage modules, public for tools and tests.
pub mod angle;
pub mod colony;
pub mod crop;
pub mod matrix;
pub mod measure;
pub mod qc;
pub mod region;
pub mod rotation;
pub mod segment;
pub mod stats;

// --- High-level re-exports -------------------------------------------------

pub use crate::batch::{run_batch, BatchSummary};
pub use crate::error::{PipelineError, Result};
pub use crate::pipeline::{AnalysisStatus, PlateAnalysis, PlatePipeline};
pub use crate::profile::{builtin_profiles, find_profile, Settings};
pub use crate::types::{ColonyCenter, GridShape, Point};

pub use crate::diagnostics::{AnalysisTrace, TimingBreakdown};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use colony_grid::prelude::*;
/// use std::path::Path;
///
/// # fn main() -> colony_grid::Result<()> {
/// let image = load_plate_image(Path::new("plate.jpg"))?;
/// let pipeline = PlatePipeline::new(find_profile("Colony growth")?);
/// let analysis = pipeline.analyze(&image, "plate.jpg");
/// if let Some(table) = &analysis.table {
///     print!("{}", table.to_tsv());
/// }
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::io::load_plate_image;
    pub use crate::image::{GrayImageU8, ImageU8, PlateImage, RgbImageU8};
    pub use crate::{find_profile, AnalysisStatus, GridShape, PlatePipeline, Settings};
}

// --- Stage-level API (for tools & advanced users) ---------------------------

pub mod stages {
    pub use crate::colony::{locate_all, locate_center, CenterConsensus, LocatorParams};
    pub use crate::crop::{crop_plate, CropStrategy, CroppedPlate};
    pub use crate::measure::{
        extract_colony, measure_all, DetectionSettings, MeasurementKind, MeasurementSource,
        TileMeasurement, TileScorer,
    };
    pub use crate::qc::{check_incorrect_gridding, GriddingReport, QcFailurePolicy};
    pub use crate::rotation::{estimate_rotation, RotationEstimate, RotationMode};
    pub use crate::segment::{apply_breathing, segment, SegmentationResult, SegmenterParams};
}
