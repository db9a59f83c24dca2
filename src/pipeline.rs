//! Single plate analysis engine.
//!
//! [`PlatePipeline`] runs every profile: profiles only differ in their
//! [`Settings`] and in the [`TileScorer`] the measurement kind selects.
//!
//! Stages, in order:
//! 1. optional inversion
//! 2. rotation (auto-estimated or manual)
//! 3. cropping to the colony array
//! 4. analysis channel extraction (gray or brightness)
//! 5. grid segmentation, optionally followed by breathing
//! 6. colony center pre-pass and row/column consensus
//! 7. measurement of every tile
//! 8. gridding QC
//! 9. results table and overlay
use crate::colony::{locate_all, CenterConsensus};
use crate::crop::crop_plate;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{AnalysisTrace, CropStage, InputDescriptor, SegmentationStage};
use crate::image::transform::rotate;
use crate::image::PlateImage;
use crate::matrix::TileMatrix;
use crate::measure::{measure_all, MeasurementSource, TileMeasurement, TileScorer};
use crate::output::{render_overlay, ResultsHeader, ResultsTable};
use crate::profile::Settings;
use crate::qc::{GriddingReport, QcFailurePolicy};
use crate::segment::{apply_breathing, segment, single_tile, SegmentationFailures};
use crate::types::GridShape;
use log::{debug, info, warn};
use serde::Serialize;
use std::borrow::Cow;
use std::path::Path;
use std::time::Instant;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AnalysisStatus {
    Success,
    SegmentationFailed { failures: SegmentationFailures },
    GriddingQcFailed { report: GriddingReport },
}

impl AnalysisStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisStatus::Success)
    }
}

/// Everything one analysis produced. Nothing has been written yet.
#[derive(Clone, Debug)]
pub struct PlateAnalysis {
    pub status: AnalysisStatus,
    /// Present when results may be written: success, or QC failure under
    /// [`QcFailurePolicy::WarnAndWrite`].
    pub table: Option<ResultsTable>,
    pub measurements: Option<TileMatrix<TileMeasurement>>,
    pub overlay: PlateImage,
    pub trace: AnalysisTrace,
}

pub struct PlatePipeline {
    settings: Settings,
    scorer: Box<dyn TileScorer>,
}

impl PlatePipeline {
    pub fn new(settings: Settings) -> Self {
        let scorer = settings.measurement.scorer();
        Self { settings, scorer }
    }

    /// Pipeline with a caller-supplied scorer in place of the profile's.
    pub fn with_scorer(settings: Settings, scorer: Box<dyn TileScorer>) -> Self {
        Self { settings, scorer }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scorer(&self) -> &dyn TileScorer {
        self.scorer.as_ref()
    }

    /// Analyse one plate. `source_name` is the picture's path or file name;
    /// it ends up in the results header and selects single-colony handling.
    pub fn analyze(&self, image: &PlateImage, source_name: &str) -> PlateAnalysis {
        let total = Instant::now();
        let file_name = Path::new(source_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(source_name);
        let settings = self.settings.for_source(file_name);
        let grid = settings.grid;
        info!(
            "PlatePipeline::analyze {source_name}: profile={} grid={}x{}",
            settings.profile, grid.rows, grid.columns
        );
        let input = InputDescriptor::of(source_name, image);
        let mut trace = AnalysisTrace::new(input, &settings.profile);

        let mut working: Cow<'_, PlateImage> = if settings.invert {
            Cow::Owned(trace.timings.time("invert", || image.inverted()))
        } else {
            Cow::Borrowed(image)
        };

        let (angle, search) = trace
            .timings
            .time("rotation estimate", || settings.rotation.resolve(&working));
        trace.rotation_deg = angle;
        trace.rotation_search = search;
        if angle != 0.0 {
            info!("PlatePipeline::analyze {source_name}: rotating by {angle:.2}°");
            let rotated = trace.timings.time("rotate", || rotate(&working, angle));
            working = Cow::Owned(rotated);
        }

        let cropped = trace
            .timings
            .time("crop", || crop_plate(&working, &settings.cropping, grid));
        drop(working);
        trace.crop = Some(CropStage {
            bounds: cropped.bounds.clone(),
            has_roi: cropped.roi.is_some(),
        });

        let analysis = trace
            .timings
            .time("channel", || settings.channel.extract(&cropped.image));
        let single = grid == GridShape::SINGLE && settings.cropping.is_single_colony();
        let result = trace.timings.time("segment", || {
            if single {
                single_tile(analysis.width(), analysis.height())
            } else {
                segment(analysis.as_view(), grid, &settings.segmenter)
            }
        });
        trace.segmentation = Some(SegmentationStage::from(&result));
        let column_boundaries = &result.columns.boundaries;
        let row_boundaries = &result.rows.boundaries;

        let Some(tiles) = result.usable_tiles() else {
            for reason in result.failures.reasons() {
                warn!("PlatePipeline::analyze {source_name}: segmentation failed, {reason}");
            }
            let overlay = render_overlay(&cropped.image, column_boundaries, row_boundaries, None);
            trace.timings.total_ms = elapsed_ms(total);
            return PlateAnalysis {
                status: AnalysisStatus::SegmentationFailed {
                    failures: result.failures,
                },
                table: None,
                measurements: None,
                overlay,
                trace,
            };
        };

        let tiles = match settings.breathing {
            Some(margin) => apply_breathing(tiles, margin, analysis.width(), analysis.height()),
            None => tiles.clone(),
        };

        let roi = cropped.roi.as_ref();
        let consensus = trace.timings.time("locate centers", || {
            let locator = &settings.detection.locator;
            let centers = locate_all(&analysis.as_view(), &tiles, roi, locator);
            CenterConsensus::from_centers(&centers)
        });
        debug!(
            "PlatePipeline::analyze consensus rows={:?} columns={:?}",
            consensus.row_y, consensus.column_x
        );

        let source = MeasurementSource {
            analysis: analysis.as_view(),
            color: cropped.image.as_rgb(),
            roi,
        };
        let outcome = trace.timings.time("measure", || {
            measure_all(
                &source,
                &tiles,
                &consensus,
                &settings.detection,
                self.scorer.as_ref(),
            )
        });
        drop(analysis);

        let qc_failed = outcome.qc.failed();
        let status = if qc_failed {
            warn!("PlatePipeline::analyze {source_name}: {}", outcome.qc);
            AnalysisStatus::GriddingQcFailed {
                report: outcome.qc.clone(),
            }
        } else {
            AnalysisStatus::Success
        };
        trace.qc = Some(outcome.qc);

        let write_results = !qc_failed || settings.qc_policy == QcFailurePolicy::WarnAndWrite;
        let table = write_results.then(|| {
            let header = ResultsHeader {
                profile: settings.profile.clone(),
                source: source_name.to_string(),
                top_left: result.top_left(),
                bottom_right: result.bottom_right(),
            };
            ResultsTable::from_measurements(header, self.scorer.columns(), &outcome.measurements)
        });

        let overlay = trace.timings.time("overlay", || {
            render_overlay(
                &cropped.image,
                column_boundaries,
                row_boundaries,
                Some((&tiles, &outcome.measurements)),
            )
        });
        trace.timings.total_ms = elapsed_ms(total);
        debug!(
            "PlatePipeline::analyze {source_name}: done in {:.1} ms",
            trace.timings.total_ms
        );

        PlateAnalysis {
            status,
            table,
            measurements: Some(outcome.measurements),
            overlay,
            trace,
        }
    }
}
