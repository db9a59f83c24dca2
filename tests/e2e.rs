mod common;

use colony_grid::batch::process_file;
use colony_grid::config::OutputOptions;
use colony_grid::image::io::save_plate_image;
use colony_grid::image::{GrayImageU8, PlateImage};
use colony_grid::measure::{ColonyExtraction, ScoreError, ScoreRecord, TileImages, TileScorer};
use colony_grid::output::OutputPaths;
use colony_grid::profile::{find_profile, COLONY_GROWTH};
use colony_grid::qc::QcFailurePolicy;
use colony_grid::region::Region;
use colony_grid::rotation::RotationMode;
use colony_grid::{AnalysisStatus, GridShape, PipelineError, PlatePipeline, Settings};
use common::synthetic_image::SyntheticPlate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn four_by_four() -> Settings {
    let mut settings = find_profile(COLONY_GROWTH).expect("builtin profile");
    settings.grid = GridShape::new(4, 4);
    settings
}

fn without_rotation(mut settings: Settings) -> Settings {
    settings.rotation = RotationMode::Manual { degrees: 0.0 };
    settings
}

/// Scorer that records how many colonies it was asked about.
struct CountingScorer {
    calls: Arc<AtomicUsize>,
}

impl TileScorer for CountingScorer {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn columns(&self) -> &[&'static str] {
        &["seen size"]
    }

    fn measure(
        &self,
        _colony: &Region,
        _tile: &TileImages<'_>,
        prior: &ColonyExtraction,
    ) -> Result<ScoreRecord, ScoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ScoreRecord::new(vec![prior.size as f64]))
    }
}

#[test]
fn aligned_plate_yields_one_round_colony_per_tile() {
    common::init_logging();
    let plate = SyntheticPlate::default();
    let pipeline = PlatePipeline::new(four_by_four());
    let analysis = pipeline.analyze(&plate.render(), "plate.png");

    assert_eq!(analysis.status, AnalysisStatus::Success);
    assert_eq!(analysis.trace.rotation_deg, 0.0);
    let table = analysis.table.expect("results table");
    assert_eq!(table.rows.len(), 16);
    assert!(table.score_columns.is_empty());
    let area = plate.disk_area();
    for row in &table.rows {
        assert_eq!(row.size, area, "tile ({}, {})", row.row, row.column);
        assert!(row.circularity > 0.7, "circularity {}", row.circularity);
    }
    assert_eq!(table.rows[0].row, 1);
    assert_eq!(table.rows[15].column, 4);

    let tsv = table.to_tsv();
    assert!(tsv.starts_with("#colony_grid\t"));
    assert!(tsv.contains("#profile\tColony growth"));
    assert!(tsv.contains("row\tcolumn\tsize\tcircularity\n"));
}

#[test]
fn skewed_plate_is_deskewed_before_measuring() {
    common::init_logging();
    let reference = SyntheticPlate::default();
    let skewed = SyntheticPlate {
        skew_deg: -1.3,
        ..SyntheticPlate::default()
    };
    let pipeline = PlatePipeline::new(four_by_four());
    let analysis = pipeline.analyze(&skewed.render(), "skewed.png");

    let angle = analysis.trace.rotation_deg;
    assert!((angle - 1.3).abs() <= 0.25, "estimated {angle}");
    assert_eq!(analysis.status, AnalysisStatus::Success);
    let table = analysis.table.expect("results table");
    assert_eq!(table.rows.len(), 16);
    let area = reference.disk_area() as f64;
    for row in &table.rows {
        let rel = (row.size as f64 - area).abs() / area;
        assert!(rel < 0.05, "tile ({}, {}) size {}", row.row, row.column, row.size);
    }
}

#[test]
fn black_plate_fails_segmentation_and_writes_only_the_overlay() {
    common::init_logging();
    let dir = common::scratch_dir("black");
    let path = dir.join("black.png");
    let black = PlateImage::Gray(GrayImageU8::filled(400, 400, 0));
    save_plate_image(&black, &path).unwrap();

    let pipeline = PlatePipeline::new(four_by_four());
    let output = OutputOptions::default();
    let err = process_file(&pipeline, &path, &output).unwrap_err();
    match err {
        PipelineError::Segmentation(failures) => {
            assert!(failures.not_enough_columns);
            assert!(failures.not_enough_rows);
        }
        other => panic!("unexpected error {other}"),
    }
    let paths = OutputPaths::for_source(&path, None);
    assert!(paths.overlay.exists());
    assert!(!paths.results.exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn mostly_empty_column_fails_gridding_qc() {
    common::init_logging();
    let plate = SyntheticPlate {
        missing: vec![(0, 0), (1, 0), (2, 0)],
        ..SyntheticPlate::default()
    };
    let image = plate.render();

    let strict = PlatePipeline::new(without_rotation(four_by_four()));
    let analysis = strict.analyze(&image, "gaps.png");
    match &analysis.status {
        AnalysisStatus::GriddingQcFailed { report } => {
            assert_eq!(report.failing_columns, vec![0]);
            assert!(report.failing_rows.is_empty());
        }
        other => panic!("unexpected status {other:?}"),
    }
    assert!(analysis.table.is_none());

    let mut lenient = without_rotation(four_by_four());
    lenient.qc_policy = QcFailurePolicy::WarnAndWrite;
    let analysis = PlatePipeline::new(lenient).analyze(&image, "gaps.png");
    assert!(!analysis.status.is_success());
    let table = analysis.table.expect("results written despite QC");
    assert_eq!(table.row(1, 1).map(|r| r.size), Some(0));
    assert_eq!(table.row(4, 1).map(|r| r.size), Some(plate.disk_area()));
}

#[test]
fn scorer_is_only_called_for_colonies() {
    common::init_logging();
    let plate = SyntheticPlate {
        missing: vec![(0, 0), (1, 0), (2, 0)],
        ..SyntheticPlate::default()
    };
    let calls = Arc::new(AtomicUsize::new(0));
    let scorer = CountingScorer {
        calls: Arc::clone(&calls),
    };
    let mut settings = without_rotation(four_by_four());
    settings.qc_policy = QcFailurePolicy::WarnAndWrite;
    let pipeline = PlatePipeline::with_scorer(settings, Box::new(scorer));
    let analysis = pipeline.analyze(&plate.render(), "gaps.png");

    assert_eq!(calls.load(Ordering::SeqCst), 13);
    let table = analysis.table.expect("results table");
    assert_eq!(table.score_columns, vec!["seen size".to_string()]);
    assert_eq!(table.row(1, 1).map(|r| r.scores.clone()), Some(vec![0.0]));
    let area = plate.disk_area() as f64;
    assert_eq!(table.row(2, 2).map(|r| r.scores.clone()), Some(vec![area]));
}

#[test]
fn repeated_analysis_is_identical() {
    common::init_logging();
    let image = SyntheticPlate {
        skew_deg: 0.8,
        ..SyntheticPlate::default()
    }
    .render();
    let pipeline = PlatePipeline::new(four_by_four());
    let first = pipeline.analyze(&image, "plate.png");
    let second = pipeline.analyze(&image, "plate.png");
    assert_eq!(first.status, second.status);
    assert_eq!(first.table, second.table);
    assert_eq!(first.overlay, second.overlay);
}

#[test]
fn single_colony_picture_is_one_tile() {
    common::init_logging();
    let plate = SyntheticPlate {
        size: 80,
        rows: 1,
        columns: 1,
        first: 40.0,
        ..SyntheticPlate::default()
    };
    let pipeline = PlatePipeline::new(without_rotation(four_by_four()));
    let analysis = pipeline.analyze(&plate.render(), "plates/colony_A1.png");
    assert_eq!(analysis.status, AnalysisStatus::Success);
    let table = analysis.table.expect("results table");
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].size, plate.disk_area());
}
