//! Batch driver: run a pipeline over a picture or a directory of pictures.
//!
//! Every picture is independent. Failures are logged and counted, never
//! propagated, so one bad picture does not stop the batch. With
//! `skip_existing`, pictures that already have a results file, or are claimed
//! by another run through a `.iris.dummy` file, are skipped; this lets several
//! processes share one directory.
use crate::config::{BatchOptions, OutputOptions};
use crate::error::{PipelineError, Result};
use crate::image::io::{load_plate_image, save_plate_image, write_json_file};
use crate::output::OutputPaths;
use crate::pipeline::{AnalysisStatus, PlatePipeline};
use crate::qc::GriddingReport;
use log::{error, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "tif", "tiff", "bmp"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Pictures to process: `input` itself when it is a file, otherwise the
/// images directly inside it, sorted by path.
pub fn find_images(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    let entries = fs::read_dir(input).map_err(|source| PipelineError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    files.sort();
    Ok(files)
}

/// What happened to a picture that was analysed.
#[derive(Clone, Debug, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub results_written: bool,
    /// Gridding QC failed but the profile writes results anyway.
    pub qc_warning: Option<GriddingReport>,
}

/// Analyse one picture and write its outputs.
///
/// Every output is attempted even when an earlier one fails to write; the
/// first write error is returned. The overlay is written whatever the
/// outcome of the analysis. Segmentation failures and
/// QC failures under [`QcFailurePolicy::Abort`](crate::qc::QcFailurePolicy)
/// are returned as errors after that.
pub fn process_file(
    pipeline: &PlatePipeline,
    path: &Path,
    output: &OutputOptions,
) -> Result<FileReport> {
    let image = load_plate_image(path)?;
    let analysis = pipeline.analyze(&image, &path.to_string_lossy());
    drop(image);
    let paths = OutputPaths::for_source(path, output.directory.as_deref());

    let mut writes = Vec::new();
    if let Some(table) = &analysis.table {
        writes.push(table.write(&paths.results));
    }
    if output.overlay {
        writes.push(save_plate_image(&analysis.overlay, &paths.overlay));
    }
    if output.trace {
        writes.push(write_json_file(&paths.trace, &analysis.trace));
    }
    let mut write_errors = writes.into_iter().filter_map(|w| w.err());
    if let Some(first) = write_errors.next() {
        for other in write_errors {
            warn!("{}: {other}", path.display());
        }
        return Err(first);
    }

    let results_written = analysis.table.is_some();
    match analysis.status {
        AnalysisStatus::Success => Ok(FileReport {
            path: path.to_path_buf(),
            results_written,
            qc_warning: None,
        }),
        AnalysisStatus::SegmentationFailed { failures } => {
            Err(PipelineError::Segmentation(failures))
        }
        AnalysisStatus::GriddingQcFailed { report } if results_written => Ok(FileReport {
            path: path.to_path_buf(),
            results_written,
            qc_warning: Some(report),
        }),
        AnalysisStatus::GriddingQcFailed { report } => Err(PipelineError::GriddingQc(report)),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub segmentation_failures: usize,
    /// QC failures, with or without results written.
    pub qc_failures: usize,
    /// Load and write failures.
    pub errors: usize,
}

enum Outcome {
    Done(FileReport),
    Skipped,
    Failed(PipelineError),
}

impl BatchSummary {
    fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Done(report) => {
                self.succeeded += 1;
                if report.qc_warning.is_some() {
                    self.qc_failures += 1;
                }
            }
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed(PipelineError::Segmentation(_)) => self.segmentation_failures += 1,
            Outcome::Failed(PipelineError::GriddingQc(_)) => self.qc_failures += 1,
            Outcome::Failed(_) => self.errors += 1,
        }
    }
}

/// Try to claim `path` for this run. `false` when it already has results or
/// another run holds the claim.
fn claim(paths: &OutputPaths) -> bool {
    if paths.results.exists() {
        return false;
    }
    if let Some(parent) = paths.claim.parent() {
        if !parent.as_os_str().is_empty() && fs::create_dir_all(parent).is_err() {
            return false;
        }
    }
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&paths.claim)
        .is_ok()
}

fn handle(
    pipeline: &PlatePipeline,
    path: &Path,
    batch: &BatchOptions,
    output: &OutputOptions,
) -> Outcome {
    let paths = OutputPaths::for_source(path, output.directory.as_deref());
    if batch.skip_existing && !claim(&paths) {
        info!("batch: skipping {}", path.display());
        return Outcome::Skipped;
    }
    info!("batch: processing {}", path.display());
    let result = process_file(pipeline, path, output);
    if batch.skip_existing {
        if let Err(err) = fs::remove_file(&paths.claim) {
            warn!("batch: could not remove claim {}: {err}", paths.claim.display());
        }
    }
    match result {
        Ok(report) => {
            if let Some(qc) = &report.qc_warning {
                warn!("batch: {} written despite gridding QC: {qc}", path.display());
            }
            info!("batch: finished {}", path.display());
            Outcome::Done(report)
        }
        Err(err @ (PipelineError::Segmentation(_) | PipelineError::GriddingQc(_))) => {
            warn!("batch: {}: {err}", path.display());
            Outcome::Failed(err)
        }
        Err(err) => {
            error!("batch: {}: {err}", path.display());
            Outcome::Failed(err)
        }
    }
}

/// Process every picture under `input`.
pub fn run_batch(
    pipeline: &PlatePipeline,
    input: &Path,
    batch: &BatchOptions,
    output: &OutputOptions,
) -> Result<BatchSummary> {
    let files = find_images(input)?;
    info!("batch: {} pictures under {}", files.len(), input.display());
    let outcomes: Vec<Outcome> = if batch.parallel {
        files
            .par_iter()
            .map(|p| handle(pipeline, p, batch, output))
            .collect()
    } else {
        files
            .iter()
            .map(|p| handle(pipeline, p, batch, output))
            .collect()
    };
    let mut summary = BatchSummary::default();
    for outcome in &outcomes {
        summary.record(outcome);
    }
    info!(
        "batch: {} done, {} skipped, {} segmentation failures, {} QC failures, {} errors",
        summary.succeeded,
        summary.skipped,
        summary.segmentation_failures,
        summary.qc_failures,
        summary.errors
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("colony_grid_batch_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn finds_images_sorted_and_ignores_other_files() {
        let dir = scratch_dir("find");
        for name in ["b.PNG", "a.jpg", "notes.txt", "c.tif", "a.jpg.iris"] {
            fs::write(dir.join(name), b"").unwrap();
        }
        let files = find_images(&dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.tif"]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn claims_are_exclusive_and_respect_results() {
        let dir = scratch_dir("claim");
        let paths = OutputPaths::for_source(&dir.join("p.jpg"), None);
        assert!(claim(&paths));
        assert!(!claim(&paths));
        fs::remove_file(&paths.claim).unwrap();
        fs::write(&paths.results, b"").unwrap();
        assert!(!claim(&paths));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_overlay_write_keeps_the_results() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = scratch_dir("overlay_fail");
        let path = dir.join("colony_A1.png");
        let mut picture = crate::image::GrayImageU8::filled(60, 60, 20);
        for y in 0..60usize {
            for x in 0..60usize {
                let (dx, dy) = (x as isize - 30, y as isize - 30);
                if dx * dx + dy * dy <= 144 {
                    picture.set(x, y, 220);
                }
            }
        }
        save_plate_image(&crate::image::PlateImage::Gray(picture), &path).unwrap();
        let paths = OutputPaths::for_source(&path, None);
        fs::create_dir_all(&paths.overlay).unwrap();

        let mut settings = crate::profile::find_profile(crate::profile::COLONY_GROWTH).unwrap();
        settings.rotation = crate::rotation::RotationMode::Manual { degrees: 0.0 };
        let pipeline = PlatePipeline::new(settings);
        let err = process_file(&pipeline, &path, &OutputOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Save { .. }), "{err}");
        assert!(paths.results.is_file());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unreadable_picture_is_counted_not_fatal() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = scratch_dir("broken");
        fs::write(dir.join("broken.png"), b"not a png").unwrap();
        let settings = crate::profile::find_profile(crate::profile::COLONY_GROWTH).unwrap();
        let pipeline = PlatePipeline::new(settings);
        let summary = run_batch(
            &pipeline,
            &dir,
            &BatchOptions::default(),
            &OutputOptions::default(),
        )
        .unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.errors, 1);
        let _ = fs::remove_dir_all(&dir);
    }
}
