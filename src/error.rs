//! Error types for the colony analysis pipeline.

use crate::qc::GriddingReport;
use crate::segment::SegmentationFailures;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failures surfaced per image. The batch driver logs them and moves on to
/// the next picture.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image file could not be opened or decoded
    #[error("failed to load image {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Image could not be encoded to disk
    #[error("failed to save image {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Grid lattice could not be established; lists every violated condition
    #[error("image segmentation failed: {0}")]
    Segmentation(SegmentationFailures),

    /// Too many empty rows or columns after measurement
    #[error("gridding QC failed: {0}")]
    GriddingQc(GriddingReport),

    /// Input file or directory could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be written
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize JSON for {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Settings file missing or malformed
    #[error("invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("unknown profile `{0}`")]
    UnknownProfile(String),

    /// Invalid input parameters
    #[error("invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },
}

impl PipelineError {
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }
}
