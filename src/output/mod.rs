//! Files written for each analysed picture.
//!
//! For `plate.jpg` the outputs are `plate.jpg.iris` (results table),
//! `plate.jpg.grid.jpg` (overlay) and optionally `plate.jpg.analysis.json`
//! (trace). `plate.jpg.iris.dummy` marks a picture claimed by a running batch.
pub mod overlay;
pub mod results;

pub use overlay::{render_overlay, OverlayPainter};
pub use results::{ResultsHeader, ResultsRow, ResultsTable};

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const RESULTS_SUFFIX: &str = ".iris";
pub const OVERLAY_SUFFIX: &str = ".grid.jpg";
pub const TRACE_SUFFIX: &str = ".analysis.json";
pub const CLAIM_SUFFIX: &str = ".iris.dummy";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    pub results: PathBuf,
    pub overlay: PathBuf,
    pub trace: PathBuf,
    pub claim: PathBuf,
}

impl OutputPaths {
    /// Output locations for `source`, inside `directory` when given and next
    /// to the picture otherwise.
    pub fn for_source(source: &Path, directory: Option<&Path>) -> Self {
        let file_name = source.file_name().map(OsString::from).unwrap_or_default();
        let dir = match directory {
            Some(dir) => dir.to_path_buf(),
            None => source.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let with_suffix = |suffix: &str| {
            let mut name = file_name.clone();
            name.push(suffix);
            dir.join(name)
        };
        Self {
            results: with_suffix(RESULTS_SUFFIX),
            overlay: with_suffix(OVERLAY_SUFFIX),
            trace: with_suffix(TRACE_SUFFIX),
            claim: with_suffix(CLAIM_SUFFIX),
        }
    }
}
