//! Profiles: named, data-only pipeline configurations.
//!
//! A profile fixes the grid format, the measurement, and how strict the
//! pipeline is about gridding QC. Everything else lives in [`Settings`] and
//! can be overridden per run.
use crate::crop::CropStrategy;
use crate::error::{PipelineError, Result};
use crate::image::{GrayImageU8, PlateImage};
use crate::measure::{DetectionSettings, MeasurementKind};
use crate::qc::QcFailurePolicy;
use crate::rotation::RotationMode;
use crate::segment::SegmenterParams;
use crate::types::GridShape;
use serde::{Deserialize, Serialize};

/// Which single channel colonies are found and measured on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisChannel {
    /// Unweighted mean of the colour channels.
    #[default]
    Gray,
    /// HSB brightness, `max(r, g, b)`.
    Brightness,
}

impl AnalysisChannel {
    pub fn extract(self, image: &PlateImage) -> GrayImageU8 {
        match self {
            AnalysisChannel::Gray => image.to_gray(),
            AnalysisChannel::Brightness => image.to_brightness(),
        }
    }
}

/// Fully resolved settings of one run. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub profile: String,
    pub grid: GridShape,
    pub measurement: MeasurementKind,
    pub rotation: RotationMode,
    pub cropping: CropStrategy,
    pub detection: DetectionSettings,
    /// Outward tile growth after segmentation, in pixels.
    pub breathing: Option<usize>,
    pub segmenter: SegmenterParams,
    pub qc_policy: QcFailurePolicy,
    pub channel: AnalysisChannel,
    /// Invert the picture before anything else (dark colonies on light agar).
    pub invert: bool,
}

impl Settings {
    fn profile(name: &str, grid: GridShape, measurement: MeasurementKind) -> Self {
        Self {
            profile: name.to_string(),
            grid,
            measurement,
            rotation: RotationMode::default(),
            cropping: CropStrategy::default(),
            detection: DetectionSettings::default(),
            breathing: None,
            segmenter: SegmenterParams::default(),
            qc_policy: QcFailurePolicy::Abort,
            channel: AnalysisChannel::Gray,
            invert: false,
        }
    }

    /// Settings for one picture. Single-colony pictures (`colony_*`,
    /// `tile_*`) are analysed as a 1×1 grid without adaptive cropping.
    pub fn for_source(&self, file_name: &str) -> Settings {
        let cropping = if file_name.contains("colony_") {
            CropStrategy::SingleColonyOval
        } else if file_name.contains("tile_") {
            CropStrategy::UserCropped
        } else {
            return self.clone();
        };
        Settings {
            grid: GridShape::SINGLE,
            cropping,
            ..self.clone()
        }
    }
}

pub const COLONY_GROWTH: &str = "Colony growth";
pub const GROWTH_INVERTED: &str = "Growth inverted";
pub const OPACITY: &str = "Opacity";
pub const SPORULATION: &str = "B.subtilis sporulation";
pub const CPRG: &str = "CPRG";

/// All built-in profiles, in menu order.
pub fn builtin_profiles() -> Vec<Settings> {
    let mut inverted = Settings::profile(
        GROWTH_INVERTED,
        GridShape::new(16, 24),
        MeasurementKind::opacity(),
    );
    inverted.invert = true;
    inverted.qc_policy = QcFailurePolicy::WarnAndWrite;

    let mut sporulation =
        Settings::profile(SPORULATION, GridShape::new(16, 24), MeasurementKind::hsb_color());
    sporulation.channel = AnalysisChannel::Brightness;

    vec![
        Settings::profile(COLONY_GROWTH, GridShape::default(), MeasurementKind::SizeOnly),
        inverted,
        Settings::profile(OPACITY, GridShape::default(), MeasurementKind::opacity()),
        sporulation,
        Settings::profile(CPRG, GridShape::new(16, 24), MeasurementKind::CprgHue),
    ]
}

/// Look a built-in profile up by name, ignoring case.
pub fn find_profile(name: &str) -> Result<Settings> {
    builtin_profiles()
        .into_iter()
        .find(|p| p.profile.eq_ignore_ascii_case(name))
        .ok_or_else(|| PipelineError::UnknownProfile(name.to_string()))
}
