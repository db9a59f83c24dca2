//! JSON run configuration.
//!
//! ```json
//! {
//!   "input": "plates/",
//!   "profile": "Colony growth",
//!   "settings": { "grid": { "rows": 16, "columns": 24 }, "breathing": 2 },
//!   "batch": { "parallel": true, "skipExisting": true },
//!   "output": { "trace": true }
//! }
//! ```
//!
//! Every field of `settings` is optional and falls back to the profile.
use crate::crop::CropStrategy;
use crate::error::{PipelineError, Result};
use crate::measure::{DetectionSettings, MeasurementKind};
use crate::profile::{find_profile, AnalysisChannel, Settings, COLONY_GROWTH};
use crate::qc::QcFailurePolicy;
use crate::rotation::RotationMode;
use crate::segment::SegmenterParams;
use crate::types::GridShape;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Picture or directory of pictures.
    pub input: PathBuf,
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default)]
    pub settings: SettingsOverrides,
    #[serde(default)]
    pub batch: BatchOptions,
    #[serde(default)]
    pub output: OutputOptions,
}

fn default_profile() -> String {
    COLONY_GROWTH.to_string()
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsOverrides {
    pub grid: Option<GridShape>,
    pub measurement: Option<MeasurementKind>,
    pub rotation: Option<RotationMode>,
    pub cropping: Option<CropStrategy>,
    pub detection: Option<DetectionSettings>,
    pub breathing: Option<usize>,
    pub segmenter: Option<SegmenterParams>,
    pub qc_policy: Option<QcFailurePolicy>,
    pub channel: Option<AnalysisChannel>,
    pub invert: Option<bool>,
}

impl SettingsOverrides {
    pub fn resolve(&self, profile: &Settings) -> Settings {
        Settings {
            profile: profile.profile.clone(),
            grid: self.grid.unwrap_or(profile.grid),
            measurement: self
                .measurement
                .clone()
                .unwrap_or_else(|| profile.measurement.clone()),
            rotation: self.rotation.unwrap_or(profile.rotation),
            cropping: self.cropping.clone().unwrap_or_else(|| profile.cropping.clone()),
            detection: self
                .detection
                .clone()
                .unwrap_or_else(|| profile.detection.clone()),
            breathing: self.breathing.or(profile.breathing),
            segmenter: self
                .segmenter
                .clone()
                .unwrap_or_else(|| profile.segmenter.clone()),
            qc_policy: self.qc_policy.unwrap_or(profile.qc_policy),
            channel: self.channel.unwrap_or(profile.channel),
            invert: self.invert.unwrap_or(profile.invert),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchOptions {
    /// Process pictures concurrently.
    pub parallel: bool,
    /// Skip pictures that already have results or are claimed by another run.
    pub skip_existing: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputOptions {
    /// Write the `.grid.jpg` overlay.
    pub overlay: bool,
    /// Write an `.analysis.json` trace next to the results.
    pub trace: bool,
    /// Directory for all outputs; defaults to the picture's directory.
    pub directory: Option<PathBuf>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            overlay: true,
            trace: false,
            directory: None,
        }
    }
}

impl RunConfig {
    /// Profile defaults with this run's overrides applied.
    pub fn resolve_settings(&self) -> Result<Settings> {
        let profile = find_profile(&self.profile)?;
        let settings = self.settings.resolve(&profile);
        validate(&settings)?;
        Ok(settings)
    }
}

fn validate(settings: &Settings) -> Result<()> {
    if settings.grid.rows == 0 || settings.grid.columns == 0 {
        return Err(PipelineError::invalid_parameter(
            "grid",
            format!("{}x{}", settings.grid.rows, settings.grid.columns),
        ));
    }
    if let RotationMode::Auto { sweep } = settings.rotation {
        if sweep.step.is_nan() || sweep.step <= 0.0 || sweep.end < sweep.start {
            return Err(PipelineError::invalid_parameter(
                "rotation.sweep",
                format!("{}..{} step {}", sweep.start, sweep.end, sweep.step),
            ));
        }
    }
    Ok(())
}

pub fn load_config(path: &Path) -> Result<RunConfig> {
    let data = fs::read_to_string(path)
        .map_err(|e| PipelineError::config(path, format!("failed to read: {e}")))?;
    serde_json::from_str(&data)
        .map_err(|e| PipelineError::config(path, format!("failed to parse: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::CPRG;

    #[test]
    fn overrides_apply_over_profile_defaults() {
        let config: RunConfig = serde_json::from_str(
            r#"{
                "input": "plate.jpg",
                "profile": "CPRG",
                "settings": {
                    "grid": { "rows": 8, "columns": 12 },
                    "rotation": { "mode": "manual", "degrees": 1.5 },
                    "breathing": 3
                },
                "batch": { "skipExisting": true }
            }"#,
        )
        .unwrap();
        let settings = config.resolve_settings().unwrap();
        assert_eq!(settings.profile, CPRG);
        assert_eq!(settings.grid, GridShape::new(8, 12));
        assert_eq!(settings.rotation, RotationMode::Manual { degrees: 1.5 });
        assert_eq!(settings.breathing, Some(3));
        assert_eq!(settings.measurement, MeasurementKind::CprgHue);
        assert!(config.batch.skip_existing);
        assert!(!config.batch.parallel);
        assert!(config.output.overlay);
    }

    #[test]
    fn minimal_config_uses_colony_growth() {
        let config: RunConfig = serde_json::from_str(r#"{ "input": "a.png" }"#).unwrap();
        let settings = config.resolve_settings().unwrap();
        assert_eq!(settings.profile, COLONY_GROWTH);
        assert_eq!(settings.grid, GridShape::new(32, 48));
        assert_eq!(settings.detection.min_colony_size, 50);
    }

    #[test]
    fn zero_grid_is_rejected() {
        let config: RunConfig = serde_json::from_str(
            r#"{ "input": "a.png", "settings": { "grid": { "rows": 0, "columns": 4 } } }"#,
        )
        .unwrap();
        assert!(matches!(
            config.resolve_settings(),
            Err(PipelineError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config: RunConfig =
            serde_json::from_str(r#"{ "input": "a.png", "profile": "Halo" }"#).unwrap();
        assert!(matches!(config.resolve_settings(), Err(PipelineError::UnknownProfile(_))));
    }
}
