//! Pluggable per-colony scoring.
//!
//! Size and circularity come from colony extraction and are common to every
//! profile. Anything else (opacity, colour) is computed by a [`TileScorer`]
//! chosen through [`MeasurementKind`]. Scorers are only called for tiles that
//! hold a colony.
use super::color::{CprgHueScorer, HsbColorScorer};
use super::opacity::OpacityScorer;
use super::ColonyExtraction;
use crate::image::{ImageU8, RgbImageU8};
use crate::region::Region;
use crate::types::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Profile-specific scalar scores, aligned with [`TileScorer::columns`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub values: Vec<f64>,
}

impl ScoreRecord {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn zeroed(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }
}

/// Pixels of one tile as seen by a scorer.
pub struct TileImages<'a> {
    /// Analysis channel (gray or brightness) of the tile.
    pub gray: ImageU8<'a>,
    /// Colour copy of the tile, when the scorer asked for it and the plate
    /// has colour.
    pub color: Option<RgbImageU8>,
    /// Consensus colony center, tile-local.
    pub center: Point,
}

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("scorer `{0}` needs a colour image")]
    MissingColor(&'static str),
    #[error("colony region is empty")]
    EmptyColony,
}

pub trait TileScorer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Output column names, in the order of [`ScoreRecord::values`].
    fn columns(&self) -> &[&'static str];

    fn needs_color(&self) -> bool {
        false
    }

    /// Score a colony. `colony` is tile-local and masked to the colony pixels.
    fn measure(
        &self,
        colony: &Region,
        tile: &TileImages<'_>,
        prior: &ColonyExtraction,
    ) -> Result<ScoreRecord, ScoreError>;
}

/// Scorer that adds nothing beyond size and circularity.
pub struct SizeOnlyScorer;

impl TileScorer for SizeOnlyScorer {
    fn name(&self) -> &'static str {
        "size"
    }

    fn columns(&self) -> &[&'static str] {
        &[]
    }

    fn measure(
        &self,
        _colony: &Region,
        _tile: &TileImages<'_>,
        _prior: &ColonyExtraction,
    ) -> Result<ScoreRecord, ScoreError> {
        Ok(ScoreRecord::default())
    }
}

/// Measurement algorithm selected by a profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MeasurementKind {
    #[default]
    SizeOnly,
    #[serde(rename_all = "camelCase")]
    Opacity {
        #[serde(default = "default_center_diameter")]
        center_diameter: usize,
    },
    CprgHue,
    #[serde(rename_all = "camelCase")]
    HsbColor {
        #[serde(default = "default_hue_min")]
        hue_min: f64,
        #[serde(default = "default_hue_max")]
        hue_max: f64,
        #[serde(default = "default_center_diameter")]
        center_diameter: usize,
    },
}

fn default_center_diameter() -> usize {
    38
}

fn default_hue_min() -> f64 {
    300.0
}

fn default_hue_max() -> f64 {
    360.0
}

impl MeasurementKind {
    pub fn opacity() -> Self {
        MeasurementKind::Opacity {
            center_diameter: default_center_diameter(),
        }
    }

    pub fn hsb_color() -> Self {
        MeasurementKind::HsbColor {
            hue_min: default_hue_min(),
            hue_max: default_hue_max(),
            center_diameter: default_center_diameter(),
        }
    }

    pub fn scorer(&self) -> Box<dyn TileScorer> {
        match self {
            MeasurementKind::SizeOnly => Box::new(SizeOnlyScorer),
            MeasurementKind::Opacity { center_diameter } => {
                Box::new(OpacityScorer::new(*center_diameter))
            }
            MeasurementKind::CprgHue => Box::new(CprgHueScorer),
            MeasurementKind::HsbColor {
                hue_min,
                hue_max,
                center_diameter,
            } => Box::new(HsbColorScorer::new(*hue_min, *hue_max, *center_diameter)),
        }
    }
}

/// Tile-local pixels within a disk of `diameter` around `center`.
pub(crate) fn disk_pixels(
    center: Point,
    diameter: usize,
    width: usize,
    height: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let r = diameter as f64 * 0.5;
    let r2 = r * r;
    let x0 = (center.x - r).ceil().max(0.0) as usize;
    let y0 = (center.y - r).ceil().max(0.0) as usize;
    let x1 = (((center.x + r).floor() + 1.0).max(0.0) as usize).min(width);
    let y1 = (((center.y + r).floor() + 1.0).max(0.0) as usize).min(height);
    (y0..y1).flat_map(move |y| {
        (x0..x1).filter_map(move |x| {
            let dx = x as f64 - center.x;
            let dy = y as f64 - center.y;
            (dx * dx + dy * dy <= r2).then_some((x, y))
        })
    })
}

/// Tile-local pixels covered by a colony region.
pub(crate) fn colony_pixels(colony: &Region) -> impl Iterator<Item = (usize, usize)> + '_ {
    (colony.y..colony.bottom()).flat_map(move |y| {
        (colony.x..colony.right()).filter_map(move |x| colony.contains(x, y).then_some((x, y)))
    })
}
