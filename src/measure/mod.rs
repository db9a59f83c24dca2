//! Per-tile colony extraction and measurement.
//!
//! Every tile goes through the same extraction: threshold, particles,
//! emptiness heuristics, selection of the particle under the consensus
//! center, then a size/circularity gate. Tiles that survive are handed to the
//! profile's [`TileScorer`]; empty tiles get zero scores without the scorer
//! ever seeing them.
pub mod color;
pub mod opacity;
pub mod scorer;

pub use self::color::{cprg_relative_intensity, CprgHueScorer, HsbColorScorer};
pub use self::opacity::OpacityScorer;
pub use self::scorer::{
    MeasurementKind, ScoreError, ScoreRecord, SizeOnlyScorer, TileImages, TileScorer,
};

use crate::colony::{
    largest_particle, tile_particles, tile_roi_mask, CenterConsensus, LocatorParams, Particle,
};
use crate::image::{ImageU8, RgbImageU8};
use crate::matrix::TileMatrix;
use crate::qc::GriddingReport;
use crate::region::{Region, RegionMask};
use crate::types::Point;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// More particles than this is debris or a lawn, not a colony.
const MAX_PARTICLES: usize = 40;
/// Particle count that starts to look suspicious.
const CROWDED_PARTICLES: usize = 15;
const MAX_ASPECT_RATIO: f64 = 2.0;
const ELONGATED_ASPECT_RATIO: f64 = 1.2;
const MIN_PARTICLE_CIRCULARITY: f64 = 0.2;
/// A particle hugging the tile origin must be at least this round to count.
const CORNER_PARTICLE_CIRCULARITY: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectionSettings {
    /// Colonies smaller than this (pixels) are reported empty.
    pub min_colony_size: usize,
    pub min_circularity: f64,
    pub locator: LocatorParams,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            min_colony_size: 50,
            min_circularity: 0.3,
            locator: LocatorParams::default(),
        }
    }
}

/// Why a tile was reported without a colony.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyReason {
    NoParticles,
    TooManyParticles,
    /// Largest particle is a smear.
    Contamination,
    /// Largest particle is too ragged to be a colony.
    Irregular,
    /// Crowded and elongated at the same time.
    Penalised,
    TooSmall,
    NotCircular,
}

/// Result of colony extraction on one tile, coordinates tile-local.
#[derive(Clone, Debug, PartialEq)]
pub struct ColonyExtraction {
    pub size: usize,
    pub circularity: f64,
    pub colony: Option<Region>,
    pub center: Point,
    pub empty_reason: Option<EmptyReason>,
}

impl ColonyExtraction {
    pub fn empty(center: Point) -> Self {
        Self {
            size: 0,
            circularity: 0.0,
            colony: None,
            center,
            empty_reason: None,
        }
    }

    fn rejected(center: Point, reason: EmptyReason) -> Self {
        Self {
            empty_reason: Some(reason),
            ..Self::empty(center)
        }
    }
}

/// Heuristic emptiness check on the particles of a tile.
pub fn empty_reason(particles: &[Particle]) -> Option<EmptyReason> {
    let Some(largest) = largest_particle(particles) else {
        return Some(EmptyReason::NoParticles);
    };
    if particles.len() > MAX_PARTICLES {
        return Some(EmptyReason::TooManyParticles);
    }
    let mut penalty = 0;
    if particles.len() > CROWDED_PARTICLES {
        penalty += 1;
    }
    if largest.aspect_ratio > MAX_ASPECT_RATIO {
        return Some(EmptyReason::Contamination);
    }
    if largest.aspect_ratio > ELONGATED_ASPECT_RATIO {
        penalty += 1;
    }
    if largest.circularity < MIN_PARTICLE_CIRCULARITY {
        return Some(EmptyReason::Irregular);
    }
    if particles.len() == 1 {
        return None;
    }
    if penalty > 1 {
        return Some(EmptyReason::Penalised);
    }
    if largest.region.x == 0
        && largest.region.y == 0
        && largest.circularity <= CORNER_PARTICLE_CIRCULARITY
    {
        return Some(EmptyReason::Irregular);
    }
    None
}

/// Particle under `center`, or the largest one when none covers it.
fn select_particle<'p>(particles: &'p [Particle], center: Point) -> Option<&'p Particle> {
    let (cx, cy) = (center.x.round(), center.y.round());
    if cx >= 0.0 && cy >= 0.0 {
        if let Some(hit) = particles.iter().find(|p| p.contains(cx as usize, cy as usize)) {
            return Some(hit);
        }
    }
    largest_particle(particles)
}

/// Extract the colony of one tile around its consensus `center`.
pub fn extract_colony(
    tile: &ImageU8<'_>,
    center: Point,
    roi: Option<&RegionMask>,
    settings: &DetectionSettings,
) -> ColonyExtraction {
    let particles = tile_particles(tile, roi, &settings.locator);
    if let Some(reason) = empty_reason(&particles) {
        return ColonyExtraction::rejected(center, reason);
    }
    let Some(particle) = select_particle(&particles, center) else {
        return ColonyExtraction::rejected(center, EmptyReason::NoParticles);
    };
    if particle.area < settings.min_colony_size {
        return ColonyExtraction::rejected(center, EmptyReason::TooSmall);
    }
    if particle.circularity < settings.min_circularity {
        return ColonyExtraction::rejected(center, EmptyReason::NotCircular);
    }
    ColonyExtraction {
        size: particle.area,
        circularity: particle.circularity,
        colony: Some(particle.region.clone()),
        center,
        empty_reason: None,
    }
}

/// Final per-tile record. Coordinates are tile-local.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMeasurement {
    pub colony_size: usize,
    pub circularity: f64,
    #[serde(skip)]
    pub colony: Option<Region>,
    pub center: Point,
    pub scores: ScoreRecord,
}

impl TileMeasurement {
    pub fn empty(center: Point, score_columns: usize) -> Self {
        Self {
            colony_size: 0,
            circularity: 0.0,
            colony: None,
            center,
            scores: ScoreRecord::zeroed(score_columns),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.colony_size == 0
    }
}

/// Images a plate is measured on.
pub struct MeasurementSource<'a> {
    /// Analysis channel of the cropped plate.
    pub analysis: ImageU8<'a>,
    /// Colour copy of the cropped plate, when the source had colour.
    pub color: Option<&'a RgbImageU8>,
    /// Plate-level region restricting colony pixels (single-colony runs).
    pub roi: Option<&'a Region>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementOutcome {
    pub measurements: TileMatrix<TileMeasurement>,
    pub qc: GriddingReport,
}

/// Measure one tile; the scorer only sees tiles that hold a colony.
pub fn measure_tile(
    source: &MeasurementSource<'_>,
    tile: &Region,
    center: Point,
    settings: &DetectionSettings,
    scorer: &dyn TileScorer,
) -> TileMeasurement {
    let view = source.analysis.sub_view(tile);
    let roi = source.roi.map(|r| tile_roi_mask(r, tile));
    let extraction = extract_colony(&view, center, roi.as_ref(), settings);
    let columns = scorer.columns().len();
    let Some(colony) = extraction.colony.as_ref().filter(|_| extraction.size > 0) else {
        return TileMeasurement::empty(center, columns);
    };

    let color = if scorer.needs_color() {
        source.color.map(|c| c.crop(tile))
    } else {
        None
    };
    let images = TileImages {
        gray: view,
        color,
        center,
    };
    let scores = match scorer.measure(colony, &images, &extraction) {
        Ok(record) if record.values.len() == columns => record,
        Ok(record) => {
            warn!(
                "measure_tile: scorer {} returned {} values for {} columns",
                scorer.name(),
                record.values.len(),
                columns
            );
            ScoreRecord::zeroed(columns)
        }
        Err(err) => {
            warn!(
                "measure_tile: scorer {} failed on tile at ({}, {}): {err}",
                scorer.name(),
                tile.x,
                tile.y
            );
            ScoreRecord::zeroed(columns)
        }
    };
    TileMeasurement {
        colony_size: extraction.size,
        circularity: extraction.circularity,
        colony: extraction.colony,
        center,
        scores,
    }
}

/// Measure every tile in row-major order and run gridding QC.
pub fn measure_all(
    source: &MeasurementSource<'_>,
    tiles: &TileMatrix<Region>,
    consensus: &CenterConsensus,
    settings: &DetectionSettings,
    scorer: &dyn TileScorer,
) -> MeasurementOutcome {
    let measurements = tiles.map(|r, c, tile| {
        let center = consensus.center_for(r, c, tile);
        measure_tile(source, tile, center, settings, scorer)
    });
    let empty = measurements.cells().iter().filter(|m| m.is_empty()).count();
    debug!(
        "measure_all: {} tiles, {} empty, scorer={}",
        measurements.len(),
        empty,
        scorer.name()
    );
    let qc = GriddingReport::from_measurements(&measurements);
    MeasurementOutcome { measurements, qc }
}
