//! Colony localisation inside tiles.
//!
//! - [`threshold`]: per-tile foreground segmentation.
//! - [`particles`]: 8-connected components with shape descriptors.
//! - [`locate`]: colony center of a single tile.
//! - [`consensus`]: per-row/per-column median re-centering across the plate.
mod accumulator;
pub mod consensus;
pub mod locate;
pub mod particles;
pub mod threshold;

pub use self::consensus::CenterConsensus;
pub use self::locate::{
    largest_particle, locate_all, locate_center, tile_particles, tile_roi_mask, LocatorParams,
};
pub use self::particles::{crofton_perimeter, find_particles, Particle};
pub use self::threshold::{threshold_tile, ThresholdMethod};
