//! The mapgen variant family.
//!
//! Variants are a closed set expressed as a tagged enum over the shared
//! capability set: generate a chunk, estimate the ground level at a column,
//! and sample the biome at a point. Variants carry no shared state; each
//! member is a flat record of its own fields.

use std::sync::Arc;

use glam::IVec3;
use strata_voxel::ContentRegistry;

use crate::biome::{BiomeId, BiomeRegistry};
use crate::flat::MapgenFlat;
use crate::frame::ChunkRequest;
use crate::generator::MapgenV7;
use crate::settings::{MapgenKind, MapgenSettings};

/// One generator of the mapgen family.
pub enum Mapgen {
    /// The v7 composition pipeline.
    V7(Box<MapgenV7>),
    /// Flat ground, for testing hosts.
    Flat(MapgenFlat),
}

impl Mapgen {
    /// Builds the variant selected by `settings.kind`.
    pub fn from_settings(
        settings: Arc<MapgenSettings>,
        biomes: Arc<BiomeRegistry>,
        content: Arc<ContentRegistry>,
    ) -> Self {
        match settings.kind {
            MapgenKind::V7 => Self::V7(Box::new(MapgenV7::new(settings, biomes, content))),
            MapgenKind::Flat => Self::Flat(MapgenFlat::new(settings, biomes, content)),
        }
    }

    /// Generates one chunk into the borrowed volume.
    pub fn make_chunk(&mut self, req: &mut ChunkRequest<'_>) {
        match self {
            Self::V7(mapgen) => mapgen.make_chunk(req),
            Self::Flat(mapgen) => mapgen.make_chunk(req),
        }
    }

    /// Estimates where the ground is at a column without generating.
    pub fn get_ground_level_at_point(&self, x: i32, z: i32) -> i32 {
        match self {
            Self::V7(mapgen) => mapgen.get_ground_level_at_point(x, z),
            Self::Flat(mapgen) => mapgen.get_ground_level_at_point(x, z),
        }
    }

    /// Samples the biome at a point.
    pub fn get_biome_at_point(&self, p: IVec3) -> BiomeId {
        match self {
            Self::V7(mapgen) => mapgen.get_biome_at_point(p),
            Self::Flat(mapgen) => mapgen.get_biome_at_point(p),
        }
    }

    /// Per-column top-solid altitude of the most recent chunk. Valid only
    /// until the next `make_chunk` call on this instance.
    pub fn heightmap(&self) -> &[i16] {
        match self {
            Self::V7(mapgen) => mapgen.heightmap(),
            Self::Flat(mapgen) => mapgen.heightmap(),
        }
    }

    /// Per-column biome IDs of the most recent chunk.
    pub fn biomemap(&self) -> &[u8] {
        match self {
            Self::V7(mapgen) => mapgen.biomemap(),
            Self::Flat(mapgen) => mapgen.biomemap(),
        }
    }
}
