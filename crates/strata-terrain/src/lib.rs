//! Deterministic seeded voxel terrain generation.
//!
//! The crate centers on the v7 pipeline: fractal-noise base terrain blended
//! per column, a 3D mountain overlay, ridged river carving, biome surface
//! layering, cave carving, and surface dust, with hand-off points for the
//! host's dungeon, decoration, ore, liquid, and lighting generators.
//! Identical inputs always produce identical output bytes, and adjacent
//! chunks generated independently seam together.

pub mod biome;
pub mod blocks;
pub mod flat;
pub mod frame;
pub mod generator;
pub mod hooks;
pub mod pool;
pub mod settings;
mod surface;
mod tunnel;
pub mod variant;

pub use biome::{BiomeDef, BiomeId, BiomeRegistry, BiomeRegistryError};
pub use blocks::MapgenBlocks;
pub use flat::MapgenFlat;
pub use frame::{ChunkFrame, ChunkRequest, MAP_BLOCKSIZE, MAP_GENERATION_LIMIT};
pub use generator::MapgenV7;
pub use hooks::{
    DecorationPlacer, DungeonBuilder, DungeonParams, GenNotifyType, GenStage, GeneratorHooks,
    LightingPass, LiquidPass, OrePlacer,
};
pub use pool::{GeneratedChunk, GenerationPool, GenerationTask};
pub use settings::{
    MapgenFlags, MapgenFlatParams, MapgenKind, MapgenSettings, MapgenV7Params, SettingsError,
};
pub use variant::Mapgen;
