//! Interfaces to the external generators the core invokes.
//!
//! Dungeons, decorations, ores, liquid transformation, and lighting are
//! collaborators with their own algorithms; the core calls them at fixed
//! points in the phase sequence with known parameters. All hooks are
//! optional — an absent hook skips its phase.

use std::collections::VecDeque;

use glam::IVec3;
use strata_noise::NoiseParams;
use strata_voxel::{ContentId, VoxelVolume};

use crate::blocks::MapgenBlocks;

/// Mid-generation view handed to external generators: the borrowed volume
/// plus the bookkeeping of the phases that already ran.
pub struct GenStage<'a> {
    /// The voxel volume being generated.
    pub vm: &'a mut VoxelVolume,
    /// Per-column top-solid altitude, settled after ridge carving.
    pub heightmap: &'a [i16],
    /// Per-column lowest ridge carve, `<= heightmap` everywhere.
    pub ridge_heightmap: &'a [i16],
    /// Per-column biome IDs.
    pub biomemap: &'a [u8],
    /// Lowest node of the chunk.
    pub node_min: IVec3,
    /// Highest node of the chunk (inclusive).
    pub node_max: IVec3,
}

/// Host notification channel for a placed dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenNotifyType {
    /// A regular cobble dungeon.
    Dungeon,
    /// A desert temple.
    Temple,
}

/// Parameters for one dungeon generation run.
#[derive(Clone, Debug)]
pub struct DungeonParams {
    pub c_water: ContentId,
    pub c_cobble: ContentId,
    pub c_moss: ContentId,
    pub c_stair: ContentId,

    /// Corridors may run diagonally.
    pub diagonal_dirs: bool,
    /// Ratio of mossy to plain wall blocks.
    pub moss_ratio: f32,
    /// Size of corridor holes cut between rooms.
    pub hole_size: IVec3,
    /// Extra room size margin beyond the minimum.
    pub room_size: IVec3,
    /// What to announce to the host when placed.
    pub notify_type: GenNotifyType,

    pub np_rarity: NoiseParams,
    pub np_density: NoiseParams,
    pub np_wetness: NoiseParams,
}

impl DungeonParams {
    fn base(blocks: &MapgenBlocks) -> Self {
        Self {
            c_water: blocks.water_source,
            c_cobble: blocks.cobble,
            c_moss: blocks.mossy_cobble,
            c_stair: blocks.stair_cobble,
            diagonal_dirs: false,
            moss_ratio: 3.0,
            hole_size: IVec3::new(1, 2, 1),
            room_size: IVec3::ZERO,
            notify_type: GenNotifyType::Dungeon,
            np_rarity: NoiseParams::new(0.0, 1.0, glam::Vec3::splat(500.0), 0, 2, 0.8, 2.0),
            np_density: NoiseParams::new(0.0, 1.0, glam::Vec3::splat(500.0), 0, 2, 0.8, 2.0),
            np_wetness: NoiseParams::new(0.0, 1.0, glam::Vec3::splat(40.0), 32474, 4, 1.1, 2.0),
        }
    }

    /// The regular cobble dungeon preset.
    pub fn normal(blocks: &MapgenBlocks) -> Self {
        Self::base(blocks)
    }

    /// The desert temple preset, used where desert stone was observed.
    pub fn desert(blocks: &MapgenBlocks) -> Self {
        Self {
            c_cobble: blocks.sandstone_brick,
            // Should become cracked sandstone once the game registers one.
            c_moss: blocks.sandstone_brick,
            c_stair: blocks.stair_sandstone,
            diagonal_dirs: true,
            moss_ratio: 0.0,
            hole_size: IVec3::new(2, 3, 2),
            room_size: IVec3::new(2, 5, 2),
            notify_type: GenNotifyType::Temple,
            ..Self::base(blocks)
        }
    }
}

/// Places dungeons into the full frame.
pub trait DungeonBuilder: Send {
    fn generate(
        &self,
        params: &DungeonParams,
        block_seed: u32,
        stage: &mut GenStage<'_>,
        full_node_min: IVec3,
        full_node_max: IVec3,
    );
}

/// Places registered decorations (trees, plants) onto the chunk surface.
pub trait DecorationPlacer: Send {
    fn place_all(&self, block_seed: u32, stage: &mut GenStage<'_>);
}

/// Places registered ores into generated stone.
pub trait OrePlacer: Send {
    fn place_all(&self, block_seed: u32, stage: &mut GenStage<'_>);
}

/// Collects liquid cells that need the host's transformation pass.
pub trait LiquidPass: Send {
    fn update(
        &self,
        queue: &mut VecDeque<IVec3>,
        full_node_min: IVec3,
        full_node_max: IVec3,
        vm: &mut VoxelVolume,
    );
}

/// Propagates light over the generated chunk.
pub trait LightingPass: Send {
    fn calc(
        &self,
        node_min: IVec3,
        node_max: IVec3,
        full_node_min: IVec3,
        full_node_max: IVec3,
        vm: &mut VoxelVolume,
    );
}

/// The optional external generators a mapgen instance invokes.
#[derive(Default)]
pub struct GeneratorHooks {
    pub dungeons: Option<Box<dyn DungeonBuilder>>,
    pub decorations: Option<Box<dyn DecorationPlacer>>,
    pub ores: Option<Box<dyn OrePlacer>>,
    pub liquids: Option<Box<dyn LiquidPass>>,
    pub lighting: Option<Box<dyn LightingPass>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_voxel::{ContentDef, ContentRegistry};

    fn blocks() -> MapgenBlocks {
        let mut reg = ContentRegistry::new();
        for name in [
            "mapgen_stone",
            "mapgen_water_source",
            "mapgen_cobble",
            "mapgen_mossycobble",
            "mapgen_desert_stone",
            "mapgen_sandstonebrick",
        ] {
            reg.register(ContentDef {
                name: name.to_string(),
                solid: true,
                buildable_to: false,
            })
            .unwrap();
        }
        MapgenBlocks::resolve(&reg)
    }

    #[test]
    fn test_normal_preset_uses_cobble() {
        let b = blocks();
        let params = DungeonParams::normal(&b);
        assert_eq!(params.c_cobble, b.cobble);
        assert_eq!(params.c_moss, b.mossy_cobble);
        assert!(!params.diagonal_dirs);
        assert_eq!(params.notify_type, GenNotifyType::Dungeon);
        assert_eq!(params.moss_ratio, 3.0);
    }

    #[test]
    fn test_desert_preset_is_mossless_and_diagonal() {
        let b = blocks();
        let params = DungeonParams::desert(&b);
        assert_eq!(params.c_cobble, b.sandstone_brick);
        assert_eq!(params.c_moss, b.sandstone_brick);
        assert!(params.diagonal_dirs);
        assert_eq!(params.moss_ratio, 0.0);
        assert_eq!(params.hole_size, IVec3::new(2, 3, 2));
        assert_eq!(params.room_size, IVec3::new(2, 5, 2));
        assert_eq!(params.notify_type, GenNotifyType::Temple);
    }
}
