//! Resolution of the block names the generator writes.
//!
//! Names are resolved once at generator construction. Missing optional
//! blocks fall back along a documented chain; missing required blocks stay
//! `IGNORE` and the affected writes are inert, mirroring an incompletely
//! configured game.

use strata_voxel::{AIR, ContentId, ContentRegistry, IGNORE};

/// Content IDs the terrain pipeline and its collaborators write.
#[derive(Clone, Copy, Debug)]
pub struct MapgenBlocks {
    pub stone: ContentId,
    pub dirt: ContentId,
    pub dirt_with_grass: ContentId,
    pub sand: ContentId,
    pub water_source: ContentId,
    pub lava_source: ContentId,
    pub ice: ContentId,
    pub cobble: ContentId,
    pub desert_stone: ContentId,
    pub mossy_cobble: ContentId,
    pub sandstone_brick: ContentId,
    pub stair_cobble: ContentId,
    pub stair_sandstone: ContentId,
}

impl MapgenBlocks {
    /// Resolves the mapgen block set from the registry.
    ///
    /// Fallbacks: ice → air, mossy_cobble → cobble, sandstone_brick →
    /// desert_stone, stair_cobble → cobble, stair_sandstone →
    /// sandstone_brick (after its own fallback).
    pub fn resolve(content: &ContentRegistry) -> Self {
        let cobble = content.id_of("mapgen_cobble");
        let desert_stone = content.id_of("mapgen_desert_stone");

        let mut ice = content.id_of("mapgen_ice");
        let mut mossy_cobble = content.id_of("mapgen_mossycobble");
        let mut sandstone_brick = content.id_of("mapgen_sandstonebrick");
        let mut stair_cobble = content.id_of("mapgen_stair_cobble");
        let mut stair_sandstone = content.id_of("mapgen_stair_sandstone");

        if ice == IGNORE {
            ice = AIR;
        }
        if mossy_cobble == IGNORE {
            mossy_cobble = cobble;
        }
        if sandstone_brick == IGNORE {
            sandstone_brick = desert_stone;
        }
        if stair_cobble == IGNORE {
            stair_cobble = cobble;
        }
        if stair_sandstone == IGNORE {
            stair_sandstone = sandstone_brick;
        }

        Self {
            stone: content.id_of("mapgen_stone"),
            dirt: content.id_of("mapgen_dirt"),
            dirt_with_grass: content.id_of("mapgen_dirt_with_grass"),
            sand: content.id_of("mapgen_sand"),
            water_source: content.id_of("mapgen_water_source"),
            lava_source: content.id_of("mapgen_lava_source"),
            ice,
            cobble,
            desert_stone,
            mossy_cobble,
            sandstone_brick,
            stair_cobble,
            stair_sandstone,
        }
    }
}
