//! Biome surface layering and surface dust.
//!
//! Both passes scan columns top-down over the freshly generated volume.
//! They are shared by the mapgen variants: the v7 pipeline runs them after
//! ridge carving, the flat generator right after its base fill.

use glam::IVec3;
use strata_voxel::{AIR, ContentRegistry, IGNORE, VoxelVolume};

use crate::biome::{BiomeId, BiomeRegistry};
use crate::blocks::MapgenBlocks;

/// Shared inputs of the surface passes.
pub(crate) struct SurfaceContext<'a> {
    pub biomes: &'a BiomeRegistry,
    pub content: &'a ContentRegistry,
    pub blocks: &'a MapgenBlocks,
    pub water_level: i32,
    pub node_min: IVec3,
    pub node_max: IVec3,
    pub full_node_max_y: i32,
}

/// Replaces generated stone and water with biome-specific blocks.
///
/// Per column, a top-down scan tracks whether the current cell is exposed
/// (`have_air`) and how many surface blocks the current exposure already
/// received (`nplaced`). Exposed stone with solid support becomes
/// `depth_top` top blocks, then filler, then biome stone; stone over an air
/// gap is an overhang floor and becomes biome stone directly. Water becomes
/// `c_water_top` within `depth_water_top` of the water surface, `c_water`
/// below, and leaves the column "exposed" so shelves under water get capped.
///
/// Returns whether any sampled biome uses desert stone, which selects the
/// desert dungeon preset.
pub(crate) fn apply_biome_layers(
    vm: &mut VoxelVolume,
    ctx: &SurfaceContext<'_>,
    heat_map: &[f32],
    humidity_map: &[f32],
    filler_depth_map: &[f32],
) -> bool {
    if (ctx.node_max.y as i32) < ctx.water_level {
        return false;
    }

    let y_stride = vm.y_stride();
    let mut desert_stone = false;
    let mut index = 0usize;

    for z in ctx.node_min.z..=ctx.node_max.z {
        for x in ctx.node_min.x..=ctx.node_max.x {
            let mut biome = None;
            let mut y0_top = 0i16;
            let mut y0_filler = 0i16;
            let mut depth_water_top = 0i16;
            let mut nplaced = 0i16;

            let mut vi = vm.index(IVec3::new(x, ctx.node_max.y, z));
            let c_above = vm.get_index(vi + y_stride);
            let mut have_air = c_above == AIR;

            for y in (ctx.node_min.y..=ctx.node_max.y).rev() {
                let c = vm.get_index(vi);

                // Entering a new solid run: sample the biome at this depth.
                if c != IGNORE && c != AIR && (y == ctx.node_max.y || have_air) {
                    let b = ctx
                        .biomes
                        .get(ctx.biomes.pick(heat_map[index], humidity_map[index], y as i16));
                    y0_top = b.depth_top;
                    y0_filler = b.depth_top + b.depth_filler + filler_depth_map[index] as i16;
                    depth_water_top = b.depth_water_top;
                    if b.c_stone == ctx.blocks.desert_stone {
                        desert_stone = true;
                    }
                    biome = Some(b);
                }

                if c == ctx.blocks.stone {
                    if let Some(b) = biome {
                        if have_air {
                            let c_below = vm.get_index(vi - y_stride);
                            if c_below != AIR {
                                if nplaced < y0_top {
                                    vm.set_index(vi, b.c_top);
                                    nplaced += 1;
                                } else if nplaced < y0_filler {
                                    vm.set_index(vi, b.c_filler);
                                    nplaced += 1;
                                } else {
                                    have_air = false;
                                    nplaced = 0;
                                    vm.set_index(vi, b.c_stone);
                                }
                            } else {
                                // Overhang floor, not a surface top.
                                have_air = false;
                                nplaced = 0;
                                vm.set_index(vi, b.c_stone);
                            }
                        } else {
                            nplaced = 0;
                            vm.set_index(vi, b.c_stone);
                        }
                    }
                } else if c == ctx.blocks.water_source {
                    have_air = true;
                    nplaced = 0;
                    if let Some(b) = biome {
                        if y > ctx.water_level - depth_water_top as i32 {
                            vm.set_index(vi, b.c_water_top);
                        } else {
                            vm.set_index(vi, b.c_water);
                        }
                    }
                } else if c == AIR {
                    have_air = true;
                    nplaced = 0;
                }

                vi -= y_stride;
            }
            index += 1;
        }
    }

    desert_stone
}

/// Sprinkles biome dust (e.g. snow) one cell above exposed surfaces.
///
/// The scan starts at the top of the halo: an `AIR` halo top means the sky
/// is open; an `IGNORE` halo top falls back to the chunk top provided the
/// cell above it is air; anything else is a solid roof and skips the column.
pub(crate) fn dust_top_nodes(vm: &mut VoxelVolume, ctx: &SurfaceContext<'_>, biomemap: &[u8]) {
    if (ctx.node_max.y as i32) < ctx.water_level {
        return;
    }

    let y_stride = vm.y_stride();
    let sx = (ctx.node_max.x - ctx.node_min.x + 1) as usize;

    for z in ctx.node_min.z..=ctx.node_max.z {
        for x in ctx.node_min.x..=ctx.node_max.x {
            let index =
                (z - ctx.node_min.z) as usize * sx + (x - ctx.node_min.x) as usize;
            let biome = ctx.biomes.get(BiomeId(biomemap[index]));
            if biome.c_dust == IGNORE {
                continue;
            }

            let c_full_max = vm.get(IVec3::new(x, ctx.full_node_max_y, z));
            let y_start = if c_full_max == AIR {
                ctx.full_node_max_y - 1
            } else if c_full_max == IGNORE {
                let c_max = vm.get(IVec3::new(x, ctx.node_max.y + 1, z));
                if c_max == AIR {
                    ctx.node_max.y
                } else {
                    continue;
                }
            } else {
                continue;
            };

            let mut vi = vm.index(IVec3::new(x, y_start, z));
            let mut y = y_start;
            while y >= ctx.node_min.y - 1 {
                if vm.get_index(vi) != AIR {
                    break;
                }
                vi -= y_stride;
                y -= 1;
            }

            let c = vm.get_index(vi);
            if c != IGNORE && c != biome.c_dust && !ctx.content.get(c).buildable_to {
                vm.set_index(vi + y_stride, biome.c_dust);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
