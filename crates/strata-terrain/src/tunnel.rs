//! Tubular cave carving.
//!
//! In addition to the noise-dissolved caves, a chunk occasionally receives
//! one or two tunnels: a random walk of a moving ellipsoidal carver through
//! the stone. The walk is driven entirely by a `ChaCha8Rng` seeded from the
//! chunk seed, so tunnel placement is deterministic per chunk; tunnels make
//! no attempt to line up across chunk boundaries.

use glam::{IVec3, Vec3};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use strata_voxel::{AIR, VoxelVolume};

use crate::biome::{BiomeId, BiomeRegistry};
use crate::blocks::MapgenBlocks;

/// Largest vertical half-extent of a carved blob, relative to its radius.
const VERTICAL_SQUASH: f32 = 0.6;

/// Carves one tunnel per [`carve`](Self::carve) call.
pub(crate) struct TunnelCarver<'a> {
    pub vm: &'a mut VoxelVolume,
    pub biomes: &'a BiomeRegistry,
    pub biomemap: &'a [u8],
    pub blocks: &'a MapgenBlocks,
    pub node_min: IVec3,
    pub node_max: IVec3,
    pub water_level: i32,
    pub max_stone_y: i32,
}

impl TunnelCarver<'_> {
    /// Walks one tunnel from a random start inside the chunk's stone.
    pub fn carve(&mut self, rng: &mut ChaCha8Rng) {
        if self.max_stone_y < self.node_min.y {
            return;
        }

        let top = self.max_stone_y.min(self.node_max.y);
        let mut pos = Vec3::new(
            rng.random_range(self.node_min.x..=self.node_max.x) as f32,
            rng.random_range(self.node_min.y..=top) as f32,
            rng.random_range(self.node_min.z..=self.node_max.z) as f32,
        );

        let segments = rng.random_range(8..=24);
        let mut radius: f32 = rng.random_range(2.0..5.0);
        let mut yaw: f32 = rng.random_range(0.0..std::f32::consts::TAU);
        let mut pitch: f32 = rng.random_range(-0.6..0.6);

        for _ in 0..segments {
            self.carve_blob(pos, radius);

            let step = radius * 0.75 + 1.0;
            let (sin_yaw, cos_yaw) = (libm::sinf(yaw), libm::cosf(yaw));
            let (sin_pitch, cos_pitch) = (libm::sinf(pitch), libm::cosf(pitch));
            pos += Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch) * step;

            yaw += rng.random_range(-0.5..0.5);
            pitch = (pitch + rng.random_range(-0.25..0.25)).clamp(-1.2, 1.2);
            radius = (radius + rng.random_range(-0.5..0.5)).clamp(1.5, 6.0);
        }
    }

    /// Carves one squashed ellipsoid, clamped to the chunk columns and the
    /// chunk's vertical halo rows.
    fn carve_blob(&mut self, center: Vec3, radius: f32) {
        let ry = (radius * VERTICAL_SQUASH).max(1.0);

        let x0 = ((center.x - radius).floor() as i32).max(self.node_min.x);
        let x1 = ((center.x + radius).ceil() as i32).min(self.node_max.x);
        let y0 = ((center.y - ry).floor() as i32).max(self.node_min.y - 1);
        let y1 = ((center.y + ry).ceil() as i32).min(self.node_max.y + 1);
        let z0 = ((center.z - radius).floor() as i32).max(self.node_min.z);
        let z1 = ((center.z + radius).ceil() as i32).min(self.node_max.z);

        let sx = (self.node_max.x - self.node_min.x + 1) as usize;

        for z in z0..=z1 {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let dx = (x as f32 - center.x) / radius;
                    let dy = (y as f32 - center.y) / ry;
                    let dz = (z as f32 - center.z) / radius;
                    if dx * dx + dy * dy + dz * dz > 1.0 {
                        continue;
                    }

                    let pos = IVec3::new(x, y, z);
                    let c = self.vm.get(pos);

                    let column = (z - self.node_min.z) as usize * sx
                        + (x - self.node_min.x) as usize;
                    let biome = self.biomes.get(BiomeId(self.biomemap[column]));

                    // Tunnels cut stone and the biome surface above it, but
                    // never open the volume below the water surface except
                    // through solid rock.
                    let carvable = if y <= self.water_level {
                        c == self.blocks.stone || c == biome.c_stone
                    } else {
                        c == self.blocks.stone
                            || c == biome.c_stone
                            || c == biome.c_filler
                            || c == biome.c_top
                    };
                    if carvable {
                        self.vm.set(pos, AIR);
                    }
                }
            }
        }
    }
}

/// Rolls the per-chunk tunnel count: `range(1, 2)` with probability 1/5,
/// otherwise zero.
pub(crate) fn tunnel_count(rng: &mut ChaCha8Rng) -> u32 {
    if rng.random_range(1..=5) == 1 {
        rng.random_range(1..=2)
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeDef;
    use rand::SeedableRng;
    use strata_voxel::{ContentDef, ContentRegistry, IGNORE};

    fn stone_world() -> (ContentRegistry, BiomeRegistry, MapgenBlocks) {
        let mut content = ContentRegistry::new();
        content
            .register(ContentDef {
                name: "mapgen_stone".to_string(),
                solid: true,
                buildable_to: false,
            })
            .unwrap();
        content
            .register(ContentDef {
                name: "mapgen_water_source".to_string(),
                solid: false,
                buildable_to: true,
            })
            .unwrap();
        let blocks = MapgenBlocks::resolve(&content);

        let mut biomes = BiomeRegistry::new();
        biomes
            .register(BiomeDef {
                name: "rock".to_string(),
                c_top: blocks.stone,
                c_filler: blocks.stone,
                c_stone: blocks.stone,
                c_water: blocks.water_source,
                c_water_top: blocks.water_source,
                c_dust: IGNORE,
                depth_top: 0,
                depth_filler: 0,
                depth_water_top: 0,
                heat_point: 50.0,
                humidity_point: 50.0,
                y_min: -31000,
                y_max: 31000,
            })
            .unwrap();

        (content, biomes, blocks)
    }

    #[test]
    fn test_tunnel_count_distribution() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut zero = 0;
        let mut nonzero = 0;
        for _ in 0..10_000 {
            match tunnel_count(&mut rng) {
                0 => zero += 1,
                n => {
                    assert!(n <= 2, "tunnel count out of range: {n}");
                    nonzero += 1;
                }
            }
        }
        // Expect roughly one in five chunks to have tunnels.
        assert!(nonzero > 1500 && nonzero < 2500, "unexpected rate: {nonzero}/10000");
        assert!(zero > 7000);
    }

    #[test]
    fn test_carve_is_deterministic() {
        let (_, biomes, blocks) = stone_world();
        let node_min = IVec3::new(0, 0, 0);
        let node_max = IVec3::new(31, 31, 31);
        let biomemap = vec![0u8; 32 * 32];

        let run = || {
            let mut vm =
                VoxelVolume::new(node_min - IVec3::splat(16), node_max + IVec3::splat(16));
            for z in node_min.z..=node_max.z {
                for y in node_min.y - 1..=node_max.y + 1 {
                    for x in node_min.x..=node_max.x {
                        vm.set(IVec3::new(x, y, z), blocks.stone);
                    }
                }
            }
            let mut rng = ChaCha8Rng::seed_from_u64(12345);
            let mut carver = TunnelCarver {
                vm: &mut vm,
                biomes: &biomes,
                biomemap: &biomemap,
                blocks: &blocks,
                node_min,
                node_max,
                water_level: 1,
                max_stone_y: node_max.y,
            };
            carver.carve(&mut rng);
            vm.cells().to_vec()
        };

        assert_eq!(run(), run(), "same seed must carve identical tunnels");
    }

    #[test]
    fn test_carve_stays_inside_chunk_columns() {
        let (_, biomes, blocks) = stone_world();
        let node_min = IVec3::new(0, 0, 0);
        let node_max = IVec3::new(15, 15, 15);
        let biomemap = vec![0u8; 16 * 16];

        let mut vm = VoxelVolume::new(node_min - IVec3::splat(16), node_max + IVec3::splat(16));
        for z in vm.min_edge().z..=vm.max_edge().z {
            for y in vm.min_edge().y..=vm.max_edge().y {
                for x in vm.min_edge().x..=vm.max_edge().x {
                    vm.set(IVec3::new(x, y, z), blocks.stone);
                }
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut carver = TunnelCarver {
            vm: &mut vm,
            biomes: &biomes,
            biomemap: &biomemap,
            blocks: &blocks,
            node_min,
            node_max,
            water_level: -100,
            max_stone_y: node_max.y,
        };
        for _ in 0..8 {
            carver.carve(&mut rng);
        }

        for z in vm.min_edge().z..=vm.max_edge().z {
            for y in vm.min_edge().y..=vm.max_edge().y {
                for x in vm.min_edge().x..=vm.max_edge().x {
                    let p = IVec3::new(x, y, z);
                    let in_columns = x >= node_min.x
                        && x <= node_max.x
                        && z >= node_min.z
                        && z <= node_max.z
                        && y >= node_min.y - 1
                        && y <= node_max.y + 1;
                    if !in_columns {
                        assert_eq!(vm.get(p), blocks.stone, "carve escaped the chunk at {p}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_no_start_when_no_stone_in_chunk() {
        let (_, biomes, blocks) = stone_world();
        let node_min = IVec3::new(0, 0, 0);
        let node_max = IVec3::new(15, 15, 15);
        let biomemap = vec![0u8; 16 * 16];

        let mut vm = VoxelVolume::new(node_min - IVec3::splat(16), node_max + IVec3::splat(16));
        let before = vm.cells().to_vec();

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut carver = TunnelCarver {
            vm: &mut vm,
            biomes: &biomes,
            biomemap: &biomemap,
            blocks: &blocks,
            node_min,
            node_max,
            water_level: 1,
            max_stone_y: node_min.y - 10,
        };
        carver.carve(&mut rng);

        assert_eq!(vm.cells(), &before[..], "carver must be inert without stone");
    }
}
