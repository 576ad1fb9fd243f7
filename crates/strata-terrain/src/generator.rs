//! The v7 terrain pipeline.
//!
//! A chunk is generated in a strict phase sequence: noise precomputation,
//! base stone/water/air columns, 3D mountain overlay, ridged river carving,
//! heightmap refresh, biome map, biome surface layers, caves, external
//! generators (dungeons, decorations, ores), surface dust, and the liquid
//! and lighting hand-offs. Each phase reads the previous phase's writes; no
//! phase revisits an earlier one.
//!
//! A generator instance is single-threaded: its noise caches and heightmaps
//! are owned exclusively by the calling thread and reused across chunks.

use std::sync::Arc;
use std::time::Instant;

use glam::IVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use strata_noise::{
    NoiseField, block_seed, contour, perlin_point_2d, perlin_point_2d_with_persistence,
    perlin_point_3d,
};
use strata_voxel::{AIR, ContentRegistry, IGNORE, VoxelVolume};
use tracing::debug;

use crate::biome::{BiomeId, BiomeRegistry};
use crate::blocks::MapgenBlocks;
use crate::frame::{ChunkRequest, MAP_GENERATION_LIMIT};
use crate::hooks::{DungeonParams, GenStage, GeneratorHooks};
use crate::settings::MapgenSettings;
use crate::surface::{self, SurfaceContext};
use crate::tunnel::{TunnelCarver, tunnel_count};

/// Width of the ridge channel in underwater-noise units.
const RIDGE_WIDTH: f32 = 0.2;

/// The v7 mapgen: base + mountain + ridge terrain composition.
pub struct MapgenV7 {
    settings: Arc<MapgenSettings>,
    biomes: Arc<BiomeRegistry>,
    content: Arc<ContentRegistry>,
    blocks: MapgenBlocks,
    /// External generators invoked mid-pipeline.
    pub hooks: GeneratorHooks,

    csize: IVec3,
    water_level: i32,

    noise_terrain_base: NoiseField,
    noise_terrain_alt: NoiseField,
    noise_terrain_persist: NoiseField,
    noise_height_select: NoiseField,
    noise_filler_depth: NoiseField,
    noise_mount_height: NoiseField,
    noise_ridge_uwater: NoiseField,
    noise_mountain: NoiseField,
    noise_ridge: NoiseField,
    noise_cave1: NoiseField,
    noise_cave2: NoiseField,
    noise_heat: NoiseField,
    noise_humidity: NoiseField,

    heightmap: Vec<i16>,
    ridge_heightmap: Vec<i16>,
    biomemap: Vec<u8>,

    // Valid between the start and end of one make_chunk call; readers
    // afterwards see the most recent chunk.
    node_min: IVec3,
    node_max: IVec3,
    full_node_min: IVec3,
    full_node_max: IVec3,
    block_seed: u32,
}

impl MapgenV7 {
    /// Builds a generator for chunks of `settings.chunk_size`.
    ///
    /// All noise caches and per-column maps are allocated here and reused
    /// across chunk generations.
    ///
    /// # Panics
    ///
    /// Panics if the biome registry is empty; generation requires at least
    /// one biome.
    pub fn new(
        settings: Arc<MapgenSettings>,
        biomes: Arc<BiomeRegistry>,
        content: Arc<ContentRegistry>,
    ) -> Self {
        assert!(!biomes.is_empty(), "biome registry must not be empty");

        let csize = settings.chunk_size;
        let seed = settings.seed;
        let sx = csize.x as usize;
        let sy = (csize.y + 2) as usize;
        let sz = csize.z as usize;
        let v7 = &settings.v7;

        let blocks = MapgenBlocks::resolve(&content);

        let noise_terrain_base = NoiseField::new_2d(v7.np_terrain_base.clone(), seed, sx, sz);
        let noise_terrain_alt = NoiseField::new_2d(v7.np_terrain_alt.clone(), seed, sx, sz);
        let noise_terrain_persist =
            NoiseField::new_2d(v7.np_terrain_persist.clone(), seed, sx, sz);
        let noise_height_select = NoiseField::new_2d(v7.np_height_select.clone(), seed, sx, sz);
        let noise_filler_depth = NoiseField::new_2d(v7.np_filler_depth.clone(), seed, sx, sz);
        let noise_mount_height = NoiseField::new_2d(v7.np_mount_height.clone(), seed, sx, sz);
        let noise_ridge_uwater = NoiseField::new_2d(v7.np_ridge_uwater.clone(), seed, sx, sz);
        let noise_mountain = NoiseField::new_3d(v7.np_mountain.clone(), seed, sx, sy, sz);
        let noise_ridge = NoiseField::new_3d(v7.np_ridge.clone(), seed, sx, sy, sz);
        let noise_cave1 = NoiseField::new_3d(v7.np_cave1.clone(), seed, sx, sy, sz);
        let noise_cave2 = NoiseField::new_3d(v7.np_cave2.clone(), seed, sx, sy, sz);
        let noise_heat = NoiseField::new_2d(settings.np_biome_heat.clone(), seed, sx, sz);
        let noise_humidity = NoiseField::new_2d(settings.np_biome_humidity.clone(), seed, sx, sz);

        Self {
            water_level: settings.water_level as i32,
            blocks,
            hooks: GeneratorHooks::default(),
            csize,
            noise_terrain_base,
            noise_terrain_alt,
            noise_terrain_persist,
            noise_height_select,
            noise_filler_depth,
            noise_mount_height,
            noise_ridge_uwater,
            noise_mountain,
            noise_ridge,
            noise_cave1,
            noise_cave2,
            noise_heat,
            noise_humidity,
            heightmap: vec![0; sx * sz],
            ridge_heightmap: vec![0; sx * sz],
            biomemap: vec![0; sx * sz],
            node_min: IVec3::ZERO,
            node_max: IVec3::ZERO,
            full_node_min: IVec3::ZERO,
            full_node_max: IVec3::ZERO,
            block_seed: 0,
            settings,
            biomes,
            content,
        }
    }

    /// Per-column top-solid altitude of the most recent chunk.
    pub fn heightmap(&self) -> &[i16] {
        &self.heightmap
    }

    /// Per-column lowest ridge carve of the most recent chunk.
    pub fn ridge_heightmap(&self) -> &[i16] {
        &self.ridge_heightmap
    }

    /// Per-column biome IDs of the most recent chunk.
    pub fn biomemap(&self) -> &[u8] {
        &self.biomemap
    }

    /// Generates one chunk into the borrowed volume.
    ///
    /// # Panics
    ///
    /// Panics if the frame size differs from the constructor-time chunk
    /// size, if `requested` lies outside the chunk, or if the volume does
    /// not cover the full frame.
    pub fn make_chunk(&mut self, req: &mut ChunkRequest<'_>) {
        let frame = req.frame;
        assert_eq!(
            frame.csize(),
            self.csize,
            "chunk frame size differs from generator size"
        );
        assert!(
            frame.contains(req.requested),
            "requested position {} outside chunk {:?}",
            req.requested,
            frame
        );
        assert!(
            req.vm.contains(frame.full_node_min()) && req.vm.contains(frame.full_node_max()),
            "voxel volume does not cover the full frame"
        );

        let started = Instant::now();
        self.node_min = frame.node_min;
        self.node_max = frame.node_max;
        self.full_node_min = frame.full_node_min();
        self.full_node_max = frame.full_node_max();
        self.block_seed = block_seed(self.full_node_min, self.settings.seed);

        self.calculate_noise();

        let stone_surface_max_y = self.generate_terrain(req.vm);

        self.update_heightmap(req.vm);

        if self.node_max.y >= self.water_level {
            self.biomes.calc_biome_map(
                self.noise_heat.result(),
                self.noise_humidity.result(),
                &self.heightmap,
                &mut self.biomemap,
            );
        } else {
            // The climate maps are not evaluated for fully submerged
            // chunks; pin the biome map so later passes stay deterministic.
            self.biomemap.fill(0);
        }

        let desert_stone = self.generate_biomes(req.vm);

        if self.settings.flags.caves {
            self.generate_caves(req.vm, stone_surface_max_y);
        }

        if self.settings.flags.dungeons && stone_surface_max_y >= self.node_min.y {
            if let Some(builder) = &self.hooks.dungeons {
                let params = if desert_stone {
                    DungeonParams::desert(&self.blocks)
                } else {
                    DungeonParams::normal(&self.blocks)
                };
                let mut stage = GenStage {
                    vm: &mut *req.vm,
                    heightmap: &self.heightmap,
                    ridge_heightmap: &self.ridge_heightmap,
                    biomemap: &self.biomemap,
                    node_min: self.node_min,
                    node_max: self.node_max,
                };
                builder.generate(
                    &params,
                    self.block_seed,
                    &mut stage,
                    self.full_node_min,
                    self.full_node_max,
                );
            }
        }

        if let Some(decorations) = &self.hooks.decorations {
            let mut stage = GenStage {
                vm: &mut *req.vm,
                heightmap: &self.heightmap,
                ridge_heightmap: &self.ridge_heightmap,
                biomemap: &self.biomemap,
                node_min: self.node_min,
                node_max: self.node_max,
            };
            decorations.place_all(self.block_seed, &mut stage);
        }

        if let Some(ores) = &self.hooks.ores {
            let mut stage = GenStage {
                vm: &mut *req.vm,
                heightmap: &self.heightmap,
                ridge_heightmap: &self.ridge_heightmap,
                biomemap: &self.biomemap,
                node_min: self.node_min,
                node_max: self.node_max,
            };
            ores.place_all(self.block_seed, &mut stage);
        }

        self.dust_top_nodes(req.vm);

        if let Some(liquids) = &self.hooks.liquids {
            liquids.update(
                req.transforming_liquid,
                self.full_node_min,
                self.full_node_max,
                req.vm,
            );
        }

        if self.settings.flags.light {
            if let Some(lighting) = &self.hooks.lighting {
                lighting.calc(
                    self.node_min - IVec3::new(0, 1, 0),
                    self.node_max + IVec3::new(0, 1, 0),
                    self.full_node_min,
                    self.full_node_max,
                    req.vm,
                );
            }
        }

        debug!(
            node_min = %self.node_min,
            elapsed_us = started.elapsed().as_micros() as u64,
            "generated chunk"
        );
    }

    // -----------------------------------------------------------------------
    // Noise
    // -----------------------------------------------------------------------

    fn calculate_noise(&mut self) {
        let x = self.node_min.x;
        let y = self.node_min.y - 1;
        let z = self.node_min.z;
        let v7 = &self.settings.v7;

        self.noise_terrain_persist.fill_2d(x, z);
        self.noise_terrain_base
            .fill_2d_with_persistence(x, z, self.noise_terrain_persist.result());
        self.noise_terrain_alt
            .fill_2d_with_persistence(x, z, self.noise_terrain_persist.result());
        self.noise_height_select.fill_2d(x, z);

        if self.settings.flags.caves {
            self.noise_cave1.fill_3d(x, y, z);
            self.noise_cave2.fill_3d(x, y, z);
        }

        if v7.ridges && self.node_max.y >= self.water_level {
            self.noise_ridge.fill_3d(x, y, z);
            self.noise_ridge_uwater.fill_2d(x, z);
        }

        if v7.mountains && self.node_max.y >= 0 {
            self.noise_mountain.fill_3d(x, y, z);
            self.noise_mount_height.fill_2d(x, z);
        }

        if self.node_max.y >= self.water_level {
            self.noise_filler_depth.fill_2d(x, z);
            self.noise_heat.fill_2d(x, z);
            self.noise_humidity.fill_2d(x, z);
        }
    }

    /// Blend of the base and alt surfaces, selected per column.
    fn base_terrain_level_from_map(&self, index: usize) -> f32 {
        let hselect = self.noise_height_select.result()[index].clamp(0.0, 1.0);
        let height_base = self.noise_terrain_base.result()[index];
        let height_alt = self.noise_terrain_alt.result()[index];

        if height_alt > height_base {
            return height_alt;
        }
        height_base * hselect + height_alt * (1.0 - hselect)
    }

    /// Point form of [`base_terrain_level_from_map`](Self::base_terrain_level_from_map).
    fn base_terrain_level_at_point(&self, x: i32, z: i32) -> f32 {
        let seed = self.settings.seed;
        let v7 = &self.settings.v7;
        let (xf, zf) = (x as f32, z as f32);

        let hselect =
            perlin_point_2d(&v7.np_height_select, xf, zf, seed).clamp(0.0, 1.0);
        let persist = perlin_point_2d(&v7.np_terrain_persist, xf, zf, seed);

        let height_base =
            perlin_point_2d_with_persistence(&v7.np_terrain_base, xf, zf, seed, persist);
        let height_alt =
            perlin_point_2d_with_persistence(&v7.np_terrain_alt, xf, zf, seed, persist);

        if height_alt > height_base {
            return height_alt;
        }
        height_base * hselect + height_alt * (1.0 - hselect)
    }

    fn mountain_terrain_from_map(&self, idx_xyz: usize, idx_xz: usize, y: i32) -> bool {
        let mount_h = self.noise_mount_height.result()[idx_xz];
        let mount = self.noise_mountain.result()[idx_xyz];
        mount * mount_h >= y as f32
    }

    fn mountain_terrain_at_point(&self, x: i32, y: i32, z: i32) -> bool {
        let seed = self.settings.seed;
        let v7 = &self.settings.v7;
        let mount_h = perlin_point_2d(&v7.np_mount_height, x as f32, z as f32, seed);
        let mount = perlin_point_3d(&v7.np_mountain, x as f32, y as f32, z as f32, seed);
        mount * mount_h >= y as f32
    }

    // -----------------------------------------------------------------------
    // Terrain
    // -----------------------------------------------------------------------

    fn generate_terrain(&mut self, vm: &mut VoxelVolume) -> i32 {
        let mut ymax = self.generate_base_terrain(vm);

        if self.settings.v7.mountains {
            ymax = self.generate_mountain_terrain(vm, ymax);
        }
        if self.settings.v7.ridges {
            self.generate_ridge_terrain(vm);
        }

        ymax
    }

    fn generate_base_terrain(&mut self, vm: &mut VoxelVolume) -> i32 {
        let stone = self.blocks.stone;
        let water = self.blocks.water_source;
        let y_stride = vm.y_stride();
        let mut stone_surface_max_y = -MAP_GENERATION_LIMIT;
        let mut index = 0usize;

        for z in self.node_min.z..=self.node_max.z {
            for x in self.node_min.x..=self.node_max.x {
                let surface_height = self.base_terrain_level_from_map(index);
                let surface_y = surface_height.floor() as i32;

                self.heightmap[index] = surface_y as i16;
                self.ridge_heightmap[index] = surface_y as i16;
                if surface_y > stone_surface_max_y {
                    stone_surface_max_y = surface_y;
                }

                let mut vi = vm.index(IVec3::new(x, self.node_min.y - 1, z));
                for y in self.node_min.y - 1..=self.node_max.y + 1 {
                    if vm.get_index(vi) == IGNORE {
                        let c = if y <= surface_y {
                            stone
                        } else if y <= self.water_level {
                            water
                        } else {
                            AIR
                        };
                        vm.set_index(vi, c);
                    }
                    vi += y_stride;
                }
                index += 1;
            }
        }

        stone_surface_max_y
    }

    fn generate_mountain_terrain(&self, vm: &mut VoxelVolume, mut ymax: i32) -> i32 {
        if self.node_max.y < 0 {
            return ymax;
        }

        let stone = self.blocks.stone;
        let water = self.blocks.water_source;
        let sx = self.csize.x as usize;
        let mut j = 0usize;

        for z in self.node_min.z..=self.node_max.z {
            for y in self.node_min.y - 1..=self.node_max.y + 1 {
                let mut vi = vm.index(IVec3::new(self.node_min.x, y, z));
                for x in self.node_min.x..=self.node_max.x {
                    let index = (z - self.node_min.z) as usize * sx
                        + (x - self.node_min.x) as usize;
                    let c = vm.get_index(vi);

                    if self.mountain_terrain_from_map(j, index, y) && (c == AIR || c == water) {
                        vm.set_index(vi, stone);
                        if y > ymax {
                            ymax = y;
                        }
                    }

                    vi += 1;
                    j += 1;
                }
            }
        }

        ymax
    }

    fn generate_ridge_terrain(&mut self, vm: &mut VoxelVolume) {
        if self.node_max.y < self.water_level {
            return;
        }

        let water = self.blocks.water_source;
        let sx = self.csize.x as usize;
        let mut index = 0usize;

        for z in self.node_min.z..=self.node_max.z {
            for y in self.node_min.y - 1..=self.node_max.y + 1 {
                let mut vi = vm.index(IVec3::new(self.node_min.x, y, z));
                for x in self.node_min.x..=self.node_max.x {
                    let idx_xyz = index;
                    let cvi = vi;
                    index += 1;
                    vi += 1;

                    let j = (z - self.node_min.z) as usize * sx
                        + (x - self.node_min.x) as usize;

                    if (self.heightmap[j] as i32) < self.water_level - 16 {
                        continue;
                    }

                    let uwatern = self.noise_ridge_uwater.result()[j] * 2.0;
                    if uwatern.abs() > RIDGE_WIDTH {
                        continue;
                    }

                    let altitude = (y - self.water_level) as f32;
                    let height_mod = (altitude + 17.0) / 2.5;
                    let width_mod = RIDGE_WIDTH - uwatern.abs();
                    let nridge =
                        self.noise_ridge.result()[idx_xyz] * altitude.max(0.0) / 7.0;

                    if nridge + width_mod * height_mod < 0.6 {
                        continue;
                    }

                    if (y as i16) < self.ridge_heightmap[j] {
                        self.ridge_heightmap[j] = (y - 1) as i16;
                    }

                    vm.set_index(cvi, if y > self.water_level { AIR } else { water });
                }
            }
        }
    }

    /// Re-derives the heightmap after carving removed material: per column,
    /// the highest solid cell in the chunk, or `node_min.y - 1` if none.
    /// Liquids do not count as ground.
    fn update_heightmap(&mut self, vm: &VoxelVolume) {
        let y_stride = vm.y_stride();
        let mut index = 0usize;

        for z in self.node_min.z..=self.node_max.z {
            for x in self.node_min.x..=self.node_max.x {
                let mut found = self.node_min.y - 1;
                let mut vi = vm.index(IVec3::new(x, self.node_max.y, z));
                let mut y = self.node_max.y;
                while y >= self.node_min.y {
                    let c = vm.get_index(vi);
                    if c != AIR && c != IGNORE && self.content.get(c).solid {
                        found = y;
                        break;
                    }
                    vi -= y_stride;
                    y -= 1;
                }
                self.heightmap[index] = found as i16;
                index += 1;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Surface and caves
    // -----------------------------------------------------------------------

    fn surface_context(&self) -> SurfaceContext<'_> {
        SurfaceContext {
            biomes: &self.biomes,
            content: &self.content,
            blocks: &self.blocks,
            water_level: self.water_level,
            node_min: self.node_min,
            node_max: self.node_max,
            full_node_max_y: self.full_node_max.y,
        }
    }

    fn generate_biomes(&self, vm: &mut VoxelVolume) -> bool {
        surface::apply_biome_layers(
            vm,
            &self.surface_context(),
            self.noise_heat.result(),
            self.noise_humidity.result(),
            self.noise_filler_depth.result(),
        )
    }

    fn dust_top_nodes(&self, vm: &mut VoxelVolume) {
        surface::dust_top_nodes(vm, &self.surface_context(), &self.biomemap);
    }

    fn generate_caves(&self, vm: &mut VoxelVolume, max_stone_y: i32) {
        if max_stone_y >= self.node_min.y {
            let stone = self.blocks.stone;
            let sx = self.csize.x as usize;
            let sy = (self.csize.y + 2) as usize;
            let cave1 = self.noise_cave1.result();
            let cave2 = self.noise_cave2.result();

            for z in self.node_min.z..=self.node_max.z {
                let z_off = (z - self.node_min.z) as usize;
                for y in self.node_min.y - 1..=self.node_max.y + 1 {
                    let y_off = (y - (self.node_min.y - 1)) as usize;
                    let mut vi = vm.index(IVec3::new(self.node_min.x, y, z));
                    for x in self.node_min.x..=self.node_max.x {
                        let x_off = (x - self.node_min.x) as usize;
                        let idx_xyz = (z_off * sy + y_off) * sx + x_off;
                        let idx_xz = z_off * sx + x_off;
                        let cvi = vi;
                        vi += 1;

                        let biome = self.biomes.get(BiomeId(self.biomemap[idx_xz]));
                        let c = vm.get_index(cvi);
                        if c == AIR
                            || (y <= self.water_level && c != biome.c_stone && c != stone)
                        {
                            continue;
                        }

                        let d1 = contour(cave1[idx_xyz]);
                        let d2 = contour(cave2[idx_xyz]);
                        if d1 * d2 > 0.3 {
                            vm.set_index(cvi, AIR);
                        }
                    }
                }
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64((self.block_seed ^ 21343) as u64);
        let count = tunnel_count(&mut rng);
        if count > 0 {
            let mut carver = TunnelCarver {
                vm,
                biomes: &self.biomes,
                biomemap: &self.biomemap,
                blocks: &self.blocks,
                node_min: self.node_min,
                node_max: self.node_max,
                water_level: self.water_level,
                max_stone_y,
            };
            for _ in 0..count {
                carver.carve(&mut rng);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Point queries
    // -----------------------------------------------------------------------

    /// Quick upper-bound estimate of the ground level at a column, without
    /// generating a chunk. River channels short-circuit to
    /// `water_level − 10`; otherwise the mountain surface is probed upward
    /// from the base level, at most 128 steps.
    pub fn get_ground_level_at_point(&self, x: i32, z: i32) -> i32 {
        let mut y = self.base_terrain_level_at_point(x, z).floor() as i32;

        // Computing the true depth of a ridge is much more expensive; if
        // inside a river channel, simply guess.
        let uwatern = perlin_point_2d(
            &self.settings.v7.np_ridge_uwater,
            x as f32,
            z as f32,
            self.settings.seed,
        ) * 2.0;
        if uwatern.abs() <= RIDGE_WIDTH {
            return self.water_level - 10;
        }

        for _ in 0..128 {
            if !self.mountain_terrain_at_point(x, y, z) {
                return y;
            }
            y += 1;
        }
        y
    }

    /// Biome at a point, from the climate noise and the base terrain level.
    pub fn get_biome_at_point(&self, p: IVec3) -> BiomeId {
        let seed = self.settings.seed;
        let heat = perlin_point_2d(&self.settings.np_biome_heat, p.x as f32, p.z as f32, seed);
        let humidity = perlin_point_2d(
            &self.settings.np_biome_humidity,
            p.x as f32,
            p.z as f32,
            seed,
        );
        let ground_level = self.base_terrain_level_at_point(p.x, p.z).floor() as i16;
        self.biomes.pick(heat, humidity, ground_level)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeDef;
    use crate::frame::ChunkFrame;
    use std::collections::VecDeque;
    use strata_voxel::ContentDef;

    fn small_settings() -> MapgenSettings {
        MapgenSettings {
            chunk_size: IVec3::splat(16),
            ..MapgenSettings::default()
        }
    }

    fn world(
        settings: MapgenSettings,
    ) -> (Arc<MapgenSettings>, Arc<BiomeRegistry>, Arc<ContentRegistry>) {
        let mut content = ContentRegistry::new();
        for (name, buildable_to) in [
            ("mapgen_stone", false),
            ("mapgen_water_source", true),
            ("mapgen_dirt", false),
            ("mapgen_dirt_with_grass", false),
            ("mapgen_sand", false),
        ] {
            content
                .register(ContentDef {
                    name: name.to_string(),
                    solid: !buildable_to,
                    buildable_to,
                })
                .unwrap();
        }

        let blocks = MapgenBlocks::resolve(&content);
        let mut biomes = BiomeRegistry::new();
        biomes
            .register(BiomeDef {
                name: "grassland".to_string(),
                c_top: content.id_of("mapgen_dirt_with_grass"),
                c_filler: content.id_of("mapgen_dirt"),
                c_stone: blocks.stone,
                c_water: blocks.water_source,
                c_water_top: blocks.water_source,
                c_dust: IGNORE,
                depth_top: 1,
                depth_filler: 2,
                depth_water_top: 0,
                heat_point: 50.0,
                humidity_point: 50.0,
                y_min: -31000,
                y_max: 31000,
            })
            .unwrap();

        (Arc::new(settings), Arc::new(biomes), Arc::new(content))
    }

    fn generate(
        mapgen: &mut MapgenV7,
        frame: ChunkFrame,
    ) -> (VoxelVolume, Vec<i16>, Vec<i16>) {
        let mut vm = VoxelVolume::new(frame.full_node_min(), frame.full_node_max());
        let mut queue = VecDeque::new();
        let mut req = ChunkRequest {
            frame,
            requested: frame.node_min,
            vm: &mut vm,
            transforming_liquid: &mut queue,
        };
        mapgen.make_chunk(&mut req);
        let heights = mapgen.heightmap().to_vec();
        let ridges = mapgen.ridge_heightmap().to_vec();
        (vm, heights, ridges)
    }

    #[test]
    fn test_map_and_point_base_level_agree() {
        let (settings, biomes, content) = world(small_settings());
        let mut mapgen = MapgenV7::new(settings, biomes, content);
        let frame = ChunkFrame::new(IVec3::new(0, 0, 0), IVec3::splat(15));
        let _ = generate(&mut mapgen, frame);

        for z in 0..16 {
            for x in 0..16 {
                let index = z * 16 + x;
                let from_map = mapgen.base_terrain_level_from_map(index);
                let at_point = mapgen.base_terrain_level_at_point(x as i32, z as i32);
                assert_eq!(
                    from_map, at_point,
                    "map and point base level disagree at ({x}, {z})"
                );
            }
        }
    }

    #[test]
    fn test_make_chunk_is_deterministic() {
        let (settings, biomes, content) = world(small_settings());
        let frame = ChunkFrame::new(IVec3::new(0, -16, 0), IVec3::new(15, -1, 15));

        let mut gen_a = MapgenV7::new(settings.clone(), biomes.clone(), content.clone());
        let (vm_a, h_a, r_a) = generate(&mut gen_a, frame);

        let mut gen_b = MapgenV7::new(settings, biomes, content);
        let (vm_b, h_b, r_b) = generate(&mut gen_b, frame);

        assert_eq!(vm_a.cells(), vm_b.cells(), "volumes must be byte-identical");
        assert_eq!(h_a, h_b);
        assert_eq!(r_a, r_b);
    }

    #[test]
    fn test_reused_instance_matches_fresh_instance() {
        let (settings, biomes, content) = world(small_settings());
        let frame_far = ChunkFrame::new(IVec3::new(160, 0, 160), IVec3::new(175, 15, 175));
        let frame = ChunkFrame::new(IVec3::new(0, 0, 0), IVec3::splat(15));

        let mut reused = MapgenV7::new(settings.clone(), biomes.clone(), content.clone());
        let _ = generate(&mut reused, frame_far);
        let (vm_reused, ..) = generate(&mut reused, frame);

        let mut fresh = MapgenV7::new(settings, biomes, content);
        let (vm_fresh, ..) = generate(&mut fresh, frame);

        assert_eq!(
            vm_reused.cells(),
            vm_fresh.cells(),
            "cache reuse must not leak state between chunks"
        );
    }

    #[test]
    fn test_ridge_heightmap_never_above_heightmap() {
        let (settings, biomes, content) = world(small_settings());
        let mut mapgen = MapgenV7::new(settings, biomes, content);
        let frame = ChunkFrame::new(IVec3::new(0, 0, 0), IVec3::splat(15));
        let (_, heights, ridges) = generate(&mut mapgen, frame);

        for i in 0..heights.len() {
            assert!(
                ridges[i] <= heights[i],
                "ridge height {} above height {} at column {i}",
                ridges[i],
                heights[i]
            );
        }
    }

    #[test]
    fn test_river_short_circuit_in_ground_level_probe() {
        let (settings, biomes, content) = world(small_settings());
        let mapgen = MapgenV7::new(settings.clone(), biomes, content);

        // Find a column inside a river channel and one outside it.
        let mut in_river = None;
        for x in 0..2000 {
            let uwatern = perlin_point_2d(
                &settings.v7.np_ridge_uwater,
                x as f32,
                0.0,
                settings.seed,
            ) * 2.0;
            if uwatern.abs() <= RIDGE_WIDTH {
                in_river = Some(x);
                break;
            }
        }
        let x = in_river.expect("no river column found in 2000 samples");
        assert_eq!(
            mapgen.get_ground_level_at_point(x, 0),
            settings.water_level as i32 - 10
        );
    }

    #[test]
    #[should_panic(expected = "frame size")]
    fn test_mismatched_frame_size_panics() {
        let (settings, biomes, content) = world(small_settings());
        let mut mapgen = MapgenV7::new(settings, biomes, content);
        let frame = ChunkFrame::new(IVec3::ZERO, IVec3::splat(31));
        let _ = generate(&mut mapgen, frame);
    }
}
