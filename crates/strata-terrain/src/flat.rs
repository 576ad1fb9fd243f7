//! The flat mapgen variant.
//!
//! Fills stone up to a configured ground level and water up to the water
//! level, then runs the shared biome layering and dust passes. Mainly
//! useful for testing hosts and as the second member of the mapgen family.

use std::sync::Arc;

use glam::IVec3;
use strata_noise::{NoiseField, perlin_point_2d};
use strata_voxel::{AIR, ContentRegistry, IGNORE, VoxelVolume};

use crate::biome::{BiomeId, BiomeRegistry};
use crate::blocks::MapgenBlocks;
use crate::frame::ChunkRequest;
use crate::settings::MapgenSettings;
use crate::surface::{self, SurfaceContext};

/// Featureless flat terrain generator.
pub struct MapgenFlat {
    settings: Arc<MapgenSettings>,
    biomes: Arc<BiomeRegistry>,
    content: Arc<ContentRegistry>,
    blocks: MapgenBlocks,

    csize: IVec3,
    water_level: i32,
    ground_level: i32,

    noise_filler_depth: NoiseField,
    noise_heat: NoiseField,
    noise_humidity: NoiseField,

    heightmap: Vec<i16>,
    biomemap: Vec<u8>,

    node_min: IVec3,
    node_max: IVec3,
    full_node_max: IVec3,
}

impl MapgenFlat {
    /// Builds a flat generator for chunks of `settings.chunk_size`.
    ///
    /// # Panics
    ///
    /// Panics if the biome registry is empty.
    pub fn new(
        settings: Arc<MapgenSettings>,
        biomes: Arc<BiomeRegistry>,
        content: Arc<ContentRegistry>,
    ) -> Self {
        assert!(!biomes.is_empty(), "biome registry must not be empty");

        let csize = settings.chunk_size;
        let seed = settings.seed;
        let sx = csize.x as usize;
        let sz = csize.z as usize;

        Self {
            blocks: MapgenBlocks::resolve(&content),
            csize,
            water_level: settings.water_level as i32,
            ground_level: settings.flat.ground_level as i32,
            noise_filler_depth: NoiseField::new_2d(
                settings.v7.np_filler_depth.clone(),
                seed,
                sx,
                sz,
            ),
            noise_heat: NoiseField::new_2d(settings.np_biome_heat.clone(), seed, sx, sz),
            noise_humidity: NoiseField::new_2d(settings.np_biome_humidity.clone(), seed, sx, sz),
            heightmap: vec![0; sx * sz],
            biomemap: vec![0; sx * sz],
            node_min: IVec3::ZERO,
            node_max: IVec3::ZERO,
            full_node_max: IVec3::ZERO,
            settings,
            biomes,
            content,
        }
    }

    /// Per-column top-solid altitude of the most recent chunk.
    pub fn heightmap(&self) -> &[i16] {
        &self.heightmap
    }

    /// Per-column biome IDs of the most recent chunk.
    pub fn biomemap(&self) -> &[u8] {
        &self.biomemap
    }

    /// Generates one chunk into the borrowed volume.
    ///
    /// # Panics
    ///
    /// Same preconditions as the v7 generator: matching frame size,
    /// `requested` inside the chunk, volume covering the full frame.
    pub fn make_chunk(&mut self, req: &mut ChunkRequest<'_>) {
        let frame = req.frame;
        assert_eq!(
            frame.csize(),
            self.csize,
            "chunk frame size differs from generator size"
        );
        assert!(frame.contains(req.requested));
        assert!(
            req.vm.contains(frame.full_node_min()) && req.vm.contains(frame.full_node_max()),
            "voxel volume does not cover the full frame"
        );

        self.node_min = frame.node_min;
        self.node_max = frame.node_max;
        self.full_node_max = frame.full_node_max();

        if self.node_max.y >= self.water_level {
            self.noise_filler_depth.fill_2d(self.node_min.x, self.node_min.z);
            self.noise_heat.fill_2d(self.node_min.x, self.node_min.z);
            self.noise_humidity.fill_2d(self.node_min.x, self.node_min.z);
        }

        self.generate_base(req.vm);
        self.update_heightmap(req.vm);

        if self.node_max.y >= self.water_level {
            self.biomes.calc_biome_map(
                self.noise_heat.result(),
                self.noise_humidity.result(),
                &self.heightmap,
                &mut self.biomemap,
            );
        } else {
            self.biomemap.fill(0);
        }

        let ctx = self.surface_context();
        surface::apply_biome_layers(
            req.vm,
            &ctx,
            self.noise_heat.result(),
            self.noise_humidity.result(),
            self.noise_filler_depth.result(),
        );
        surface::dust_top_nodes(req.vm, &ctx, &self.biomemap);
    }

    /// The flat ground level, everywhere.
    pub fn get_ground_level_at_point(&self, _x: i32, _z: i32) -> i32 {
        self.ground_level
    }

    /// Biome at a point, from the climate noise at the flat ground level.
    pub fn get_biome_at_point(&self, p: IVec3) -> BiomeId {
        let seed = self.settings.seed;
        let heat = perlin_point_2d(&self.settings.np_biome_heat, p.x as f32, p.z as f32, seed);
        let humidity = perlin_point_2d(
            &self.settings.np_biome_humidity,
            p.x as f32,
            p.z as f32,
            seed,
        );
        self.biomes.pick(heat, humidity, self.ground_level as i16)
    }

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

    fn generate_base(&mut self, vm: &mut VoxelVolume) {
        let stone = self.blocks.stone;
        let water = self.blocks.water_source;
        let y_stride = vm.y_stride();

        for z in self.node_min.z..=self.node_max.z {
            for x in self.node_min.x..=self.node_max.x {
                let mut vi = vm.index(IVec3::new(x, self.node_min.y - 1, z));
                for y in self.node_min.y - 1..=self.node_max.y + 1 {
                    if vm.get_index(vi) == IGNORE {
                        let c = if y <= self.ground_level {
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
            }
        }
    }

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
}
