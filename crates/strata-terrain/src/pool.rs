//! Background chunk generation with a configurable thread pool.
//!
//! Each worker owns one [`Mapgen`] instance built from the shared settings
//! and registries, keeping generation itself single-threaded per instance.
//! Tasks and results travel over bounded channels; in-flight tasks can be
//! cancelled per chunk.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use dashmap::DashMap;
use glam::IVec3;
use strata_voxel::{ContentRegistry, VoxelVolume};

use crate::biome::BiomeRegistry;
use crate::frame::{ChunkFrame, ChunkRequest};
use crate::settings::MapgenSettings;
use crate::variant::Mapgen;

/// A request to generate a single chunk.
#[derive(Clone, Copy, Debug)]
pub struct GenerationTask {
    /// The cuboid to generate.
    pub frame: ChunkFrame,
    /// Priority: lower values are generated first by schedulers that sort;
    /// typically the squared distance from the chunk to the nearest player.
    pub priority: u64,
}

/// A fully generated chunk ready for hand-off to the host.
pub struct GeneratedChunk {
    /// The frame matching the original task.
    pub frame: ChunkFrame,
    /// The generated voxel volume, covering the full frame.
    pub volume: VoxelVolume,
    /// Snapshot of the per-column heightmap.
    pub heightmap: Vec<i16>,
    /// Liquid cells queued for the host's transformation pass.
    pub transforming_liquid: VecDeque<IVec3>,
    /// Generation time in microseconds, for profiling.
    pub generation_time_us: u64,
}

/// Internal wrapper carrying the task and its cancellation flag.
struct PrioritizedTask {
    task: GenerationTask,
    cancelled: Arc<AtomicBool>,
}

/// Manages background chunk generation across a thread pool.
pub struct GenerationPool {
    task_sender: Sender<PrioritizedTask>,
    result_receiver: Receiver<GeneratedChunk>,
    /// Cancellation flag per in-flight chunk, keyed by `frame.node_min`.
    active: Arc<DashMap<IVec3, Arc<AtomicBool>>>,
    in_flight: Arc<AtomicU64>,
}

impl GenerationPool {
    /// Creates a pool with the given worker count and queue capacities.
    ///
    /// # Arguments
    /// - `thread_count`: number of worker threads, each owning a generator.
    /// - `max_concurrent`: maximum queued-plus-running tasks; excess
    ///   submissions are rejected.
    /// - `result_capacity`: bounded capacity of the completed-chunk channel.
    pub fn new(
        thread_count: usize,
        max_concurrent: usize,
        result_capacity: usize,
        settings: Arc<MapgenSettings>,
        biomes: Arc<BiomeRegistry>,
        content: Arc<ContentRegistry>,
    ) -> Self {
        let (task_sender, task_receiver) = bounded::<PrioritizedTask>(max_concurrent.max(1));
        let (result_sender, result_receiver) = bounded::<GeneratedChunk>(result_capacity.max(1));
        let in_flight = Arc::new(AtomicU64::new(0));

        for _ in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let settings = Arc::clone(&settings);
            let biomes = Arc::clone(&biomes);
            let content = Arc::clone(&content);

            std::thread::Builder::new()
                .name("terrain-gen-worker".into())
                .spawn(move || {
                    let mut mapgen = Mapgen::from_settings(settings, biomes, content);

                    while let Ok(ptask) = receiver.recv() {
                        if ptask.cancelled.load(Ordering::Relaxed) {
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let started = std::time::Instant::now();
                        let frame = ptask.task.frame;
                        let mut volume =
                            VoxelVolume::new(frame.full_node_min(), frame.full_node_max());
                        let mut transforming_liquid = VecDeque::new();
                        {
                            let mut req = ChunkRequest {
                                frame,
                                requested: frame.node_min,
                                vm: &mut volume,
                                transforming_liquid: &mut transforming_liquid,
                            };
                            mapgen.make_chunk(&mut req);
                        }
                        let elapsed = started.elapsed().as_micros() as u64;

                        if !ptask.cancelled.load(Ordering::Relaxed) {
                            let _ = sender.send(GeneratedChunk {
                                frame,
                                volume,
                                heightmap: mapgen.heightmap().to_vec(),
                                transforming_liquid,
                                generation_time_us: elapsed,
                            });
                        }

                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })
                .expect("failed to spawn terrain generation worker thread");
        }

        Self {
            task_sender,
            result_receiver,
            active: Arc::new(DashMap::new()),
            in_flight,
        }
    }

    /// Creates a pool with a worker count based on the CPU count, leaving
    /// headroom for the host's own threads.
    pub fn with_defaults(
        settings: Arc<MapgenSettings>,
        biomes: Arc<BiomeRegistry>,
        content: Arc<ContentRegistry>,
    ) -> Self {
        let cpus = num_cpus::get().max(2);
        let threads = (cpus - 2).max(1);
        Self::new(threads, 64, 128, settings, biomes, content)
    }

    /// Submits a chunk for generation.
    ///
    /// Returns `false` if the chunk is already queued or running, or if the
    /// task queue is full.
    pub fn submit(&self, task: GenerationTask) -> bool {
        let key = task.frame.node_min;
        if self.active.contains_key(&key) {
            return false;
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let ptask = PrioritizedTask {
            task,
            cancelled: Arc::clone(&cancelled),
        };

        if self.task_sender.try_send(ptask).is_err() {
            return false;
        }
        self.active.insert(key, cancelled);
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Cancels a queued or running chunk. Already completed chunks are
    /// unaffected and will still be delivered.
    pub fn cancel(&self, node_min: IVec3) {
        if let Some((_, flag)) = self.active.remove(&node_min) {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Drains all completed chunks without blocking.
    pub fn poll_completed(&self) -> Vec<GeneratedChunk> {
        let mut completed = Vec::new();
        while let Ok(chunk) = self.result_receiver.try_recv() {
            self.active.remove(&chunk.frame.node_min);
            completed.push(chunk);
        }
        completed
    }

    /// Number of tasks queued or running.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeDef;
    use strata_voxel::{ContentDef, IGNORE};

    fn world() -> (Arc<MapgenSettings>, Arc<BiomeRegistry>, Arc<ContentRegistry>) {
        let mut content = ContentRegistry::new();
        for (name, buildable_to) in [
            ("mapgen_stone", false),
            ("mapgen_water_source", true),
            ("mapgen_dirt", false),
            ("mapgen_dirt_with_grass", false),
        ] {
            content
                .register(ContentDef {
                    name: name.to_string(),
                    solid: !buildable_to,
                    buildable_to,
                })
                .unwrap();
        }

        let stone = content.id_of("mapgen_stone");
        let water = content.id_of("mapgen_water_source");
        let mut biomes = BiomeRegistry::new();
        biomes
            .register(BiomeDef {
                name: "grassland".to_string(),
                c_top: content.id_of("mapgen_dirt_with_grass"),
                c_filler: content.id_of("mapgen_dirt"),
                c_stone: stone,
                c_water: water,
                c_water_top: water,
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

        let settings = MapgenSettings {
            chunk_size: IVec3::splat(16),
            ..MapgenSettings::default()
        };
        (Arc::new(settings), Arc::new(biomes), Arc::new(content))
    }

    fn wait_for(pool: &GenerationPool, count: usize) -> Vec<GeneratedChunk> {
        let mut chunks = Vec::new();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(30);
        while chunks.len() < count {
            chunks.extend(pool.poll_completed());
            assert!(
                std::time::Instant::now() < deadline,
                "timed out waiting for {count} chunks (got {})",
                chunks.len()
            );
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        chunks
    }

    #[test]
    fn test_pool_generates_submitted_chunks() {
        let (settings, biomes, content) = world();
        let pool = GenerationPool::new(2, 16, 16, settings, biomes, content);

        let frame = ChunkFrame::new(IVec3::new(0, 0, 0), IVec3::splat(15));
        assert!(pool.submit(GenerationTask { frame, priority: 0 }));

        let chunks = wait_for(&pool, 1);
        assert_eq!(chunks[0].frame, frame);
        assert_eq!(chunks[0].heightmap.len(), 16 * 16);
        assert!(chunks[0].generation_time_us > 0);
    }

    #[test]
    fn test_duplicate_submission_rejected() {
        let (settings, biomes, content) = world();
        let pool = GenerationPool::new(1, 16, 16, settings, biomes, content);

        let frame = ChunkFrame::new(IVec3::new(0, 0, 0), IVec3::splat(15));
        assert!(pool.submit(GenerationTask { frame, priority: 0 }));
        assert!(!pool.submit(GenerationTask { frame, priority: 0 }));

        let _ = wait_for(&pool, 1);
    }

    #[test]
    fn test_pool_output_matches_direct_generation() {
        let (settings, biomes, content) = world();
        let frame = ChunkFrame::new(IVec3::new(0, -16, 0), IVec3::new(15, -1, 15));

        let pool = GenerationPool::new(2, 16, 16, settings.clone(), biomes.clone(), content.clone());
        assert!(pool.submit(GenerationTask { frame, priority: 0 }));
        let chunks = wait_for(&pool, 1);

        let mut mapgen = Mapgen::from_settings(settings, biomes, content);
        let mut volume = VoxelVolume::new(frame.full_node_min(), frame.full_node_max());
        let mut queue = VecDeque::new();
        let mut req = ChunkRequest {
            frame,
            requested: frame.node_min,
            vm: &mut volume,
            transforming_liquid: &mut queue,
        };
        mapgen.make_chunk(&mut req);

        assert_eq!(
            chunks[0].volume.cells(),
            volume.cells(),
            "pool and direct generation must agree byte for byte"
        );
        assert_eq!(chunks[0].heightmap, mapgen.heightmap());
    }

    #[test]
    fn test_cancelled_task_produces_nothing() {
        let (settings, biomes, content) = world();
        // Single worker chewing through a queue of chunks: the last task
        // stays queued long enough for cancel() to land before it starts.
        let pool = GenerationPool::new(1, 16, 16, settings, biomes, content);

        let frames: Vec<ChunkFrame> = (0..6)
            .map(|i| {
                let origin = IVec3::new(i * 160, 0, 0);
                ChunkFrame::new(origin, origin + IVec3::splat(15))
            })
            .collect();
        for frame in &frames {
            assert!(pool.submit(GenerationTask { frame: *frame, priority: 0 }));
        }
        let last = frames[5];
        pool.cancel(last.node_min);

        let chunks = wait_for(&pool, 5);
        assert!(chunks.iter().all(|c| c.frame != last));

        // Give the worker time to drain the queue, then confirm the
        // cancelled chunk never arrives.
        std::thread::sleep(std::time::Duration::from_millis(100));
        assert!(pool.poll_completed().is_empty());
    }
}
