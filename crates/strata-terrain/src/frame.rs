//! Chunk frame arithmetic and the per-call generation request.

use std::collections::VecDeque;

use glam::IVec3;
use strata_voxel::VoxelVolume;

/// Side length of one map block in nodes. Chunk bounds derived from block
/// positions are multiples of this; the generation halo is one map block.
pub const MAP_BLOCKSIZE: i32 = 16;

/// Absolute bound on generated coordinates; used to seed running maxima.
pub const MAP_GENERATION_LIMIT: i32 = 31000;

/// The closed cuboid `[node_min, node_max]` generated in one call, plus the
/// derived full frame extended by one map block on each side for
/// boundary-safe reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkFrame {
    /// Lowest node generated.
    pub node_min: IVec3,
    /// Highest node generated (inclusive).
    pub node_max: IVec3,
}

impl ChunkFrame {
    /// Creates a frame from explicit node bounds.
    ///
    /// # Panics
    ///
    /// Panics if any axis of `node_max` is below `node_min`.
    pub fn new(node_min: IVec3, node_max: IVec3) -> Self {
        assert!(
            node_max.cmpge(node_min).all(),
            "degenerate chunk frame: {node_min} .. {node_max}"
        );
        Self { node_min, node_max }
    }

    /// Creates a frame from map-block positions (inclusive block range).
    pub fn from_blockpos(blockpos_min: IVec3, blockpos_max: IVec3) -> Self {
        Self::new(
            blockpos_min * MAP_BLOCKSIZE,
            (blockpos_max + IVec3::ONE) * MAP_BLOCKSIZE - IVec3::ONE,
        )
    }

    /// Lowest node of the halo-extended full frame.
    pub fn full_node_min(&self) -> IVec3 {
        self.node_min - IVec3::splat(MAP_BLOCKSIZE)
    }

    /// Highest node of the halo-extended full frame (inclusive).
    pub fn full_node_max(&self) -> IVec3 {
        self.node_max + IVec3::splat(MAP_BLOCKSIZE)
    }

    /// Size of the chunk along each axis.
    pub fn csize(&self) -> IVec3 {
        self.node_max - self.node_min + IVec3::ONE
    }

    /// Returns `true` if `pos` lies inside the chunk proper (not the halo).
    pub fn contains(&self, pos: IVec3) -> bool {
        pos.cmpge(self.node_min).all() && pos.cmple(self.node_max).all()
    }
}

/// One chunk generation request.
///
/// The voxel volume is borrowed for the duration of the call and must cover
/// at least the full frame; the generator never keeps a handle to it.
pub struct ChunkRequest<'a> {
    /// The cuboid to generate.
    pub frame: ChunkFrame,
    /// The node position whose emergence triggered this request. Must lie
    /// inside the chunk.
    pub requested: IVec3,
    /// The voxel volume to fill. Cells holding `IGNORE` are produced; other
    /// cells are pre-existing content and left alone except where a pass
    /// documents otherwise.
    pub vm: &'a mut VoxelVolume,
    /// Liquid cells queued for the host's liquid transformation pass.
    pub transforming_liquid: &'a mut VecDeque<IVec3>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_blockpos_spans_whole_blocks() {
        let frame = ChunkFrame::from_blockpos(IVec3::new(0, -1, 2), IVec3::new(4, 3, 6));
        assert_eq!(frame.node_min, IVec3::new(0, -16, 32));
        assert_eq!(frame.node_max, IVec3::new(79, 63, 111));
        assert_eq!(frame.csize(), IVec3::new(80, 80, 80));
    }

    #[test]
    fn test_full_frame_extends_one_block() {
        let frame = ChunkFrame::new(IVec3::new(0, -40, 0), IVec3::new(79, -1, 79));
        assert_eq!(frame.full_node_min(), IVec3::new(-16, -56, -16));
        assert_eq!(frame.full_node_max(), IVec3::new(95, 15, 95));
    }

    #[test]
    fn test_contains_is_chunk_only() {
        let frame = ChunkFrame::new(IVec3::ZERO, IVec3::splat(79));
        assert!(frame.contains(IVec3::ZERO));
        assert!(frame.contains(IVec3::splat(79)));
        assert!(!frame.contains(IVec3::new(-1, 0, 0)));
        assert!(!frame.contains(IVec3::new(0, 80, 0)));
    }

    #[test]
    #[should_panic]
    fn test_inverted_bounds_rejected() {
        let _ = ChunkFrame::new(IVec3::ZERO, IVec3::new(10, -1, 10));
    }
}
