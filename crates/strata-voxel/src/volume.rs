//! Dense voxel volume over a closed integer cuboid.
//!
//! The volume is allocated once by the host, filled with `IGNORE`, and lent
//! to a generator for the duration of one chunk generation. Cells are laid
//! out x-fastest, then y, then z, so vertical column scans step by a fixed
//! stride instead of recomputing indices.

use glam::IVec3;

use crate::registry::{ContentId, IGNORE};

/// A 3D array of [`ContentId`] cells covering `[min_edge, max_edge]`.
///
/// Read/write only: the volume never reallocates after construction.
pub struct VoxelVolume {
    min_edge: IVec3,
    max_edge: IVec3,
    extent: IVec3,
    data: Vec<ContentId>,
}

impl VoxelVolume {
    /// Creates a volume covering the closed cuboid `[min_edge, max_edge]`,
    /// every cell initialized to `IGNORE`.
    ///
    /// # Panics
    ///
    /// Panics if any axis of `max_edge` is below `min_edge`.
    pub fn new(min_edge: IVec3, max_edge: IVec3) -> Self {
        assert!(
            max_edge.cmpge(min_edge).all(),
            "degenerate volume: {min_edge} .. {max_edge}"
        );
        let extent = max_edge - min_edge + IVec3::ONE;
        let len = extent.x as usize * extent.y as usize * extent.z as usize;
        Self {
            min_edge,
            max_edge,
            extent,
            data: vec![IGNORE; len],
        }
    }

    /// Lowest corner of the covered cuboid.
    pub fn min_edge(&self) -> IVec3 {
        self.min_edge
    }

    /// Highest corner of the covered cuboid (inclusive).
    pub fn max_edge(&self) -> IVec3 {
        self.max_edge
    }

    /// Size of the volume along each axis.
    pub fn extent(&self) -> IVec3 {
        self.extent
    }

    /// Returns `true` if `pos` lies inside the covered cuboid.
    pub fn contains(&self, pos: IVec3) -> bool {
        pos.cmpge(self.min_edge).all() && pos.cmple(self.max_edge).all()
    }

    /// Linear index of `pos`. X varies fastest, then y, then z.
    ///
    /// # Panics
    ///
    /// Debug-asserts that `pos` is inside the volume; out-of-range positions
    /// are programmer errors.
    #[inline]
    pub fn index(&self, pos: IVec3) -> usize {
        debug_assert!(self.contains(pos), "position {pos} outside volume");
        let rel = pos - self.min_edge;
        (rel.z as usize * self.extent.y as usize + rel.y as usize) * self.extent.x as usize
            + rel.x as usize
    }

    /// Index distance between vertically adjacent cells.
    #[inline]
    pub fn y_stride(&self) -> usize {
        self.extent.x as usize
    }

    /// Index distance between cells adjacent along z.
    #[inline]
    pub fn z_stride(&self) -> usize {
        self.extent.x as usize * self.extent.y as usize
    }

    /// Returns the content at `pos`.
    #[inline]
    pub fn get(&self, pos: IVec3) -> ContentId {
        self.data[self.index(pos)]
    }

    /// Writes the content at `pos`.
    #[inline]
    pub fn set(&mut self, pos: IVec3, content: ContentId) {
        let idx = self.index(pos);
        self.data[idx] = content;
    }

    /// Returns the content at a precomputed linear index.
    #[inline]
    pub fn get_index(&self, idx: usize) -> ContentId {
        self.data[idx]
    }

    /// Writes the content at a precomputed linear index.
    #[inline]
    pub fn set_index(&mut self, idx: usize, content: ContentId) {
        self.data[idx] = content;
    }

    /// Raw cell slice, for fingerprinting and bulk comparison.
    pub fn cells(&self) -> &[ContentId] {
        &self.data
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
