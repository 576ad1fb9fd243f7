//! Biome definition: surface block set, layer depths, and climate envelope.

use strata_voxel::ContentId;

/// Full descriptor for a biome.
#[derive(Clone, Debug)]
pub struct BiomeDef {
    /// Human-readable biome name (e.g. "grassland", "tundra").
    pub name: String,

    /// Topmost surface block (e.g. grass-covered dirt, sand).
    pub c_top: ContentId,
    /// Block for the layers immediately below the top (e.g. dirt).
    pub c_filler: ContentId,
    /// Underground block replacing generic stone in this biome.
    pub c_stone: ContentId,
    /// Deep water block.
    pub c_water: ContentId,
    /// Block for the topmost water layers (e.g. ice in cold biomes).
    pub c_water_top: ContentId,
    /// Block sprinkled one cell above exposed surfaces (e.g. snow).
    /// `IGNORE` means this biome has no dust.
    pub c_dust: ContentId,

    /// Number of top blocks capping an exposed surface.
    pub depth_top: i16,
    /// Base number of filler blocks below the top; the filler-depth noise is
    /// added per column.
    pub depth_filler: i16,
    /// Water depth that receives `c_water_top` instead of `c_water`.
    pub depth_water_top: i16,

    /// Center of this biome's range on the heat axis.
    pub heat_point: f32,
    /// Center of this biome's range on the humidity axis.
    pub humidity_point: f32,
    /// Lowest altitude this biome can occur at.
    pub y_min: i16,
    /// Highest altitude this biome can occur at.
    pub y_max: i16,
}
