//! Biome registry: maps [`BiomeId`] to [`BiomeDef`] and picks biomes from
//! climate samples.

use hashbrown::HashMap;

use super::BiomeDef;

/// Unique identifier for a biome. The per-chunk biome map stores these as
/// raw bytes, so at most 256 biomes can be registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BiomeId(pub u8);

/// Errors that can occur when registering biomes.
#[derive(Debug, thiserror::Error)]
pub enum BiomeRegistryError {
    /// A biome with this name is already registered.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),
    /// All 256 biome slots are in use.
    #[error("biome registry is full (max 256 biomes)")]
    RegistryFull,
}

/// Stores all registered biome definitions with O(1) lookup by ID.
///
/// Lookup by climate always succeeds once at least one biome is registered:
/// [`pick`](Self::pick) falls back to the first registered biome when no
/// altitude range matches.
pub struct BiomeRegistry {
    biomes: Vec<BiomeDef>,
    name_to_id: HashMap<String, BiomeId>,
}

impl BiomeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            biomes: Vec::new(),
            name_to_id: HashMap::new(),
        }
    }

    /// Registers a new biome definition, returning its assigned [`BiomeId`].
    ///
    /// # Errors
    ///
    /// Returns [`BiomeRegistryError::DuplicateName`] if a biome with the same
    /// name exists, or [`BiomeRegistryError::RegistryFull`] past 256 biomes.
    pub fn register(&mut self, def: BiomeDef) -> Result<BiomeId, BiomeRegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(BiomeRegistryError::DuplicateName(def.name.clone()));
        }
        if self.biomes.len() >= 256 {
            return Err(BiomeRegistryError::RegistryFull);
        }
        let id = BiomeId(self.biomes.len() as u8);
        self.name_to_id.insert(def.name.clone(), id);
        self.biomes.push(def);
        Ok(id)
    }

    /// Returns the definition for the given biome ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range — IDs are only produced by the
    /// registry itself.
    pub fn get(&self, id: BiomeId) -> &BiomeDef {
        &self.biomes[id.0 as usize]
    }

    /// Looks up a biome ID by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.name_to_id.get(name).copied()
    }

    /// Picks the biome for a climate sample at the given altitude: among
    /// biomes whose `[y_min, y_max]` contains `altitude`, the one whose
    /// climate point is closest to `(heat, humidity)`. Falls back to the
    /// first registered biome when nothing is eligible.
    pub fn pick(&self, heat: f32, humidity: f32, altitude: i16) -> BiomeId {
        let mut best: Option<(BiomeId, f32)> = None;
        for (i, biome) in self.biomes.iter().enumerate() {
            if altitude < biome.y_min || altitude > biome.y_max {
                continue;
            }
            let dh = heat - biome.heat_point;
            let dm = humidity - biome.humidity_point;
            let dist = dh * dh + dm * dm;
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((BiomeId(i as u8), dist));
            }
        }
        best.map(|(id, _)| id).unwrap_or(BiomeId(0))
    }

    /// Fills the dense per-column biome map from the climate maps and the
    /// settled heightmap. All slices share the column layout.
    pub fn calc_biome_map(
        &self,
        heat_map: &[f32],
        humidity_map: &[f32],
        heightmap: &[i16],
        out: &mut [u8],
    ) {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.pick(heat_map[i], humidity_map[i], heightmap[i]).0;
        }
    }

    /// Returns the number of registered biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Returns `true` if no biomes are registered.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}

impl Default for BiomeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
