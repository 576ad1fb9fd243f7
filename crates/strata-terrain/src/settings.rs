//! Mapgen settings with pinned defaults and RON persistence.
//!
//! The noise parameter defaults below are part of the world format: worlds
//! generated with different values are incompatible with each other. Hosts
//! that persist settings alongside a world must reload them verbatim.

use std::path::Path;

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};
use strata_noise::NoiseParams;

/// Errors that can occur when loading, saving, or parsing settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Failed to read the settings file from disk.
    #[error("failed to read mapgen settings: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to write the settings file to disk.
    #[error("failed to write mapgen settings: {0}")]
    Write(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse mapgen settings: {0}")]
    Parse(#[source] ron::error::SpannedError),

    /// Failed to serialize settings to RON.
    #[error("failed to serialize mapgen settings: {0}")]
    Serialize(#[source] ron::Error),
}

/// Which member of the mapgen family generates this world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapgenKind {
    /// The v7 composition pipeline (base + mountains + ridges).
    #[default]
    V7,
    /// Featureless flat ground, mainly for testing hosts.
    Flat,
}

/// Global feature flags shared by all mapgen variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapgenFlags {
    /// Carve caves (noise caves and tunnel caves).
    pub caves: bool,
    /// Invoke the dungeon builder hook.
    pub dungeons: bool,
    /// Invoke the lighting pass hook.
    pub light: bool,
}

impl Default for MapgenFlags {
    fn default() -> Self {
        Self {
            caves: true,
            dungeons: true,
            light: true,
        }
    }
}

/// Parameters specific to the v7 pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapgenV7Params {
    /// Overlay 3D mountain terrain.
    pub mountains: bool,
    /// Carve ridged river networks.
    pub ridges: bool,

    pub np_terrain_base: NoiseParams,
    pub np_terrain_alt: NoiseParams,
    pub np_terrain_persist: NoiseParams,
    pub np_height_select: NoiseParams,
    pub np_filler_depth: NoiseParams,
    pub np_mount_height: NoiseParams,
    pub np_ridge_uwater: NoiseParams,
    pub np_mountain: NoiseParams,
    pub np_ridge: NoiseParams,
    pub np_cave1: NoiseParams,
    pub np_cave2: NoiseParams,
}

impl Default for MapgenV7Params {
    fn default() -> Self {
        Self {
            mountains: true,
            ridges: true,
            np_terrain_base: NoiseParams::new(4.0, 70.0, Vec3::splat(300.0), 82341, 6, 0.7, 2.0),
            np_terrain_alt: NoiseParams::new(4.0, 25.0, Vec3::splat(600.0), 5934, 5, 0.6, 2.0),
            np_terrain_persist: NoiseParams::new(0.6, 0.1, Vec3::splat(500.0), 539, 3, 0.6, 2.0),
            np_height_select: NoiseParams::new(-0.5, 1.0, Vec3::splat(250.0), 4213, 5, 0.69, 2.0),
            np_filler_depth: NoiseParams::new(0.0, 1.2, Vec3::splat(150.0), 261, 4, 0.7, 2.0),
            np_mount_height: NoiseParams::new(100.0, 30.0, Vec3::splat(500.0), 72449, 4, 0.6, 2.0),
            np_ridge_uwater: NoiseParams::new(0.0, 1.0, Vec3::splat(500.0), 85039, 4, 0.6, 2.0),
            np_mountain: NoiseParams::new(
                -0.6,
                1.0,
                Vec3::new(250.0, 350.0, 250.0),
                5333,
                5,
                0.68,
                2.0,
            ),
            np_ridge: NoiseParams::new(0.0, 1.0, Vec3::splat(100.0), 6467, 4, 0.75, 2.0),
            np_cave1: NoiseParams::new(0.0, 12.0, Vec3::splat(100.0), 52534, 4, 0.5, 2.0),
            np_cave2: NoiseParams::new(0.0, 12.0, Vec3::splat(100.0), 10325, 4, 0.5, 2.0),
        }
    }
}

/// Parameters specific to the flat generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapgenFlatParams {
    /// Altitude of the flat stone surface.
    pub ground_level: i16,
}

impl Default for MapgenFlatParams {
    fn default() -> Self {
        Self { ground_level: 8 }
    }
}

/// The full per-world mapgen configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapgenSettings {
    /// World seed.
    pub seed: u32,
    /// Altitude of the global water surface.
    pub water_level: i16,
    /// Chunk size each generator instance is built for.
    pub chunk_size: IVec3,
    /// Which variant generates this world.
    pub kind: MapgenKind,
    /// Global feature flags.
    pub flags: MapgenFlags,
    /// v7 parameters.
    pub v7: MapgenV7Params,
    /// Flat parameters.
    pub flat: MapgenFlatParams,
    /// Heat field driving biome selection.
    pub np_biome_heat: NoiseParams,
    /// Humidity field driving biome selection.
    pub np_biome_humidity: NoiseParams,
}

impl Default for MapgenSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            water_level: 1,
            chunk_size: IVec3::splat(80),
            kind: MapgenKind::V7,
            flags: MapgenFlags::default(),
            v7: MapgenV7Params::default(),
            flat: MapgenFlatParams::default(),
            np_biome_heat: NoiseParams::new(25.0, 50.0, Vec3::splat(500.0), 35293, 1, 0.5, 2.0),
            np_biome_humidity: NoiseParams::new(50.0, 50.0, Vec3::splat(500.0), 72384, 1, 0.5, 2.0),
        }
    }
}

const SETTINGS_FILE: &str = "mapgen.ron";

impl MapgenSettings {
    /// Load settings from the given directory, or create a default settings
    /// file there.
    pub fn load_or_create(dir: &Path) -> Result<Self, SettingsError> {
        let path = dir.join(SETTINGS_FILE);

        if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(SettingsError::Read)?;
            let settings: MapgenSettings =
                ron::from_str(&contents).map_err(SettingsError::Parse)?;
            tracing::info!("loaded mapgen settings from {}", path.display());
            Ok(settings)
        } else {
            let settings = MapgenSettings::default();
            settings.save(dir)?;
            tracing::info!("created default mapgen settings at {}", path.display());
            Ok(settings)
        }
    }

    /// Save settings to the given directory as `mapgen.ron`.
    pub fn save(&self, dir: &Path) -> Result<(), SettingsError> {
        std::fs::create_dir_all(dir).map_err(SettingsError::Write)?;

        let path = dir.join(SETTINGS_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(SettingsError::Serialize)?;
        std::fs::write(&path, serialized).map_err(SettingsError::Write)?;
        Ok(())
    }

    /// Re-read from disk: returns `Some(new_settings)` if the file differs
    /// from `self`, `None` otherwise.
    pub fn reload(&self, dir: &Path) -> Result<Option<Self>, SettingsError> {
        let path = dir.join(SETTINGS_FILE);
        let contents = std::fs::read_to_string(&path).map_err(SettingsError::Read)?;
        let new_settings: MapgenSettings =
            ron::from_str(&contents).map_err(SettingsError::Parse)?;

        if &new_settings != self {
            tracing::info!("mapgen settings reloaded with changes");
            Ok(Some(new_settings))
        } else {
            Ok(None)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
