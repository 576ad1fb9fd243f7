//! Noise parameter records.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Parameters of one fractal noise field.
///
/// The deterministic value at point `p` is
/// `offset + scale · Σ grad(p / spread · lacunarity^o, seed) · persistence^o`
/// summed over `o` octaves, where `seed` combines the world seed, the
/// parameter [`seed_offset`](Self::seed_offset), and the octave index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Constant added after scaling.
    pub offset: f32,
    /// Amplitude applied to the raw octave sum.
    pub scale: f32,
    /// Spatial wavelength of the first octave, per axis.
    pub spread: Vec3,
    /// Per-noise seed perturbation, XORed with the world seed.
    pub seed_offset: u32,
    /// Number of octaves accumulated.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves, in `(0, 1)`.
    pub persistence: f32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f32,
}

impl NoiseParams {
    /// Shorthand constructor in parameter-table order.
    pub fn new(
        offset: f32,
        scale: f32,
        spread: Vec3,
        seed_offset: u32,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
    ) -> Self {
        Self {
            offset,
            scale,
            spread,
            seed_offset,
            octaves,
            persistence,
            lacunarity,
        }
    }
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            offset: 0.0,
            scale: 1.0,
            spread: Vec3::splat(250.0),
            seed_offset: 0,
            octaves: 3,
            persistence: 0.6,
            lacunarity: 2.0,
        }
    }
}
