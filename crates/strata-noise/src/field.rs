//! Amortized map-form evaluation over a dense rectangular lattice.
//!
//! A [`NoiseField`] owns its parameters, the world seed, fixed lattice
//! dimensions, and a result buffer reused across fills. Per octave, the
//! frequency and octave seed are computed once and applied across the whole
//! lattice; the accumulation order per cell is identical to the point forms,
//! so map and point values agree exactly at integer positions.

use crate::constants::octave_seed;
use crate::params::NoiseParams;
use crate::perlin::{gradient_2d, gradient_3d};

/// A fractal noise field with a reusable dense result grid.
///
/// 2D fields have `sy == 1`; 3D fields evaluate `sx × sy × sz` values laid
/// out x-fastest, then y, then z.
pub struct NoiseField {
    params: NoiseParams,
    world_seed: u32,
    sx: usize,
    sy: usize,
    sz: usize,
    result: Vec<f32>,
    /// Per-cell running amplitude scratch, reset on every fill.
    amplitude: Vec<f32>,
}

impl NoiseField {
    /// Creates a 2D field of `sx × sz` lattice cells.
    pub fn new_2d(params: NoiseParams, world_seed: u32, sx: usize, sz: usize) -> Self {
        Self::with_dims(params, world_seed, sx, 1, sz)
    }

    /// Creates a 3D field of `sx × sy × sz` lattice cells.
    pub fn new_3d(params: NoiseParams, world_seed: u32, sx: usize, sy: usize, sz: usize) -> Self {
        Self::with_dims(params, world_seed, sx, sy, sz)
    }

    fn with_dims(params: NoiseParams, world_seed: u32, sx: usize, sy: usize, sz: usize) -> Self {
        let len = sx * sy * sz;
        Self {
            params,
            world_seed,
            sx,
            sy,
            sz,
            result: vec![0.0; len],
            amplitude: vec![1.0; len],
        }
    }

    /// The parameter record this field evaluates.
    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    /// The most recent fill, x-fastest.
    pub fn result(&self) -> &[f32] {
        &self.result
    }

    /// Fills the 2D lattice with values at `(x0 + i, z0 + j)`.
    pub fn fill_2d(&mut self, x0: i32, z0: i32) {
        self.fill_2d_inner(x0, z0, None);
    }

    /// Fills the 2D lattice, overriding the octave persistence per column
    /// with `persist_map` (length `sx · sz`, same layout as the result).
    pub fn fill_2d_with_persistence(&mut self, x0: i32, z0: i32, persist_map: &[f32]) {
        self.fill_2d_inner(x0, z0, Some(persist_map));
    }

    fn fill_2d_inner(&mut self, x0: i32, z0: i32, persist_map: Option<&[f32]>) {
        assert_eq!(self.sy, 1, "fill_2d on a 3D field");
        if let Some(pm) = persist_map {
            assert_eq!(pm.len(), self.result.len(), "persistence map size mismatch");
        }

        self.result.fill(0.0);
        self.amplitude.fill(1.0);

        let base = self.world_seed ^ self.params.seed_offset;
        let mut freq = 1.0f32;
        for o in 0..self.params.octaves {
            let seed = octave_seed(base, o);
            let mut idx = 0usize;
            for j in 0..self.sz {
                let nz = (z0 + j as i32) as f32 / self.params.spread.z * freq;
                for i in 0..self.sx {
                    let nx = (x0 + i as i32) as f32 / self.params.spread.x * freq;
                    self.result[idx] += self.amplitude[idx] * gradient_2d(nx, nz, seed);
                    self.amplitude[idx] *= match persist_map {
                        Some(pm) => pm[idx],
                        None => self.params.persistence,
                    };
                    idx += 1;
                }
            }
            freq *= self.params.lacunarity;
        }

        for v in &mut self.result {
            *v = self.params.offset + self.params.scale * *v;
        }
    }

    /// Fills the 3D lattice with values at `(x0 + i, y0 + j, z0 + k)`.
    pub fn fill_3d(&mut self, x0: i32, y0: i32, z0: i32) {
        assert!(self.sy > 1, "fill_3d on a 2D field");

        self.result.fill(0.0);

        let base = self.world_seed ^ self.params.seed_offset;
        let mut freq = 1.0f32;
        let mut amp = 1.0f32;
        for o in 0..self.params.octaves {
            let seed = octave_seed(base, o);
            let mut idx = 0usize;
            for k in 0..self.sz {
                let nz = (z0 + k as i32) as f32 / self.params.spread.z * freq;
                for j in 0..self.sy {
                    let ny = (y0 + j as i32) as f32 / self.params.spread.y * freq;
                    for i in 0..self.sx {
                        let nx = (x0 + i as i32) as f32 / self.params.spread.x * freq;
                        self.result[idx] += amp * gradient_3d(nx, ny, nz, seed);
                        idx += 1;
                    }
                }
            }
            freq *= self.params.lacunarity;
            amp *= self.params.persistence;
        }

        for v in &mut self.result {
            *v = self.params.offset + self.params.scale * *v;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perlin::{perlin_point_2d, perlin_point_2d_with_persistence, perlin_point_3d};
    use glam::Vec3;

    fn test_params() -> NoiseParams {
        NoiseParams::new(4.0, 70.0, Vec3::new(300.0, 300.0, 300.0), 82341, 6, 0.7, 2.0)
    }

    #[test]
    fn test_map_matches_point_2d() {
        let mut field = NoiseField::new_2d(test_params(), 1234, 16, 16);
        field.fill_2d(-40, 72);

        for j in 0..16 {
            for i in 0..16 {
                let expected =
                    perlin_point_2d(&test_params(), (-40 + i) as f32, (72 + j) as f32, 1234);
                let got = field.result()[j as usize * 16 + i as usize];
                assert_eq!(got, expected, "mismatch at lattice offset ({i}, {j})");
            }
        }
    }

    #[test]
    fn test_map_matches_point_3d() {
        let np = NoiseParams::new(0.0, 12.0, Vec3::splat(100.0), 52534, 4, 0.5, 2.0);
        let mut field = NoiseField::new_3d(np.clone(), 77, 8, 10, 8);
        field.fill_3d(5, -21, -5);

        for k in 0..8 {
            for j in 0..10 {
                for i in 0..8 {
                    let expected = perlin_point_3d(
                        &np,
                        (5 + i) as f32,
                        (-21 + j) as f32,
                        (-5 + k) as f32,
                        77,
                    );
                    let got = field.result()[(k as usize * 10 + j as usize) * 8 + i as usize];
                    assert_eq!(got, expected, "mismatch at lattice offset ({i}, {j}, {k})");
                }
            }
        }
    }

    #[test]
    fn test_map_matches_point_with_persistence_override() {
        let np = NoiseParams::new(0.0, 25.0, Vec3::splat(600.0), 5934, 5, 0.6, 2.0);
        let persist: Vec<f32> = (0..64).map(|i| 0.4 + (i % 7) as f32 * 0.05).collect();

        let mut field = NoiseField::new_2d(np.clone(), 9, 8, 8);
        field.fill_2d_with_persistence(100, -300, &persist);

        for idx in 0..64usize {
            let i = (idx % 8) as i32;
            let j = (idx / 8) as i32;
            let expected = perlin_point_2d_with_persistence(
                &np,
                (100 + i) as f32,
                (-300 + j) as f32,
                9,
                persist[idx],
            );
            assert_eq!(field.result()[idx], expected, "mismatch at index {idx}");
        }
    }

    #[test]
    fn test_refill_overwrites_previous_contents() {
        let mut field = NoiseField::new_2d(test_params(), 42, 8, 8);
        field.fill_2d(0, 0);
        let first: Vec<f32> = field.result().to_vec();
        field.fill_2d(1000, 1000);
        field.fill_2d(0, 0);
        assert_eq!(field.result(), &first[..], "refill at same origin must reproduce");
    }

    #[test]
    fn test_adjacent_fills_are_continuous() {
        // Two horizontally adjacent fills share their boundary columns'
        // world coordinates one cell apart; values at the shared world
        // coordinate must be identical.
        let mut a = NoiseField::new_2d(test_params(), 5, 8, 8);
        let mut b = NoiseField::new_2d(test_params(), 5, 8, 8);
        a.fill_2d(0, 0);
        b.fill_2d(8, 0);

        let a_interior = a.result()[7]; // x = 7
        let a_again = perlin_point_2d(&test_params(), 7.0, 0.0, 5);
        assert_eq!(a_interior, a_again);

        let b_first = b.result()[0]; // x = 8
        let b_again = perlin_point_2d(&test_params(), 8.0, 0.0, 5);
        assert_eq!(b_first, b_again);
    }
}
