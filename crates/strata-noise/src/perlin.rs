//! Exact point-form evaluation of the fractal gradient noise.
//!
//! The gradient kernel is classic Perlin: corner gradients chosen by the
//! pinned lattice hash, dot products blended by a smoothstep-weighted
//! bi/trilinear interpolation. Values at integer lattice inputs are zero by
//! construction; the fractal forms are total over all reals.

use crate::constants::{GRAD_2D, GRAD_3D, lattice_hash_2d, lattice_hash_3d, octave_seed};
use crate::params::NoiseParams;

/// Quintic fade curve, zero slope at both ends.
#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

#[inline]
fn grad2(hash: u8, x: f32, y: f32) -> f32 {
    let (gx, gy) = GRAD_2D[(hash & 7) as usize];
    gx * x + gy * y
}

#[inline]
fn grad3(hash: u8, x: f32, y: f32, z: f32) -> f32 {
    let (gx, gy, gz) = GRAD_3D[(hash & 15) as usize];
    gx * x + gy * y + gz * z
}

/// Single-octave 2D gradient noise at `(x, z)`.
pub fn gradient_2d(x: f32, z: f32, seed: u32) -> f32 {
    let xf = x.floor();
    let zf = z.floor();
    let xi = xf as i32;
    let zi = zf as i32;
    let dx = x - xf;
    let dz = z - zf;

    let u = fade(dx);
    let v = fade(dz);

    let n00 = grad2(lattice_hash_2d(xi, zi, seed), dx, dz);
    let n10 = grad2(lattice_hash_2d(xi + 1, zi, seed), dx - 1.0, dz);
    let n01 = grad2(lattice_hash_2d(xi, zi + 1, seed), dx, dz - 1.0);
    let n11 = grad2(lattice_hash_2d(xi + 1, zi + 1, seed), dx - 1.0, dz - 1.0);

    lerp(v, lerp(u, n00, n10), lerp(u, n01, n11))
}

/// Single-octave 3D gradient noise at `(x, y, z)`.
pub fn gradient_3d(x: f32, y: f32, z: f32, seed: u32) -> f32 {
    let xf = x.floor();
    let yf = y.floor();
    let zf = z.floor();
    let xi = xf as i32;
    let yi = yf as i32;
    let zi = zf as i32;
    let dx = x - xf;
    let dy = y - yf;
    let dz = z - zf;

    let u = fade(dx);
    let v = fade(dy);
    let w = fade(dz);

    let n000 = grad3(lattice_hash_3d(xi, yi, zi, seed), dx, dy, dz);
    let n100 = grad3(lattice_hash_3d(xi + 1, yi, zi, seed), dx - 1.0, dy, dz);
    let n010 = grad3(lattice_hash_3d(xi, yi + 1, zi, seed), dx, dy - 1.0, dz);
    let n110 = grad3(lattice_hash_3d(xi + 1, yi + 1, zi, seed), dx - 1.0, dy - 1.0, dz);
    let n001 = grad3(lattice_hash_3d(xi, yi, zi + 1, seed), dx, dy, dz - 1.0);
    let n101 = grad3(lattice_hash_3d(xi + 1, yi, zi + 1, seed), dx - 1.0, dy, dz - 1.0);
    let n011 = grad3(lattice_hash_3d(xi, yi + 1, zi + 1, seed), dx, dy - 1.0, dz - 1.0);
    let n111 = grad3(
        lattice_hash_3d(xi + 1, yi + 1, zi + 1, seed),
        dx - 1.0,
        dy - 1.0,
        dz - 1.0,
    );

    let x00 = lerp(u, n000, n100);
    let x10 = lerp(u, n010, n110);
    let x01 = lerp(u, n001, n101);
    let x11 = lerp(u, n011, n111);

    lerp(w, lerp(v, x00, x10), lerp(v, x01, x11))
}

/// Exact fractal value at a single 2D point.
pub fn perlin_point_2d(np: &NoiseParams, x: f32, z: f32, world_seed: u32) -> f32 {
    perlin_point_2d_with_persistence(np, x, z, world_seed, np.persistence)
}

/// Exact fractal value at a single 2D point, with the octave persistence
/// replaced by `persistence` (the per-column override of the map form).
pub fn perlin_point_2d_with_persistence(
    np: &NoiseParams,
    x: f32,
    z: f32,
    world_seed: u32,
    persistence: f32,
) -> f32 {
    let base = world_seed ^ np.seed_offset;
    let mut sum = 0.0f32;
    let mut freq = 1.0f32;
    let mut amp = 1.0f32;
    for o in 0..np.octaves {
        sum += amp * gradient_2d(x / np.spread.x * freq, z / np.spread.z * freq, octave_seed(base, o));
        freq *= np.lacunarity;
        amp *= persistence;
    }
    np.offset + np.scale * sum
}

/// Exact fractal value at a single 3D point.
pub fn perlin_point_3d(np: &NoiseParams, x: f32, y: f32, z: f32, world_seed: u32) -> f32 {
    let base = world_seed ^ np.seed_offset;
    let mut sum = 0.0f32;
    let mut freq = 1.0f32;
    let mut amp = 1.0f32;
    for o in 0..np.octaves {
        sum += amp
            * gradient_3d(
                x / np.spread.x * freq,
                y / np.spread.y * freq,
                z / np.spread.z * freq,
                octave_seed(base, o),
            );
        freq *= np.lacunarity;
        amp *= np.persistence;
    }
    np.offset + np.scale * sum
}

/// Unit ramp biasing cave noise toward connected tunnels:
/// `max(1 − |v|, 0)`.
#[inline]
pub fn contour(v: f32) -> f32 {
    (1.0 - v.abs()).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn unit_params() -> NoiseParams {
        NoiseParams::new(0.0, 1.0, Vec3::splat(1.0), 0, 1, 0.5, 2.0)
    }

    #[test]
    fn test_zero_at_integer_lattice_points() {
        for i in -8..8 {
            for j in -8..8 {
                let v = gradient_2d(i as f32, j as f32, 99);
                assert_eq!(v, 0.0, "nonzero at lattice point ({i}, {j}): {v}");
                let w = gradient_3d(i as f32, 3.0, j as f32, 99);
                assert_eq!(w, 0.0, "nonzero at lattice point ({i}, 3, {j}): {w}");
            }
        }
    }

    #[test]
    fn test_offset_and_scale_applied() {
        let np = NoiseParams::new(5.0, 3.0, Vec3::splat(1.0), 0, 2, 0.5, 2.0);
        // At integer inputs with spread 1 and integer lacunarity every octave
        // lands on the lattice, so the raw sum is zero and only offset remains.
        let v = perlin_point_2d(&np, 7.0, -3.0, 1234);
        assert_eq!(v, 5.0);
    }

    #[test]
    fn test_point_deterministic() {
        let np = NoiseParams::default();
        let a = perlin_point_2d(&np, 123.4, -56.7, 42);
        let b = perlin_point_2d(&np, 123.4, -56.7, 42);
        assert_eq!(a, b);
        let c = perlin_point_3d(&np, 1.5, 2.5, 3.5, 42);
        let d = perlin_point_3d(&np, 1.5, 2.5, 3.5, 42);
        assert_eq!(c, d);
    }

    #[test]
    fn test_different_seed_offsets_decorrelate() {
        let a = NoiseParams::new(0.0, 1.0, Vec3::splat(100.0), 52534, 4, 0.5, 2.0);
        let b = NoiseParams::new(0.0, 1.0, Vec3::splat(100.0), 10325, 4, 0.5, 2.0);
        let mut differences = 0;
        for i in 0..100 {
            let x = i as f32 * 3.7;
            if perlin_point_2d(&a, x, 0.5, 7) != perlin_point_2d(&b, x, 0.5, 7) {
                differences += 1;
            }
        }
        assert!(differences > 90, "seed offsets barely decorrelate: {differences}/100");
    }

    #[test]
    fn test_persistence_override_changes_value() {
        let np = NoiseParams::new(0.0, 1.0, Vec3::splat(50.0), 539, 3, 0.6, 2.0);
        let normal = perlin_point_2d(&np, 10.3, 20.9, 11);
        let overridden = perlin_point_2d_with_persistence(&np, 10.3, 20.9, 11, 0.9);
        assert_ne!(normal, overridden);
    }

    #[test]
    fn test_noise_bounded() {
        let np = unit_params();
        for i in 0..1000 {
            let x = i as f32 * 0.137;
            let v = perlin_point_2d(&np, x, x * 0.731, 3);
            assert!(v.abs() < 2.0, "single octave out of bounds at {x}: {v}");
        }
    }

    #[test]
    fn test_contour_shape() {
        assert_eq!(contour(0.0), 1.0);
        assert_eq!(contour(1.0), 0.0);
        assert_eq!(contour(-1.0), 0.0);
        assert_eq!(contour(2.5), 0.0);
        assert!((contour(0.5) - 0.5).abs() < 1e-6);
        assert!((contour(-0.25) - 0.75).abs() < 1e-6);
    }
}
