//! Seeded fractal gradient noise: pinned constants, exact point forms, and
//! amortized map forms over dense lattices.
//!
//! Every constant the output depends on (permutation table, lattice hash,
//! gradient tables, seed mixing) lives in [`constants`]; changing any of
//! them is a world-format change.

pub mod constants;
pub mod field;
pub mod params;
pub mod perlin;

pub use constants::block_seed;
pub use field::NoiseField;
pub use params::NoiseParams;
pub use perlin::{
    contour, perlin_point_2d, perlin_point_2d_with_persistence, perlin_point_3d,
};
