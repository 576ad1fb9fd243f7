//! Pinned noise constants.
//!
//! Everything in this module is part of the world format: the permutation
//! table, the lattice-hash magic numbers, the gradient tables, and the block
//! seed derivation. Changing any value here changes every world generated
//! from a given seed.

use glam::IVec3;

/// Fixed 256-entry permutation driving gradient selection.
///
/// This is the classic reference permutation; it is combined with the
/// lattice hash below rather than reshuffled per seed, so the table itself
/// never varies.
#[rustfmt::skip]
pub const PERMUTATION: [u8; 256] = [
    151, 160, 137,  91,  90,  15, 131,  13, 201,  95,  96,  53, 194, 233,   7, 225,
    140,  36, 103,  30,  69, 142,   8,  99,  37, 240,  21,  10,  23, 190,   6, 148,
    247, 120, 234,  75,   0,  26, 197,  62,  94, 252, 219, 203, 117,  35,  11,  32,
     57, 177,  33,  88, 237, 149,  56,  87, 174,  20, 125, 136, 171, 168,  68, 175,
     74, 165,  71, 134, 139,  48,  27, 166,  77, 146, 158, 231,  83, 111, 229, 122,
     60, 211, 133, 230, 220, 105,  92,  41,  55,  46, 245,  40, 244, 102, 143,  54,
     65,  25,  63, 161,   1, 216,  80,  73, 209,  76, 132, 187, 208,  89,  18, 169,
    200, 196, 135, 130, 116, 188, 159,  86, 164, 100, 109, 198, 173, 186,   3,  64,
     52, 217, 226, 250, 124, 123,   5, 202,  38, 147, 118, 126, 255,  82,  85, 212,
    207, 206,  59, 227,  47,  16,  58,  17, 182, 189,  28,  42, 223, 183, 170, 213,
    119, 248, 152,   2,  44, 154, 163,  70, 221, 153, 101, 155, 167,  43, 172,   9,
    129,  22,  39, 253,  19,  98, 108, 110,  79, 113, 224, 232, 178, 185, 112, 104,
    218, 246,  97, 228, 251,  34, 242, 193, 238, 210, 144,  12, 191, 179, 162, 241,
     81,  51, 145, 235, 249,  14, 239, 107,  49, 192, 214,  31, 181, 199, 106, 157,
    184,  84, 204, 176, 115, 121,  50,  45, 127,   4, 150, 254, 138, 236, 205,  93,
    222, 114,  67,  29,  24,  72, 243, 141, 128, 195,  78,  66, 215,  61, 156, 180,
];

/// Lattice-hash multipliers. Together with the avalanche below these pin the
/// mapping from (lattice point, seed) to a permutation slot.
pub const MAGIC_X: u32 = 1619;
pub const MAGIC_Y: u32 = 31337;
pub const MAGIC_Z: u32 = 52591;
pub const MAGIC_SEED: u32 = 1013;

/// Gradient directions for 2D noise, indexed by the low 3 bits of the hash.
#[rustfmt::skip]
pub const GRAD_2D: [(f32, f32); 8] = [
    ( 1.0,  1.0), (-1.0,  1.0), ( 1.0, -1.0), (-1.0, -1.0),
    ( 1.0,  0.0), (-1.0,  0.0), ( 0.0,  1.0), ( 0.0, -1.0),
];

/// Gradient directions for 3D noise, indexed by the low 4 bits of the hash.
/// The twelve cube-edge directions, with four repeated to fill the table.
#[rustfmt::skip]
pub const GRAD_3D: [(f32, f32, f32); 16] = [
    ( 1.0,  1.0,  0.0), (-1.0,  1.0,  0.0), ( 1.0, -1.0,  0.0), (-1.0, -1.0,  0.0),
    ( 1.0,  0.0,  1.0), (-1.0,  0.0,  1.0), ( 1.0,  0.0, -1.0), (-1.0,  0.0, -1.0),
    ( 0.0,  1.0,  1.0), ( 0.0, -1.0,  1.0), ( 0.0,  1.0, -1.0), ( 0.0, -1.0, -1.0),
    ( 1.0,  1.0,  0.0), (-1.0,  1.0,  0.0), ( 0.0, -1.0,  1.0), ( 0.0, -1.0, -1.0),
];

/// Avalanche step shared by the lattice hashes and [`block_seed`].
#[inline]
fn scramble(mut n: u32) -> u32 {
    n &= 0x7fff_ffff;
    n = (n >> 13) ^ n;
    n.wrapping_mul(n.wrapping_mul(n).wrapping_mul(60493).wrapping_add(19_990_303))
        .wrapping_add(1_376_312_589)
}

/// Hashes a 2D lattice point and seed to a permutation entry.
#[inline]
pub fn lattice_hash_2d(x: i32, z: i32, seed: u32) -> u8 {
    let n = MAGIC_X
        .wrapping_mul(x as u32)
        .wrapping_add(MAGIC_Y.wrapping_mul(z as u32))
        .wrapping_add(MAGIC_SEED.wrapping_mul(seed));
    PERMUTATION[(scramble(n) & 0xff) as usize]
}

/// Hashes a 3D lattice point and seed to a permutation entry.
#[inline]
pub fn lattice_hash_3d(x: i32, y: i32, z: i32, seed: u32) -> u8 {
    let n = MAGIC_X
        .wrapping_mul(x as u32)
        .wrapping_add(MAGIC_Y.wrapping_mul(y as u32))
        .wrapping_add(MAGIC_Z.wrapping_mul(z as u32))
        .wrapping_add(MAGIC_SEED.wrapping_mul(seed));
    PERMUTATION[(scramble(n) & 0xff) as usize]
}

/// Combines the base seed of a noise (world seed XOR parameter seed offset)
/// with an octave index.
#[inline]
pub fn octave_seed(base: u32, octave: u32) -> u32 {
    base.wrapping_add(octave)
}

/// Derives the 32-bit chunk seed used by sub-algorithms (tunnel caves,
/// dungeons, decorations, ores) from the chunk's full-frame origin.
pub fn block_seed(node_min: IVec3, world_seed: u32) -> u32 {
    let n = MAGIC_X
        .wrapping_mul(node_min.x as u32)
        .wrapping_add(MAGIC_Y.wrapping_mul(node_min.y as u32))
        .wrapping_add(MAGIC_Z.wrapping_mul(node_min.z as u32))
        .wrapping_add(MAGIC_SEED.wrapping_mul(world_seed));
    scramble(n)
}
