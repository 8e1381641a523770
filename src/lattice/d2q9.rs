//! D2Q9 velocity set.
//!
//! Ordering: rest, axis directions (±x, ±y), then diagonals. Opposite
//! directions are adjacent pairs so the bounce-back map is trivial.

use super::VelocitySet;

const C: [[i32; 3]; 9] = [
    [0, 0, 0],
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [1, 1, 0],
    [-1, -1, 0],
    [1, -1, 0],
    [-1, 1, 0],
];

const W: [f64; 9] = [
    4.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
];

const OPP: [usize; 9] = [0, 2, 1, 4, 3, 6, 5, 8, 7];

/// The two-dimensional nine-velocity lattice.
pub static D2Q9: VelocitySet = VelocitySet {
    dims: 2,
    q: 9,
    c: &C,
    w: &W,
    opp: &OPP,
};
